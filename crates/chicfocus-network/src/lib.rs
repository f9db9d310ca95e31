//! # chicfocus-network
//!
//! WebSocket/HTTP 네트워크 어댑터.
//! 실시간 채널(WebSocket) 연결과 자동 재연결, 마켓 REST 조회를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use chicfocus_network::connection::RealtimeConnection;
//! use chicfocus_network::http_client::HttpMarketClient;
//!
//! let connection = RealtimeConnection::from_config(&config);
//! let transport = connection.transport();
//! tokio::spawn(connection.run(handler, shutdown_rx));
//! ```

pub mod connection;
pub mod connectivity;
pub mod http_client;
pub mod reconnect;
pub mod transport;
pub mod ws_client;
