//! WebSocket 클라이언트.
//!
//! `tokio-tungstenite` 기반 실시간 채널. 연결 하나당 수신 태스크 하나를 띄우고
//! 송신은 복제 가능한 [`WsSender`]로 처리한다.

use chicfocus_core::error::CoreError;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// 수신 채널 버퍼 크기
const INBOUND_BUFFER: usize = 64;

/// WebSocket 클라이언트
#[derive(Debug, Clone)]
pub struct WsClient {
    base_url: String,
    path: String,
}

/// WebSocket으로 수신한 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// 텍스트 메시지 (JSON)
    Text(String),
    /// 바이너리 메시지
    Binary(Vec<u8>),
    /// 서버가 연결 종료
    Close,
}

impl WsClient {
    /// 새 WebSocket 클라이언트 생성
    ///
    /// `base_url`은 http/https 주소, `path`는 WebSocket 엔드포인트 경로.
    pub fn new(base_url: &str, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
        }
    }

    /// 접속 대상 ws/wss URL
    pub fn ws_url(&self) -> String {
        let ws_base = self
            .base_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{ws_base}{}", self.path)
    }

    /// WebSocket 연결 수립
    ///
    /// 수신 메시지는 `rx`로, 송신은 반환된 `WsSender`로 처리.
    /// 수신 스트림이 끊기면 `rx`가 닫힌다.
    pub async fn connect(&self) -> Result<(WsSender, mpsc::Receiver<WsMessage>), CoreError> {
        let url = self.ws_url();
        info!("WebSocket 연결: {url}");

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| CoreError::Network(format!("WebSocket 연결 실패: {e}")))?;

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::channel(INBOUND_BUFFER);

        tokio::spawn(Self::read_loop(read, tx));

        Ok((
            WsSender {
                write: Arc::new(tokio::sync::Mutex::new(write)),
            },
            rx,
        ))
    }

    /// 수신 루프
    async fn read_loop(mut read: SplitStream<WsStream>, tx: mpsc::Sender<WsMessage>) {
        while let Some(msg) = read.next().await {
            let forwarded = match msg {
                Ok(Message::Text(text)) => WsMessage::Text(text.to_string()),
                Ok(Message::Binary(data)) => WsMessage::Binary(data.to_vec()),
                Ok(Message::Close(frame)) => {
                    debug!("서버 종료 프레임 수신: {frame:?}");
                    let _ = tx.send(WsMessage::Close).await;
                    break;
                }
                Ok(_) => continue, // Ping/Pong은 자동 처리
                Err(e) => {
                    warn!("WebSocket 수신 에러: {e}");
                    break;
                }
            };
            if tx.send(forwarded).await.is_err() {
                break;
            }
        }
        debug!("WebSocket 수신 루프 종료");
    }
}

/// WebSocket 송신기 (복제 시 같은 연결을 공유)
#[derive(Clone)]
pub struct WsSender {
    write: Arc<tokio::sync::Mutex<SplitSink<WsStream, Message>>>,
}

impl std::fmt::Debug for WsSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsSender").finish_non_exhaustive()
    }
}

impl WsSender {
    /// 텍스트 메시지 전송
    pub async fn send_text(&self, text: &str) -> Result<(), CoreError> {
        let mut write = self.write.lock().await;
        write
            .send(Message::text(text.to_string()))
            .await
            .map_err(|e| CoreError::Network(format!("WebSocket 전송 실패: {e}")))
    }

    /// JSON 메시지 전송
    pub async fn send_json<T: serde::Serialize>(&self, data: &T) -> Result<(), CoreError> {
        let json = serde_json::to_string(data)?;
        self.send_text(&json).await
    }

    /// 연결 종료
    pub async fn close(&self) -> Result<(), CoreError> {
        let mut write = self.write.lock().await;
        write
            .send(Message::Close(None))
            .await
            .map_err(|e| CoreError::Network(format!("WebSocket 종료 실패: {e}")))
    }
}
