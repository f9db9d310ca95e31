//! # chicfocus-web
//!
//! ChicFocus 서버.
//! Axum 기반 WebSocket 실시간 채널 + 마켓 REST API.
//!
//! ## 기능
//! - `/ws`: 세션 시작/일시정지/재개/초기화, 사이클 종료, 챌린지
//! - `/status`: 참가자와 티어 정보
//! - `/api/market_*`: 마켓 이벤트, 거래 동물, 피드, 가격 차트(PNG)
//!
//! 타이머는 서버에서 돌고, 모든 상태 변화는 연결된 클라이언트 전체에 브로드캐스트된다.

pub mod error;
pub mod handlers;
pub mod market;
pub mod routes;
pub mod service;
pub mod state;

use axum::Router;
use chicfocus_core::config::{AppConfig, WebConfig};
use chicfocus_storage::CycleStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub use error::{ApiError, ServiceError};
pub use market::MarketSimulator;
pub use service::FocusService;
pub use state::AppState;

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// ChicFocus 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 서버 생성
    pub fn new(store: Arc<CycleStore>, config: &AppConfig) -> Self {
        let service = Arc::new(FocusService::new(store, config));
        let market = Arc::new(MarketSimulator::new(config.market.clone()));
        Self {
            config: config.web.clone(),
            state: AppState::new(service, market),
        }
    }

    /// 공유 상태
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// 라우터 구성
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        routes::app_routes()
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(self.state.clone())
    }

    /// 서버 실행
    ///
    /// 설정 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도한다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환한다.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            let port = base_port.saturating_add(attempt);

            if port < base_port && attempt > 0 {
                break;
            }

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{}: {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    return self.serve(listener, shutdown_rx).await;
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 이미 바인드된 리스너로 서버 실행 (마켓 시뮬레이터 포함)
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let app = self.router();

        let market = self.state.market.clone();
        let market_shutdown = shutdown_rx.clone();
        let market_task = tokio::spawn(async move { market.run(market_shutdown).await });

        info!("ChicFocus 서버 시작: http://{}", addr);
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                loop {
                    if *shutdown_rx.borrow() {
                        info!("서버 종료 신호 수신");
                        break;
                    }
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;

        self.state.service.shutdown();
        market_task.abort();
        info!("ChicFocus 서버 종료");
        result
    }
}
