//! 서버 공유 상태.

use std::sync::Arc;

use crate::market::MarketSimulator;
use crate::service::FocusService;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 집중 세션 서비스
    pub service: Arc<FocusService>,
    /// 마켓 시뮬레이터
    pub market: Arc<MarketSimulator>,
}

impl AppState {
    pub fn new(service: Arc<FocusService>, market: Arc<MarketSimulator>) -> Self {
        Self { service, market }
    }
}
