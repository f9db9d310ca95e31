//! 마켓 조회 API 포트.
//!
//! 구현: `chicfocus-network::http_client::HttpMarketClient` (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::market::{AvailableAnimal, FeedEntry, MarketEvent};

/// 마켓 HTTP 조회 인터페이스
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// 최근 마켓 이벤트 (최신순)
    async fn market_events(&self) -> Result<Vec<MarketEvent>, CoreError>;

    /// 거래 가능한 동물 목록
    async fn available_animals(&self) -> Result<Vec<AvailableAnimal>, CoreError>;

    /// 마켓 피드 (최신순)
    async fn market_feed(&self) -> Result<Vec<FeedEntry>, CoreError>;

    /// 캐시 무효화 파라미터가 붙은 차트 이미지 URL
    fn chart_url(&self, cache_buster: i64) -> String;
}
