//! 마켓 REST 핸들러.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chicfocus_core::models::market::{AvailableAnimal, FeedEntry, MarketEvent};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// GET /api/market_events (최신순)
pub async fn get_market_events(State(state): State<AppState>) -> Json<Vec<MarketEvent>> {
    Json(state.market.events())
}

/// GET /api/available_animals
pub async fn get_available_animals(State(state): State<AppState>) -> Json<Vec<AvailableAnimal>> {
    Json(state.market.animals())
}

/// GET /api/market_feed (최신순)
pub async fn get_market_feed(State(state): State<AppState>) -> Json<Vec<FeedEntry>> {
    Json(state.market.feed())
}

/// GET /api/market_chart.png
///
/// 클라이언트는 `t` 쿼리로 캐시를 무효화하므로 쿼리는 읽지 않는다.
pub async fn get_market_chart(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let png = state.market.chart_png().map_err(|e| {
        warn!("차트 렌더링 실패: {e}");
        ApiError::Internal(e.to_string())
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        png,
    ))
}
