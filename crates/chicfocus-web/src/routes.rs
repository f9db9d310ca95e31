//! 라우트 정의.

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::AppState;

/// REST API 라우트 (`/api` 아래)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/market_events", get(handlers::market::get_market_events))
        .route(
            "/available_animals",
            get(handlers::market::get_available_animals),
        )
        .route("/market_feed", get(handlers::market::get_market_feed))
        .route("/market_chart.png", get(handlers::market::get_market_chart))
}

/// 전체 라우터 (상태 미적용)
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(handlers::ws::ws_upgrade))
        .route("/status", get(handlers::status::get_status))
        .nest("/api", api_routes())
}
