use crate::handlers::{candles, health, ticker, ws};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request/response surface consumed by the chart component.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/candles", get(candles::get_candles))
        .route("/ticker", get(ticker::get_ticker))
        .route("/health", get(health::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Live tick surface. Upgrades on any path, like a bare WebSocket server.
pub fn create_ws_router(state: AppState) -> Router {
    Router::new()
        .fallback(ws::ws_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
