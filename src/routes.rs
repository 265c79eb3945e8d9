use axum::{http::Method, middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::metrics::track_http_metrics;
use crate::shared::AppState;
use crate::websockets::{list_players, render_metrics, websocket_handler};

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let roster_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(|| async { "Polydraw relay is running" }))
        .route("/ws", get(websocket_handler))
        .route("/players", get(list_players).layer(roster_cors))
        .route("/metrics", get(render_metrics))
        .layer(middleware::from_fn(track_http_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
