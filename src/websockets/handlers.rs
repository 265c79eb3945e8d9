use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::hub::PlayerInfo;
use crate::shared::{AppError, AppState};

use super::handler::SessionEventHandler;
use super::socket::Session;

/// WebSocket upgrade handler
///
/// GET /ws
/// Upgrades the HTTP connection; the client identifies itself later with a join frame
#[instrument(name = "websocket_handler", skip(state, ws))]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, state: AppState) {
    let message_handler = Arc::new(SessionEventHandler::new(
        state.hub.clone(),
        Arc::clone(&state.metrics),
    ));
    let session = Session::new(
        Box::new(socket),
        message_handler,
        state.outbound_queue_capacity,
    );
    let connection_id = session.connection_id();

    info!(connection_id = %connection_id, "WebSocket connection established");

    match session.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }
}

/// HTTP handler for the active roster
///
/// GET /players
/// Returns every participant that completed the join handshake
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerInfo>>, AppError> {
    let players = state.hub.active_roster().await?;
    info!(player_count = players.len(), "Players listed");
    Ok(Json(players))
}

/// HTTP handler for Prometheus scraping
///
/// GET /metrics
#[instrument(name = "render_metrics", skip(state))]
pub async fn render_metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("Metrics are disabled".to_string()))
}
