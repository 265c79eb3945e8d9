//! Metrics sink consumed by the hub and sessions, backed by the `metrics` facade.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use tracing::info;

/// HTTP requests total (counter, labels: method, endpoint, status_code).
pub const HTTP_REQUESTS_TOTAL: &str = "polydraw_http_requests_total";
/// HTTP request duration seconds (histogram, labels: method, endpoint).
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "polydraw_http_request_duration_seconds";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "polydraw_websocket_connections_active";
/// WebSocket connections established total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "polydraw_websocket_connections_total";
/// WebSocket messages received (counter, labels: message_type).
pub const WS_MESSAGES_RECEIVED_TOTAL: &str = "polydraw_websocket_messages_received_total";
/// WebSocket frames handed to outbound queues by broadcasts (counter).
pub const WS_MESSAGES_SENT_TOTAL: &str = "polydraw_websocket_messages_sent_total";
/// WebSocket errors (counter, labels: error_type).
pub const WS_ERRORS_TOTAL: &str = "polydraw_websocket_errors_total";
/// Participants that completed the join handshake (gauge).
pub const PLAYERS_ACTIVE: &str = "polydraw_players_active";
/// Players joined total (counter).
pub const PLAYERS_JOINED_TOTAL: &str = "polydraw_players_joined_total";
/// Players left total (counter).
pub const PLAYERS_LEFT_TOTAL: &str = "polydraw_players_left_total";
/// Draw events total (counter).
pub const DRAW_EVENTS_TOTAL: &str = "polydraw_draw_events_total";
/// Path events total (counter).
pub const PATH_EVENTS_TOTAL: &str = "polydraw_path_events_total";
/// Canvas clear events total (counter).
pub const CLEAR_EVENTS_TOTAL: &str = "polydraw_clear_events_total";
/// Points across all relayed paths (counter).
pub const PATH_POINTS_TOTAL: &str = "polydraw_path_points_total";
/// Commands waiting in the hub mailbox (gauge).
pub const HUB_MAILBOX_DEPTH: &str = "polydraw_hub_mailbox_depth";
/// Log events emitted (counter, labels: level).
pub const LOG_MESSAGES_TOTAL: &str = "polydraw_log_messages_total";

/// Counter and gauge updates emitted by the relay.
///
/// Implementations must not block: the hub calls these from its dispatch loop.
pub trait MetricsSink: Send + Sync {
    fn connection_opened(&self);
    fn active_connections(&self, count: usize);
    fn message_received(&self, message_type: &str);
    fn messages_sent(&self, count: usize);
    fn websocket_error(&self, error_type: &str);
    fn player_joined(&self);
    fn player_left(&self);
    fn active_players(&self, count: usize);
    fn draw_event(&self);
    fn path_event(&self, points: usize);
    fn clear_event(&self);
    fn hub_mailbox_depth(&self, depth: usize);
}

/// Sink that discards everything
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn connection_opened(&self) {}
    fn active_connections(&self, _count: usize) {}
    fn message_received(&self, _message_type: &str) {}
    fn messages_sent(&self, _count: usize) {}
    fn websocket_error(&self, _error_type: &str) {}
    fn player_joined(&self) {}
    fn player_left(&self) {}
    fn active_players(&self, _count: usize) {}
    fn draw_event(&self) {}
    fn path_event(&self, _points: usize) {}
    fn clear_event(&self) {}
    fn hub_mailbox_depth(&self, _depth: usize) {}
}

/// Sink that records through the global `metrics` recorder
pub struct PrometheusMetrics;

impl MetricsSink for PrometheusMetrics {
    fn connection_opened(&self) {
        counter!(WS_CONNECTIONS_TOTAL).increment(1);
    }

    fn active_connections(&self, count: usize) {
        gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
    }

    fn message_received(&self, message_type: &str) {
        counter!(WS_MESSAGES_RECEIVED_TOTAL, "message_type" => message_type.to_string())
            .increment(1);
    }

    fn messages_sent(&self, count: usize) {
        counter!(WS_MESSAGES_SENT_TOTAL).increment(count as u64);
    }

    fn websocket_error(&self, error_type: &str) {
        counter!(WS_ERRORS_TOTAL, "error_type" => error_type.to_string()).increment(1);
    }

    fn player_joined(&self) {
        counter!(PLAYERS_JOINED_TOTAL).increment(1);
    }

    fn player_left(&self) {
        counter!(PLAYERS_LEFT_TOTAL).increment(1);
    }

    fn active_players(&self, count: usize) {
        gauge!(PLAYERS_ACTIVE).set(count as f64);
    }

    fn draw_event(&self) {
        counter!(DRAW_EVENTS_TOTAL).increment(1);
    }

    fn path_event(&self, points: usize) {
        counter!(PATH_EVENTS_TOTAL).increment(1);
        counter!(PATH_POINTS_TOTAL).increment(points as u64);
    }

    fn clear_event(&self) {
        counter!(CLEAR_EVENTS_TOTAL).increment(1);
    }

    fn hub_mailbox_depth(&self, depth: usize) {
        gauge!(HUB_MAILBOX_DEPTH).set(depth as f64);
    }
}

/// Install the Prometheus recorder globally and return the handle used by `/metrics`
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics recorder installed");
    Ok(handle)
}

/// Middleware recording request counts and latency per matched route
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let response = next.run(req).await;

    let status_code = response.status().as_u16().to_string();
    counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "endpoint" => endpoint.clone(),
        "status_code" => status_code
    )
    .increment(1);
    histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method,
        "endpoint" => endpoint
    )
    .record(start.elapsed().as_secs_f64());

    response
}
