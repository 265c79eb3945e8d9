use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ConfigError;
use crate::hub::{HubError, HubHandle};
use crate::metrics::MetricsSink;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub hub: HubHandle,
    pub metrics: Arc<dyn MetricsSink>,
    /// Present when the Prometheus recorder is installed
    pub prometheus: Option<PrometheusHandle>,
    /// Per-connection outbound queue bound
    pub outbound_queue_capacity: usize,
}

impl AppState {
    pub fn new(
        hub: HubHandle,
        metrics: Arc<dyn MetricsSink>,
        prometheus: Option<PrometheusHandle>,
        outbound_queue_capacity: usize,
    ) -> Self {
        Self {
            hub,
            metrics,
            prometheus,
            outbound_queue_capacity,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hub error: {0}")]
    Hub(#[from] HubError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Hub(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Hub unavailable: {}", e),
            ),
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::Metrics(_)
            | AppError::Logging(_)
            | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
