use clap::Parser;
use polydraw::{
    config::ServerConfig,
    hub::Hub,
    metrics::{self, MetricsSink, NoopMetrics, PrometheusMetrics},
    routes::build_router,
    shared::{AppError, AppState},
    telemetry,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(e) = telemetry::init_tracing(config.log_dir.as_deref()) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), AppError> {
    config.validate()?;

    info!("Starting Polydraw server");

    let prometheus = if config.metrics {
        Some(metrics::install_recorder().map_err(|e| AppError::Metrics(e.to_string()))?)
    } else {
        None
    };
    let metrics_sink: Arc<dyn MetricsSink> = if prometheus.is_some() {
        Arc::new(PrometheusMetrics)
    } else {
        Arc::new(NoopMetrics)
    };

    // Hub runs on its own task for the lifetime of the process
    let (hub, _hub_task) = Hub::spawn(config.hub_mailbox_capacity, Arc::clone(&metrics_sink));

    let app_state = AppState::new(
        hub,
        metrics_sink,
        prometheus,
        config.outbound_queue_capacity,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
