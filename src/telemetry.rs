use chrono::Utc;
use metrics::counter;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::metrics::LOG_MESSAGES_TOTAL;
use crate::shared::AppError;

const DEFAULT_FILTER: &str = "polydraw=debug,tower_http=debug";

/// Counts every emitted log event by level
pub struct LogMetricsLayer;

impl<S: Subscriber> Layer<S> for LogMetricsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        counter!(LOG_MESSAGES_TOTAL, "level" => level_label(event.metadata().level()))
            .increment(1);
    }
}

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

/// `<log_dir>/server-YYYY-MM-DD.log` for today
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("server-{}.log", Utc::now().format("%Y-%m-%d")))
}

/// Initialize tracing: stdout always, plus an appending log file when `log_dir` is set
pub fn init_tracing(log_dir: Option<&Path>) -> Result<(), AppError> {
    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file_path(dir))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .with(LogMetricsLayer)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}
