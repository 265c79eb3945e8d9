use clap::{ArgAction, Parser};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Hub mailbox capacity must be greater than zero")]
    ZeroMailboxCapacity,

    #[error("Outbound queue capacity must be greater than zero")]
    ZeroOutboundCapacity,

    #[error("Host must not be empty")]
    EmptyHost,
}

/// Server configuration, read from command-line flags with environment fallbacks
#[derive(Debug, Clone, Parser)]
#[command(name = "polydraw", about = "Real-time collaborative drawing relay")]
pub struct ServerConfig {
    /// Interface to listen on
    #[arg(long, env = "POLYDRAW_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "POLYDRAW_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Pending hub commands before senders start waiting
    #[arg(long, env = "POLYDRAW_HUB_MAILBOX", default_value_t = 256)]
    pub hub_mailbox_capacity: usize,

    /// Frames queued for one peer before it counts as stalled and is evicted
    #[arg(long, env = "POLYDRAW_OUTBOUND_QUEUE", default_value_t = 512)]
    pub outbound_queue_capacity: usize,

    /// Directory for daily log files; stdout only when unset
    #[arg(long, env = "POLYDRAW_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Expose Prometheus metrics on /metrics
    #[arg(long, env = "POLYDRAW_METRICS", default_value_t = true, action = ArgAction::Set)]
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            hub_mailbox_capacity: 256,
            outbound_queue_capacity: 512,
            log_dir: None,
            metrics: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub_mailbox_capacity == 0 {
            return Err(ConfigError::ZeroMailboxCapacity);
        }
        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::ZeroOutboundCapacity);
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
