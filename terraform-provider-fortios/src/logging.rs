//! Logging setup
//!
//! stdout carries the plugin protocol, so console output goes to stderr.
//! An optional log directory receives JSON lines as well.

use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "terraform-provider-fortios.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
    pub json_console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_console: false,
        }
    }
}

impl LoggingConfig {
    pub fn debug(mut self, enabled: bool) -> Self {
        if enabled {
            self.level = "debug".to_string();
        }
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber. Keep the returned guard alive until
    /// exit or buffered file output is lost.
    pub fn init(&self) -> Result<Option<WorkerGuard>, tracing_subscriber::util::TryInitError> {
        let console = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(io::stderr);
        let console = if self.json_console {
            console.json().boxed()
        } else {
            console.boxed()
        };

        let Some(dir) = &self.log_dir else {
            tracing_subscriber::registry()
                .with(self.filter())
                .with(console)
                .try_init()?;
            return Ok(None);
        };

        let (writer, guard) = non_blocking(rolling::never(dir, LOG_FILE));
        let file = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .json()
            .with_writer(writer);

        tracing_subscriber::registry()
            .with(self.filter())
            .with(console)
            .with(file)
            .try_init()?;

        Ok(Some(guard))
    }
}
