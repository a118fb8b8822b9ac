//! Logging and timing for Lipikar tools
//!
//! Installs a `tracing` subscriber that writes to stderr, so command output on
//! stdout stays machine-readable. `RUST_LOG` overrides the configured level.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(config.ansi)
                    .with_target(config.show_target)
                    .with_writer(std::io::stderr)
                    .without_time()
                    .compact(),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.log_level,
        "Logging initialized"
    );

    Ok(())
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Include the event target in each line
    pub show_target: bool,
    /// Emit JSON lines instead of compact text
    pub json: bool,
    /// Color level names with ANSI escapes
    pub ansi: bool,
}

impl TelemetryConfig {
    /// Map `-q` / `-v` flags to a log level; warnings show by default
    pub fn for_verbosity(verbose: u8, quiet: bool) -> Self {
        let log_level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        Self {
            log_level: log_level.to_string(),
            show_target: verbose >= 2,
            ..Self::default()
        }
    }

    /// Turn off ANSI colors, for `--no-color` or non-terminal output
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            show_target: false,
            json: false,
            ansi: true,
        }
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Time elapsed so far
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_millis() as u64,
            "Timer completed"
        );
        duration
    }
}
