//! Structured logging initialization.
//!
//! The library itself only emits `tracing` events; hosting applications
//! opt in to a subscriber here. Two formats:
//! - Human-readable console output for interactive use
//! - Machine-parseable JSONL for agent workflows
//!
//! All log output goes to stderr; stdout stays reserved for payloads.

use std::io::IsTerminal;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console lines.
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive string, e.g. `info` or `ps_core=debug`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Build a config from `PS_LOG_FORMAT` and `PS_LOG` (falling back to
    /// `RUST_LOG`, then `info`).
    pub fn from_env() -> Self {
        let format = match std::env::var("PS_LOG_FORMAT").as_deref() {
            Ok("jsonl") | Ok("json") => LogFormat::Jsonl,
            _ => LogFormat::Human,
        };
        let filter = std::env::var("PS_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        Self { format, filter }
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; only the first call installs.
pub fn init_logging(config: &LogConfig) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_new(&config.filter)
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal());
        let result = match config.format {
            LogFormat::Human => builder.try_init(),
            LogFormat::Jsonl => builder.json().try_init(),
        };
        // A subscriber installed by the host wins; ours is best-effort.
        let _ = result;
    });
}
