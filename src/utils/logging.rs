//! Tracing setup for diagnostics.
//!
//! Diagnostics go to stderr so that stdout only carries the journal lines.
//! `RUST_LOG` takes precedence when set; otherwise the configured
//! `LOG_LEVEL` applies to everything.

use tracing_subscriber::EnvFilter;

/// Normalizes a configured level to an `EnvFilter` directive. Unknown values fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => "off",
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    }
}

pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(level)))
}

pub fn init(level: &str) {
    // try_init: tests and the binary may both call this
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
