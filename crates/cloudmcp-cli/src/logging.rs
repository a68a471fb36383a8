//! Tracing subscriber setup.
//!
//! Logs always go to stderr: stdout carries the stdio transport.

use tracing_subscriber::EnvFilter;

/// Level for commands that print their own report.
pub const QUIET_LEVEL: &str = "warn";

/// Install the global subscriber. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
