// --- File: crates/quincho_common/src/logging.rs ---
//! Logging utilities for the Quincho application.
//!
//! Provides a standardized tracing-subscriber setup used by the backend
//! binary and by tests that want log output.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with the default log level (INFO).
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still takes precedence through the env filter; the given
/// level applies to the `quincho` crates.
pub fn init_with_level(level: Level) {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("quincho={level}").parse().expect("valid directive"));

    // try_init so tests calling this repeatedly do not panic
    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
