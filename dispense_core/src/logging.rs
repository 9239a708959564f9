//! Tracing setup for the dispense binary.
//!
//! Log lines go to stderr so stdout carries only the rendered schedule.
//! `RUST_LOG` always takes precedence over the level picked here.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber, at debug level when `verbose` is set
pub fn init(verbose: bool) {
    init_with_level(if verbose { "debug" } else { "info" })
}

/// Install the global subscriber with `default_level` as the fallback filter
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route logs through the test harness so they show up on failure
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
