//! # Logging
//!
//! `tracing` subscriber setup for binaries and tests.
//!
//! `RUST_LOG` selects the filter (default `info`), e.g.
//! `RUST_LOG=cotiza_db=debug` to see every query and allocation attempt.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. Call once, at process start.
///
/// ## Example
/// ```no_run
/// cotiza_db::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Subscriber for tests: `debug` level, captured by the test harness.
/// Safe to call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
