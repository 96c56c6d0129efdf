//! Logging setup shared by the wellness binaries.
//!
//! Everything is written to stderr so command output on stdout stays
//! scriptable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging for the CLI
///
/// `verbose` raises the default level from WARN to DEBUG. RUST_LOG still
/// wins when it is set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    init_with_level(default_level)
}

/// Initialize logging with a specific default level
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for unit tests (captured per test)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
