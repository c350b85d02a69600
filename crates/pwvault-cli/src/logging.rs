//! Logging setup.
//!
//! `RUST_LOG` wins when set. Otherwise each `-v` raises the level one step
//! from info to trace, and without `-v` the configured `logging.level` is
//! used. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for the given verbosity and configured level.
pub fn directive(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.trim().to_ascii_lowercase(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber.
pub fn init(verbose: u8, configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, configured)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
