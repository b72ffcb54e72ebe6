//! Logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber at `level`. `RUST_LOG` takes precedence.
/// Calling it again after a subscriber is installed is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
