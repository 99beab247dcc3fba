//! Tracing subscriber for the binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Verbosity;

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
