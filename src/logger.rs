use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Installs the global tracing subscriber. `RUST_LOG` wins over the CLI
/// level when set.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    Registry::default().with(filter).with(fmt::layer()).init();
}
