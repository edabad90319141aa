//! Tracing setup shared by the binaries.
use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "struct_form=warn";
const VERBOSE_LOG_FILTER: &str = "struct_form=debug";

pub struct LogConfig {
    pub verbose: bool,
    pub ansi: bool,
}

/// Install a stderr subscriber. `RUST_LOG` wins over both defaults.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let fallback = if config.verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
