use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{Config, LogFormat};

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &Config) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = Registry::default().with(env_filter);

    match config.log_format {
        LogFormat::Json => {
            let json_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true);
            registry.with(json_layer).try_init()?;
        }
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty().with_target(false)).try_init()?;
        }
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "capsule server starting");
    Ok(())
}

/// Log the effective configuration.
pub fn log_config(config: &Config) {
    tracing::info!(
        bind = %config.bind,
        log_level = %config.log_level,
        log_format = ?config.log_format,
        public_base_url = %config.public_base_url,
        projects_file = ?config.projects_file,
        "configuration loaded"
    );
}
