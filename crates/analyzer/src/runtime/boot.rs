//! Boot — logging init and config load for the CLI.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::{ConfigError, ParserConfig};

/// Initialise the tracing / logging subsystem.
///
/// Output goes to stderr so stdout stays clean for entries.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load parser configuration, from `path` when given.
pub fn load_config(path: Option<&Path>) -> Result<ParserConfig, ConfigError> {
    let config = match path {
        Some(path) => ParserConfig::load_with(path, |key| std::env::var(key).ok())?,
        None => ParserConfig::load()?,
    };
    tracing::debug!(
        max_line_bytes = config.max_line_bytes,
        max_page_size = config.max_page_size,
        "parser configuration loaded"
    );
    Ok(config)
}
