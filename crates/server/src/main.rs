mod config;
mod error;
mod metrics;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::{
    config::{LogFormat, LogOutput, ServerConfig},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 1: thread-local tracing so config loading can log;
    // replaced by the global subscriber in phase 2
    let basic_tracing = init_tracing_basic();

    info!("Starting Tablog Server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Phase 2: tracing from config (format, level, output)
    drop(basic_tracing);
    init_tracing_from_config(&config)?;

    info!("Configuration loaded successfully");
    info!(
        "Sessions: max={}, parser: max_line_bytes={}, page_size={}..={}",
        config.sessions.max_sessions,
        config.parser.max_line_bytes,
        config.parser.default_page_size,
        config.parser.max_page_size,
    );

    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .context("Invalid bind address")?;

    let state = AppState::new(config);
    let app = routes::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on: http://{}", addr);
    info!("  - Parse: POST http://{}/parse", addr);
    info!("  - Sessions: POST http://{}/api/parse", addr);
    info!("  - Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Phase 1: Basic tracing init so we can log during config loading.
/// Uses RUST_LOG env var or a sensible default.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,server=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: Install the global subscriber described by the logging config.
fn init_tracing_from_config(config: &ServerConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Prefer RUST_LOG env var, fall back to config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let (writer, ansi) = log_writer(&config.logging.output)?;
    let layer = fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);

    match config.logging.format {
        LogFormat::Json => {
            let layer = layer.json().with_thread_ids(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = layer.with_file(false).with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
    Ok(())
}

/// Writer for the configured output; colour only on a terminal stream.
fn log_writer(output: &LogOutput) -> Result<(BoxMakeWriter, bool)> {
    match output {
        LogOutput::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), true)),
        LogOutput::File { path } => {
            let file = open_log_file(path)?;
            Ok((BoxMakeWriter::new(Arc::new(file)), false))
        }
    }
}

fn open_log_file(path: &str) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
