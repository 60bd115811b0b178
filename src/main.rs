//! lookupd entry point: CLI, startup wiring, signal-driven shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use lookupd::config::{self, ServerConfig};
use lookupd::handler::LookupHandler;
use lookupd::lifecycle::{signals, Shutdown};
use lookupd::net::Listener;
use lookupd::observability::logging;
use lookupd::store::{MemoryBackend, Pool};

/// Cancellation-aware HTTP lookup service.
#[derive(Debug, Parser)]
#[command(name = "lookupd", version)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listen address (e.g. 0.0.0.0:8080).
    #[arg(long)]
    listen: Option<String>,

    /// Override the read-stage timeout in milliseconds.
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Override the handle-stage timeout in milliseconds.
    #[arg(long)]
    handle_timeout_ms: Option<u64>,

    /// Override the write-stage timeout in milliseconds.
    #[arg(long)]
    write_timeout_ms: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if let Some(ms) = self.read_timeout_ms {
            config.timeouts.read_ms = ms;
        }
        if let Some(ms) = self.handle_timeout_ms {
            config.timeouts.handle_ms = ms;
        }
        if let Some(ms) = self.write_timeout_ms {
            config.timeouts.write_ms = ms;
        }
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Args::parse().into_config()?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        pool_size = config.store.pool_size,
        read_timeout_ms = config.timeouts.read_ms,
        handle_timeout_ms = config.timeouts.handle_ms,
        write_timeout_ms = config.timeouts.write_ms,
        "configuration loaded"
    );

    // Backend + pool. The bundled backend is the in-memory fixture store;
    // a real driver slots in behind `StoreBackend` without touching the core.
    let backend = match &config.store.fixture_path {
        Some(path) => Arc::new(MemoryBackend::from_fixture(path)?),
        None => Arc::new(MemoryBackend::new([])),
    };
    let pool = Arc::new(Pool::new(backend, config.store.pool_size));

    let handler = Arc::new(LookupHandler::new(
        Arc::clone(&pool),
        config.route.path_prefix.clone(),
        config.store.acquire_timeout(),
    ));

    // Failing to bind is the one process-fatal runtime error.
    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            signals::wait_for_signal().await;
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        });
    }

    listener
        .serve(
            handler,
            config.timeouts,
            shutdown.sessions().clone(),
            shutdown_rx,
        )
        .await;

    tracing::info!(
        active_sessions = shutdown.sessions().active_count(),
        "draining sessions"
    );
    shutdown.drain().await;
    pool.shutdown();

    tracing::info!("shutdown complete");
    Ok(())
}
