pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use std::future::Future;
use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

use crate::config::{Config, ConfigError, StorageBackend};
use crate::routes::create_routes;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to database")]
    Database(#[from] sqlx::Error),

    #[error("failed to run migrations")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("server I/O error")]
    Io(#[from] io::Error),
}

async fn open_store(config: &Config) -> Result<Arc<dyn Store>, StartupError> {
    match config.backend {
        StorageBackend::Postgres => {
            let store = PgStore::connect(
                config.database.connect_options()?,
                config.database.max_connections,
                config.database.acquire_timeout,
            )
            .await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub async fn run(config: Config) -> Result<(), StartupError> {
    let store = open_store(&config).await?;
    let app = create_routes(AppState::new(store), config.request_timeout);

    let listener = bind_listener(&config).await?;
    tracing::info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Binds `HOST:PORT`; the host may be a name such as `localhost`.
async fn bind_listener(config: &Config) -> io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}

/// Completes when `listener` reports its signal. A listener that could not
/// be installed never completes, so it cannot trigger a shutdown.
async fn signal_or_park<F>(name: &str, listener: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = listener.await {
        tracing::error!(error = %e, "Failed to listen for {}", name);
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = signal_or_park("Ctrl-C", signal::ctrl_c());

    #[cfg(unix)]
    let terminate = signal_or_park("SIGTERM", async {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        sigterm.recv().await;
        Ok(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
