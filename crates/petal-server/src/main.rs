mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use petal_api::state::AppStateInner;
use petal_api::validation::ValidationPolicy;
use petal_db::{BouquetStore, LocalStore, RemoteStore};

use crate::config::{Config, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "petal=debug,petal_api=debug,petal_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    info!("Bouquet backend: {}", config.store.backend());
    let store: Arc<dyn BouquetStore> = match config.store {
        StoreConfig::Local { db_path } => {
            info!("Opening database at {}", db_path.display());
            Arc::new(LocalStore::open(&db_path)?)
        }
        StoreConfig::Remote(remote) => {
            info!("Remote documents at {}", remote.base_url);
            let store = RemoteStore::new(remote)?;
            // Writes are refused until this completes
            store.begin_sign_in();
            Arc::new(store)
        }
    };

    let policy = ValidationPolicy {
        require_message: config.require_message,
    };

    let app = petal_api::router(AppStateInner::new(store, policy))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Petal server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Could not install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down");
    }
}
