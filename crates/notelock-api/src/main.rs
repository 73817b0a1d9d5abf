//! # notelock-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to a configurable port (default
//! 8080). Configuration comes entirely from the environment; secrets are
//! redacted from all startup logging.

use std::sync::Arc;

use notelock_api::lifecycle::OrderLifecycle;
use notelock_api::state::{AppConfig, AppState};
use notelock_api::store::OrderStore;
use notelock_client::{RailsClient, RailsConfig};
use notelock_crypto::IpnVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let config = AppConfig { port };

    // Collaborator clients from environment.
    let rails_config = RailsConfig::from_env().map_err(|e| {
        tracing::error!("collaborator configuration failed: {e}");
        e
    })?;
    tracing::info!(config = ?rails_config, "collaborators configured");
    let rails = RailsClient::new(&rails_config)?;
    let verifier = IpnVerifier::new(rails_config.ipn_secret.clone().into_bytes());

    // Database pool (optional — absent means in-memory only).
    let db_pool = notelock_api::db::init_pool().await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    let store = OrderStore::new(db_pool);
    let lifecycle = OrderLifecycle::new(
        store,
        Arc::new(rails.payments().clone()),
        Arc::new(rails.ledger().clone()),
        verifier,
    );

    // Hydrate the in-memory index from the database (if connected).
    let hydrated = lifecycle.store().hydrate().await.map_err(|e| {
        tracing::error!("database hydration failed: {e}");
        e
    })?;
    if hydrated > 0 {
        tracing::info!(orders = hydrated, "hydrated order index from database");
    }

    let state = AppState::new(config, lifecycle);
    let app = notelock_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Notelock API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
