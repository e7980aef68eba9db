//! # Conforma API Server
//!
//! API server for the Conforma quality-management platform. This binary
//! exposes the privileged user-provisioning workflow the admin SPA uses:
//! credential login, user creation with saga-style compensation, and
//! user deletion with tenant-scoped authorization.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/conforma \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p conforma-api
//! ```

use std::sync::Arc;

use conforma_api::{
    app::{build_router, AppState},
    config::Config,
};
use conforma_shared::db::migrations::run_migrations;
use conforma_shared::db::pool::{create_pool, DatabaseConfig};
use conforma_shared::identity::PgDirectory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conforma_api=info,conforma_shared=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Conforma API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let directory = Arc::new(PgDirectory::new(pool.clone()));
    let state = AppState::new(pool, directory, config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when a shutdown signal is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown handler: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
