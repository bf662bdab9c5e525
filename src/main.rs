//! event-registrar server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use event_registrar::api;
use event_registrar::app_state::AppState;
use event_registrar::config::AppConfig;
use event_registrar::persistence::{EventStore, MemoryEventStore, PostgresEventStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(addr = %config.listen_addr, "starting event-registrar");

    // Build persistence layer
    let store: Arc<dyn EventStore> = if config.persistence_enabled {
        let pg = PostgresEventStore::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        if config.run_migrations {
            pg.migrate().await.context("running migrations")?;
            tracing::info!("migrations applied");
        }
        Arc::new(pg)
    } else {
        tracing::warn!("persistence disabled; using in-memory store");
        Arc::new(MemoryEventStore::new())
    };

    // Build application
    let app_state = AppState::new(store, &config);
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
