//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, codec and gatekeeper construction, the
//! abuse-state sweeper, and the Axum server lifecycle.

use crate::abuse::{Gatekeeper, spawn_sweeper};
use crate::application::services::ShortenService;
use crate::config::Config;
use crate::domain::repositories::UrlRepository;
use crate::infrastructure::persistence::{InMemoryUrlRepository, PgUrlRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory store)
/// - Codec from `SECRET_ALPHABET` / `CODE_MIN_LENGTH`
/// - Gatekeeper and its background sweeper, unless disabled
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Codec configuration is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = connect_repository(&config).await?;

    let codec = Arc::new(config.build_codec()?);
    let shorten_service = Arc::new(ShortenService::new(repository, codec));

    let mut state = AppState::new(shorten_service, config.domain_name.clone())
        .behind_proxy(config.behind_proxy);
    if let Some(ref base_url) = config.base_url {
        state = state.with_base_url(base_url.clone());
    }

    let sweeper = match config.abuse_config() {
        Some(abuse_config) => {
            let gatekeeper = Arc::new(Gatekeeper::with_system_clock(abuse_config));
            let handle = spawn_sweeper(
                gatekeeper.clone(),
                Duration::from_secs(config.sweep_interval_secs),
            );
            tracing::info!("Abuse protection enabled");
            state = state.with_gatekeeper(gatekeeper);
            Some(handle)
        }
        None => {
            tracing::warn!("Abuse protection disabled");
            None
        }
    };

    let app = NormalizePathLayer::trim_trailing_slash().layer(app_router(state));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn connect_repository(config: &Config) -> Result<Arc<dyn UrlRepository>> {
    let Some(ref database_url) = config.database_url else {
        tracing::warn!("No database configured, records are kept in memory only");
        return Ok(Arc::new(InMemoryUrlRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    Ok(Arc::new(PgUrlRepository::new(Arc::new(pool))))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
