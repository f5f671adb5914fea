//! trackelo-re (Rating Engine) - comparative track rating service
//!
//! Ranks music tracks by pairwise comparison: each recorded winner
//! drives an Elo update, ratings are kept per scope (global or a single
//! playlist), playlist comparisons propagate into the global ranking
//! until a per-track threshold, and ranking sessions resume across
//! restarts.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use trackelo_common::db::init::init_database;
use trackelo_re::config::{Args, ServiceConfig};
use trackelo_re::{build_router, AppState, EngineParams, RatingEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting TrackElo Rating Engine (trackelo-re) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = ServiceConfig::resolve(&args);
    info!("Root folder: {}", config.root_folder.display());
    info!("Database path: {}", config.database.display());

    let pool = match init_database(&config.database).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let params = EngineParams::load(&pool)
        .await
        .context("Failed to load engine parameters")?;
    info!(
        "✓ Engine parameters: k_factor={}, propagation_threshold={}",
        params.k_factor, params.propagation_threshold
    );

    let engine = RatingEngine::new(pool.clone(), params);
    let state = AppState::new(pool, engine);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port))
        .await
        .context("Failed to bind listen port")?;
    info!("trackelo-re listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
