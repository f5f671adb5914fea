//! trackelo-re library - comparative rating engine service
//!
//! Ranks music tracks through pairwise comparisons: each recorded winner
//! drives an Elo update, ratings are kept per scope (global or a single
//! playlist), and playlist comparisons propagate into the global ranking
//! until a per-track threshold is reached.

use axum::routing::{delete, get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;

pub use engine::{ComparisonOutcome, EngineParams, RatingEngine, TieBreak};
pub use error::{Error, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Rating engine over the same pool
    pub engine: RatingEngine,
}

impl AppState {
    pub fn new(db: SqlitePool, engine: RatingEngine) -> Self {
        Self { db, engine }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/version", get(api::version))
        .route("/api/next_pair", get(api::next_pair))
        .route("/api/comparison", post(api::record_comparison))
        .route("/api/rating/:track_id", get(api::get_rating))
        .route("/api/standings", get(api::standings))
        .route("/api/history", get(api::history))
        .route("/api/session", get(api::session))
        .route(
            "/api/playlist/:playlist_id/reorder",
            post(api::reorder_playlist),
        )
        .route(
            "/api/playlist/:playlist_id/seed_ratings",
            post(api::seed_ratings),
        )
        .route(
            "/api/playlist/:playlist_id/ratings",
            delete(api::purge_ratings),
        )
        .route(
            "/api/settings",
            get(api::get_settings).put(api::update_settings),
        )
        // Local-access service; the UI talks to it from another port
        .layer(CorsLayer::permissive())
        .with_state(state)
}
