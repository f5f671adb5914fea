//! Playlist maintenance endpoints

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::db::playlists;
use crate::error::{Error, Result};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub status: String,
    pub tracks: usize,
}

/// POST /api/playlist/:playlist_id/reorder
///
/// Rewrites the playlist's stored positions from its playlist-scope
/// ratings, best first. Unrated tracks keep their relative order at the
/// end.
pub async fn reorder_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<ReorderResponse>> {
    require_playlist(&state, playlist_id).await?;
    let tracks = state.engine.reorder_playlist_by_rating(playlist_id).await?;

    Ok(Json(ReorderResponse {
        status: "reordered".to_string(),
        tracks,
    }))
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub seeded: usize,
}

/// POST /api/playlist/:playlist_id/seed_ratings
///
/// Creates missing playlist-scope rating rows, inheriting each track's
/// global rating. Idempotent: a second call seeds zero.
pub async fn seed_ratings(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<SeedResponse>> {
    require_playlist(&state, playlist_id).await?;
    let seeded = state
        .engine
        .migrate_seed_playlist_ratings(playlist_id)
        .await?;

    Ok(Json(SeedResponse { seeded }))
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub status: String,
}

/// DELETE /api/playlist/:playlist_id/ratings
///
/// Teardown hook for playlist deletion: drops the playlist-scope rating
/// rows and session. Comparison history is kept as the audit trail. No
/// existence check, so the owning module can call it after the playlist
/// row is already gone.
pub async fn purge_ratings(
    State(state): State<AppState>,
    Path(playlist_id): Path<Uuid>,
) -> Result<Json<PurgeResponse>> {
    state.engine.purge_scope(playlist_id).await?;

    Ok(Json(PurgeResponse {
        status: "purged".to_string(),
    }))
}

async fn require_playlist(state: &AppState, playlist_id: Uuid) -> Result<()> {
    if !playlists::playlist_exists(&state.db, playlist_id).await? {
        return Err(Error::NotFound(format!(
            "playlist {} not found",
            playlist_id
        )));
    }
    Ok(())
}
