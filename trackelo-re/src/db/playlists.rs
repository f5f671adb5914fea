//! Playlist membership and track lookups
//!
//! The engine treats tracks as opaque ids; the playlist and track tables
//! are owned by the library services. These queries supply candidate
//! sets and let the reorder operation rewrite stored positions.

use crate::db::parse_guid;
use crate::error::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

pub async fn playlist_exists(pool: &SqlitePool, playlist_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM playlists WHERE guid = ?)")
        .bind(playlist_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// Track ids of a playlist in stored order
pub async fn playlist_track_ids(pool: &SqlitePool, playlist_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(|(id,)| parse_guid(id, "track")).collect()
}

/// Transaction variant of [`playlist_track_ids`]
pub async fn playlist_track_ids_tx(
    tx: &mut Transaction<'_, Sqlite>,
    playlist_id: Uuid,
) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id.to_string())
    .fetch_all(&mut **tx)
    .await?;

    rows.iter().map(|(id,)| parse_guid(id, "track")).collect()
}

/// Every track in the library, the candidate set for global ranking
pub async fn all_track_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT guid FROM tracks ORDER BY guid")
        .fetch_all(pool)
        .await?;

    rows.iter().map(|(id,)| parse_guid(id, "track")).collect()
}

/// Stored (track, position) pairs of a playlist, by position
pub async fn positions(pool: &SqlitePool, playlist_id: Uuid) -> Result<Vec<(Uuid, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT track_id, position FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|(id, position)| Ok((parse_guid(id, "track")?, *position)))
        .collect()
}

/// Rewrite one membership row's position
pub async fn set_position_tx(
    tx: &mut Transaction<'_, Sqlite>,
    playlist_id: Uuid,
    track_id: Uuid,
    position: i64,
) -> Result<()> {
    sqlx::query("UPDATE playlist_tracks SET position = ? WHERE playlist_id = ? AND track_id = ?")
        .bind(position)
        .bind(playlist_id.to_string())
        .bind(track_id.to_string())
        .execute(&mut **tx)
        .await?;

    Ok(())
}
