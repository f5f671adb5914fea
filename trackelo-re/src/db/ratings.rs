//! Rating store: one row per (track, scope)
//!
//! Rows are created lazily on first comparison. A new playlist-scope row
//! inherits its starting value from the track's current global rating,
//! creating the global row too when the track has never been rated at
//! all. All writes happen inside the caller's transaction.

use crate::db::parse_guid;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use trackelo_common::db::models::{Rating, DEFAULT_RATING};
use trackelo_common::Scope;
use uuid::Uuid;

type RatingRow = (String, String, f64, i64, i64, i64, Option<DateTime<Utc>>);

fn rating_from_row(row: RatingRow) -> Result<Rating> {
    let (track_id, scope, value, comparison_count, wins, losses, last_compared_at) = row;
    let scope: Scope = scope
        .parse()
        .map_err(|_| Error::Internal(format!("Invalid scope in ratings row: '{}'", scope)))?;

    Ok(Rating {
        track_id: parse_guid(&track_id, "track")?,
        scope,
        value,
        comparison_count,
        wins,
        losses,
        last_compared_at,
    })
}

/// Fetch a rating row, if one exists
pub async fn get(pool: &SqlitePool, track_id: Uuid, scope: Scope) -> Result<Option<Rating>> {
    let row: Option<RatingRow> = sqlx::query_as(
        r#"
        SELECT track_id, scope, value, comparison_count, wins, losses, last_compared_at
        FROM ratings WHERE track_id = ? AND scope = ?
        "#,
    )
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .fetch_optional(pool)
    .await?;

    row.map(rating_from_row).transpose()
}

/// Transaction variant of [`get`]
pub async fn get_tx(
    tx: &mut Transaction<'_, Sqlite>,
    track_id: Uuid,
    scope: Scope,
) -> Result<Option<Rating>> {
    let row: Option<RatingRow> = sqlx::query_as(
        r#"
        SELECT track_id, scope, value, comparison_count, wins, losses, last_compared_at
        FROM ratings WHERE track_id = ? AND scope = ?
        "#,
    )
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .fetch_optional(&mut **tx)
    .await?;

    row.map(rating_from_row).transpose()
}

async fn insert_tx(
    tx: &mut Transaction<'_, Sqlite>,
    track_id: Uuid,
    scope: Scope,
    value: f64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ratings (track_id, scope, value, comparison_count, wins, losses)
        VALUES (?, ?, ?, 0, 0, 0)
        "#,
    )
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .bind(value)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Fetch a rating row, creating it when absent
///
/// Global rows start at the default rating. Playlist rows seed from the
/// track's global rating, initializing the global row first when the
/// track has never been compared anywhere. Idempotent: a second call with
/// no intervening write returns the same row.
pub async fn get_or_init_tx(
    tx: &mut Transaction<'_, Sqlite>,
    track_id: Uuid,
    scope: Scope,
) -> Result<Rating> {
    if let Some(rating) = get_tx(tx, track_id, scope).await? {
        return Ok(rating);
    }

    let value = match scope {
        Scope::Global => DEFAULT_RATING,
        Scope::Playlist(_) => match get_tx(tx, track_id, Scope::Global).await? {
            Some(global) => global.value,
            None => {
                insert_tx(tx, track_id, Scope::Global, DEFAULT_RATING).await?;
                DEFAULT_RATING
            }
        },
    };

    insert_tx(tx, track_id, scope, value).await?;
    tracing::debug!(track_id = %track_id, scope = %scope, value, "Initialized rating row");

    Ok(Rating::new(track_id, scope, value))
}

/// Apply one comparison result to an existing rating row
///
/// Overwrites the value and advances the counter columns. The row must
/// already exist ([`get_or_init_tx`] runs earlier in the same
/// transaction).
pub async fn apply_result_tx(
    tx: &mut Transaction<'_, Sqlite>,
    track_id: Uuid,
    scope: Scope,
    new_value: f64,
    won: bool,
    at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE ratings
        SET value = ?,
            comparison_count = comparison_count + 1,
            wins = wins + ?,
            losses = losses + ?,
            last_compared_at = ?
        WHERE track_id = ? AND scope = ?
        "#,
    )
    .bind(new_value)
    .bind(if won { 1 } else { 0 })
    .bind(if won { 0 } else { 1 })
    .bind(at)
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Internal(format!(
            "Rating row missing for track {} in scope {}",
            track_id, scope
        )));
    }

    Ok(())
}

/// All rating values in a scope, keyed by track
pub async fn values_for_scope_tx(
    tx: &mut Transaction<'_, Sqlite>,
    scope: Scope,
) -> Result<HashMap<Uuid, f64>> {
    let rows: Vec<(String, f64)> =
        sqlx::query_as("SELECT track_id, value FROM ratings WHERE scope = ?")
            .bind(scope.as_db_value())
            .fetch_all(&mut **tx)
            .await?;

    let mut values = HashMap::with_capacity(rows.len());
    for (track_id, value) in rows {
        values.insert(parse_guid(&track_id, "track")?, value);
    }

    Ok(values)
}

/// Ranked standings for a scope: ratings descending by value, with track
/// titles where the library knows them
pub async fn standings(pool: &SqlitePool, scope: Scope) -> Result<Vec<(Rating, Option<String>)>> {
    let rows: Vec<(String, String, f64, i64, i64, i64, Option<DateTime<Utc>>, Option<String>)> =
        sqlx::query_as(
            r#"
            SELECT r.track_id, r.scope, r.value, r.comparison_count, r.wins, r.losses,
                   r.last_compared_at, t.title
            FROM ratings r
            LEFT JOIN tracks t ON t.guid = r.track_id
            WHERE r.scope = ?
            ORDER BY r.value DESC
            "#,
        )
        .bind(scope.as_db_value())
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|(track_id, scope, value, count, wins, losses, last, title)| {
            let rating = rating_from_row((track_id, scope, value, count, wins, losses, last))?;
            Ok((rating, title))
        })
        .collect()
}

/// Delete all rating rows in a scope; returns the number removed
///
/// Used when the owning playlist is deleted. Comparison history is never
/// touched.
pub async fn delete_scope_tx(tx: &mut Transaction<'_, Sqlite>, scope: Scope) -> Result<u64> {
    let result = sqlx::query("DELETE FROM ratings WHERE scope = ?")
        .bind(scope.as_db_value())
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackelo_common::db::init::init_schema;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_or_init_global_uses_default() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();

        let mut tx = pool.begin().await.unwrap();
        let rating = get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(rating.value, DEFAULT_RATING);
        assert_eq!(rating.comparison_count, 0);
        assert!(get(&pool, track, Scope::Global).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_or_init_is_idempotent() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();

        let mut tx = pool.begin().await.unwrap();
        let first = get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
        let second = get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(first.comparison_count, second.comparison_count);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_playlist_rating_seeds_from_global() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();
        let playlist = Uuid::new_v4();

        // Give the track a non-default global rating first
        let mut tx = pool.begin().await.unwrap();
        get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
        apply_result_tx(&mut tx, track, Scope::Global, 1580.0, true, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let rating = get_or_init_tx(&mut tx, track, Scope::Playlist(playlist))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(rating.value, 1580.0);
        assert_eq!(rating.comparison_count, 0);
    }

    #[tokio::test]
    async fn test_playlist_rating_creates_missing_global_row() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();
        let playlist = Uuid::new_v4();

        let mut tx = pool.begin().await.unwrap();
        let rating = get_or_init_tx(&mut tx, track, Scope::Playlist(playlist))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(rating.value, DEFAULT_RATING);

        let global = get(&pool, track, Scope::Global).await.unwrap();
        assert!(global.is_some(), "Global row should be created by seeding");
        assert_eq!(global.unwrap().value, DEFAULT_RATING);
    }

    #[tokio::test]
    async fn test_apply_result_advances_counters() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();
        let at = Utc::now();

        let mut tx = pool.begin().await.unwrap();
        get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
        apply_result_tx(&mut tx, track, Scope::Global, 1516.0, true, at).await.unwrap();
        apply_result_tx(&mut tx, track, Scope::Global, 1502.0, false, at).await.unwrap();
        tx.commit().await.unwrap();

        let rating = get(&pool, track, Scope::Global).await.unwrap().unwrap();
        assert_eq!(rating.value, 1502.0);
        assert_eq!(rating.comparison_count, 2);
        assert_eq!(rating.wins, 1);
        assert_eq!(rating.losses, 1);
        assert!(rating.last_compared_at.is_some());
    }

    #[tokio::test]
    async fn test_apply_result_requires_existing_row() {
        let pool = setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let result =
            apply_result_tx(&mut tx, Uuid::new_v4(), Scope::Global, 1500.0, true, Utc::now()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_standings_order_descending() {
        let pool = setup_test_db().await;
        let (t1, t2, t3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let mut tx = pool.begin().await.unwrap();
        for (track, value) in [(t1, 1450.0), (t2, 1600.0), (t3, 1500.0)] {
            get_or_init_tx(&mut tx, track, Scope::Global).await.unwrap();
            apply_result_tx(&mut tx, track, Scope::Global, value, true, Utc::now())
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let rows = standings(&pool, Scope::Global).await.unwrap();
        let order: Vec<Uuid> = rows.iter().map(|(r, _)| r.track_id).collect();
        assert_eq!(order, vec![t2, t3, t1]);
    }

    #[tokio::test]
    async fn test_delete_scope_leaves_other_scopes() {
        let pool = setup_test_db().await;
        let track = Uuid::new_v4();
        let playlist = Uuid::new_v4();

        let mut tx = pool.begin().await.unwrap();
        get_or_init_tx(&mut tx, track, Scope::Playlist(playlist)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let removed = delete_scope_tx(&mut tx, Scope::Playlist(playlist)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(removed, 1);
        assert!(get(&pool, track, Scope::Playlist(playlist)).await.unwrap().is_none());
        assert!(get(&pool, track, Scope::Global).await.unwrap().is_some());
    }
}
