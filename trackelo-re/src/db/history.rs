//! Comparison history log: append-only audit trail
//!
//! One row per recorded comparison, never mutated or deleted. The log is
//! the authoritative source for comparison counts and partner sets; the
//! counters on rating rows are a cache kept in step by writing both in
//! the same transaction.

use crate::db::parse_guid;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::{HashMap, HashSet};
use trackelo_common::db::models::ComparisonRecord;
use trackelo_common::Scope;
use uuid::Uuid;

fn record_from_row(row: &SqliteRow) -> Result<ComparisonRecord> {
    let track_a: String = row.try_get("track_a_id")?;
    let track_b: String = row.try_get("track_b_id")?;
    let winner: String = row.try_get("winner_id")?;
    let scope: String = row.try_get("scope")?;
    let session: String = row.try_get("session_id")?;

    Ok(ComparisonRecord {
        id: row.try_get("id")?,
        track_a_id: parse_guid(&track_a, "track_a")?,
        track_b_id: parse_guid(&track_b, "track_b")?,
        winner_id: parse_guid(&winner, "winner")?,
        scope: scope
            .parse()
            .map_err(|_| Error::Internal(format!("Invalid scope in history row: '{}'", scope)))?,
        affects_global_a: row.try_get("affects_global_a")?,
        affects_global_b: row.try_get("affects_global_b")?,
        a_scope_before: row.try_get("a_scope_before")?,
        a_scope_after: row.try_get("a_scope_after")?,
        b_scope_before: row.try_get("b_scope_before")?,
        b_scope_after: row.try_get("b_scope_after")?,
        a_global_before: row.try_get("a_global_before")?,
        a_global_after: row.try_get("a_global_after")?,
        b_global_before: row.try_get("b_global_before")?,
        b_global_after: row.try_get("b_global_after")?,
        session_id: parse_guid(&session, "session")?,
        timestamp: row.try_get("timestamp")?,
    })
}

/// Append one comparison record; returns the assigned row id
///
/// Called only from inside the engine's record-comparison transaction so
/// the log commits together with the rating and session writes.
pub async fn append_tx(
    tx: &mut Transaction<'_, Sqlite>,
    record: &ComparisonRecord,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO comparison_history (
            track_a_id, track_b_id, winner_id, scope,
            affects_global_a, affects_global_b,
            a_scope_before, a_scope_after, b_scope_before, b_scope_after,
            a_global_before, a_global_after, b_global_before, b_global_after,
            session_id, timestamp
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.track_a_id.to_string())
    .bind(record.track_b_id.to_string())
    .bind(record.winner_id.to_string())
    .bind(record.scope.as_db_value())
    .bind(record.affects_global_a)
    .bind(record.affects_global_b)
    .bind(record.a_scope_before)
    .bind(record.a_scope_after)
    .bind(record.b_scope_before)
    .bind(record.b_scope_after)
    .bind(record.a_global_before)
    .bind(record.a_global_after)
    .bind(record.b_global_before)
    .bind(record.b_global_after)
    .bind(record.session_id.to_string())
    .bind(record.timestamp)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Comparisons a track has appeared in within a scope
pub async fn count_for(pool: &SqlitePool, track_id: Uuid, scope: Scope) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM comparison_history
        WHERE scope = ? AND (track_a_id = ? OR track_b_id = ?)
        "#,
    )
    .bind(scope.as_db_value())
    .bind(track_id.to_string())
    .bind(track_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Comparison counts for every track seen in a scope
///
/// Tracks with no history simply have no entry.
pub async fn counts_for_scope(pool: &SqlitePool, scope: Scope) -> Result<HashMap<Uuid, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT track_id, COUNT(*) FROM (
            SELECT track_a_id AS track_id FROM comparison_history WHERE scope = ?
            UNION ALL
            SELECT track_b_id AS track_id FROM comparison_history WHERE scope = ?
        )
        GROUP BY track_id
        "#,
    )
    .bind(scope.as_db_value())
    .bind(scope.as_db_value())
    .fetch_all(pool)
    .await?;

    let mut counts = HashMap::with_capacity(rows.len());
    for (track_id, count) in rows {
        counts.insert(parse_guid(&track_id, "track")?, count);
    }

    Ok(counts)
}

/// Distinct opponents a track has been paired with in a scope
pub async fn partners_of(pool: &SqlitePool, track_id: Uuid, scope: Scope) -> Result<HashSet<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT CASE WHEN track_a_id = ? THEN track_b_id ELSE track_a_id END
        FROM comparison_history
        WHERE scope = ? AND (track_a_id = ? OR track_b_id = ?)
        "#,
    )
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .bind(track_id.to_string())
    .bind(track_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut partners = HashSet::with_capacity(rows.len());
    for (partner,) in rows {
        partners.insert(parse_guid(&partner, "partner")?);
    }

    Ok(partners)
}

/// Most recent comparison timestamp per opponent of a track in a scope
///
/// Drives the repeat-pairing fallback once a track has faced every
/// candidate: the least recently faced opponent goes first.
pub async fn partner_last_compared(
    pool: &SqlitePool,
    track_id: Uuid,
    scope: Scope,
) -> Result<HashMap<Uuid, DateTime<Utc>>> {
    let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
        r#"
        SELECT CASE WHEN track_a_id = ? THEN track_b_id ELSE track_a_id END AS partner,
               MAX(timestamp)
        FROM comparison_history
        WHERE scope = ? AND (track_a_id = ? OR track_b_id = ?)
        GROUP BY partner
        "#,
    )
    .bind(track_id.to_string())
    .bind(scope.as_db_value())
    .bind(track_id.to_string())
    .bind(track_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut last = HashMap::with_capacity(rows.len());
    for (partner, at) in rows {
        last.insert(parse_guid(&partner, "partner")?, at);
    }

    Ok(last)
}

/// Total comparisons recorded in a scope
pub async fn count_in_scope(pool: &SqlitePool, scope: Scope) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comparison_history WHERE scope = ?")
        .bind(scope.as_db_value())
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Page of comparison records in a scope, newest first
pub async fn list_for_scope(
    pool: &SqlitePool,
    scope: Scope,
    limit: i64,
    offset: i64,
) -> Result<Vec<ComparisonRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM comparison_history
        WHERE scope = ?
        ORDER BY id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(scope.as_db_value())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}
