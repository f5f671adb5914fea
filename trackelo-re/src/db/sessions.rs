//! Ranking session rows: one per scope
//!
//! PRIMARY KEY on the scope column enforces at most one session per
//! ranking context. Creating a second session for a scope surfaces a
//! conflict; callers resolve it by resuming the existing row.

use crate::db::parse_guid;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use trackelo_common::db::models::RankingSession;
use trackelo_common::Scope;
use uuid::Uuid;

fn session_from_row(row: &SqliteRow) -> Result<RankingSession> {
    let scope: String = row.try_get("scope")?;
    let session_id: String = row.try_get("session_id")?;
    let last_pair_a: Option<String> = row.try_get("last_pair_a")?;
    let last_pair_b: Option<String> = row.try_get("last_pair_b")?;

    let last_pair = match (last_pair_a, last_pair_b) {
        (Some(a), Some(b)) => Some((parse_guid(&a, "last_pair_a")?, parse_guid(&b, "last_pair_b")?)),
        _ => None,
    };

    Ok(RankingSession {
        scope: scope
            .parse()
            .map_err(|_| Error::Internal(format!("Invalid scope in session row: '{}'", scope)))?,
        session_id: parse_guid(&session_id, "session")?,
        last_pair,
        compared: row.try_get("compared")?,
        total: row.try_get("total")?,
        started_at: row.try_get("started_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn conflict_on_unique(e: sqlx::Error, scope: Scope) -> Error {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::SessionConflict(scope.as_db_value())
        }
        other => other.into(),
    }
}

/// Fetch the session row for a scope, if one exists
pub async fn get(pool: &SqlitePool, scope: Scope) -> Result<Option<RankingSession>> {
    let row = sqlx::query("SELECT * FROM rating_sessions WHERE scope = ?")
        .bind(scope.as_db_value())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// Transaction variant of [`get`]
pub async fn get_tx(
    tx: &mut Transaction<'_, Sqlite>,
    scope: Scope,
) -> Result<Option<RankingSession>> {
    let row = sqlx::query("SELECT * FROM rating_sessions WHERE scope = ?")
        .bind(scope.as_db_value())
        .fetch_optional(&mut **tx)
        .await?;

    row.as_ref().map(session_from_row).transpose()
}

/// Insert a new session row
///
/// Returns `SessionConflict` when the scope already has one.
pub async fn create(pool: &SqlitePool, session: &RankingSession) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO rating_sessions (scope, session_id, compared, total, started_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.scope.as_db_value())
    .bind(session.session_id.to_string())
    .bind(session.compared)
    .bind(session.total)
    .bind(session.started_at)
    .bind(session.updated_at)
    .execute(pool)
    .await
    .map_err(|e| conflict_on_unique(e, session.scope))?;

    Ok(())
}

/// Transaction variant of [`create`]
pub async fn create_tx(tx: &mut Transaction<'_, Sqlite>, session: &RankingSession) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO rating_sessions (scope, session_id, compared, total, started_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(session.scope.as_db_value())
    .bind(session.session_id.to_string())
    .bind(session.compared)
    .bind(session.total)
    .bind(session.started_at)
    .bind(session.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| conflict_on_unique(e, session.scope))?;

    Ok(())
}

/// Rewrite the pair total after the candidate set changed size
pub async fn update_total(
    pool: &SqlitePool,
    scope: Scope,
    total: i64,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("UPDATE rating_sessions SET total = ?, updated_at = ? WHERE scope = ?")
        .bind(total)
        .bind(at)
        .bind(scope.as_db_value())
        .execute(pool)
        .await?;

    Ok(())
}

/// Advance progress after a recorded comparison
pub async fn advance_tx(
    tx: &mut Transaction<'_, Sqlite>,
    scope: Scope,
    pair: (Uuid, Uuid),
    at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE rating_sessions
        SET compared = compared + 1, last_pair_a = ?, last_pair_b = ?, updated_at = ?
        WHERE scope = ?
        "#,
    )
    .bind(pair.0.to_string())
    .bind(pair.1.to_string())
    .bind(at)
    .bind(scope.as_db_value())
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Internal(format!("Session row missing for scope {}", scope)));
    }

    Ok(())
}

/// Remove the session row for a scope; returns the number removed
pub async fn delete_tx(tx: &mut Transaction<'_, Sqlite>, scope: Scope) -> Result<u64> {
    let result = sqlx::query("DELETE FROM rating_sessions WHERE scope = ?")
        .bind(scope.as_db_value())
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}
