//! Settings table access
//!
//! Database-first configuration: the settings table is the source of
//! truth for runtime parameters. Reads that find no row write the
//! built-in default back so the table always reflects effective values.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::fmt::Display;
use std::str::FromStr;
use tracing::info;

/// Elo K-factor: maximum per-comparison rating swing
pub const SETTING_K_FACTOR: &str = "rating_k_factor";
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Playlist comparisons per track that also update its global rating
pub const SETTING_PROPAGATION_THRESHOLD: &str = "global_propagation_threshold";
pub const DEFAULT_PROPAGATION_THRESHOLD: i64 = 5;

/// Read a raw setting value
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Write a setting value, creating the row if needed
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Read a typed setting, writing the default back when missing
///
/// Parse failures are configuration errors: a corrupt value is surfaced
/// rather than silently replaced.
pub async fn get_setting_or<T>(pool: &SqlitePool, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
{
    match get_setting(pool, key).await? {
        Some(value) => value.parse::<T>().map_err(|_| {
            Error::Config(format!("Setting '{}' has invalid value: '{}'", key, value))
        }),
        None => {
            info!(
                "Setting '{}' not found in database, using default: {}",
                key, default
            );
            set_setting(pool, key, &default.to_string()).await?;
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_settings_table;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_settings_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_set_and_get_round_trip() {
        let pool = setup_test_db().await;

        set_setting(&pool, "rating_k_factor", "24.0").await.unwrap();
        let value = get_setting(&pool, "rating_k_factor").await.unwrap();
        assert_eq!(value, Some("24.0".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let pool = setup_test_db().await;
        let value = get_setting(&pool, "no_such_key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_get_setting_or_writes_default_back() {
        let pool = setup_test_db().await;

        let threshold: i64 = get_setting_or(&pool, SETTING_PROPAGATION_THRESHOLD, 5).await.unwrap();
        assert_eq!(threshold, 5);

        // Default must now be persisted
        let stored = get_setting(&pool, SETTING_PROPAGATION_THRESHOLD).await.unwrap();
        assert_eq!(stored, Some("5".to_string()));
    }

    #[tokio::test]
    async fn test_get_setting_or_prefers_stored_value() {
        let pool = setup_test_db().await;

        set_setting(&pool, SETTING_K_FACTOR, "16.5").await.unwrap();
        let k: f64 = get_setting_or(&pool, SETTING_K_FACTOR, DEFAULT_K_FACTOR).await.unwrap();
        assert_eq!(k, 16.5);
    }

    #[tokio::test]
    async fn test_get_setting_or_rejects_corrupt_value() {
        let pool = setup_test_db().await;

        set_setting(&pool, SETTING_K_FACTOR, "not-a-number").await.unwrap();
        let result: Result<f64> = get_setting_or(&pool, SETTING_K_FACTOR, DEFAULT_K_FACTOR).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing() {
        let pool = setup_test_db().await;

        set_setting(&pool, SETTING_PROPAGATION_THRESHOLD, "5").await.unwrap();
        set_setting(&pool, SETTING_PROPAGATION_THRESHOLD, "8").await.unwrap();

        let value = get_setting(&pool, SETTING_PROPAGATION_THRESHOLD).await.unwrap();
        assert_eq!(value, Some("8".to_string()));
    }
}
