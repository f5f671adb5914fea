//! Tests for database initialization and startup behavior
//!
//! Covers automatic database creation, idempotent re-initialization,
//! schema versioning, and default settings seeding.

use std::path::PathBuf;
use trackelo_common::db::init::init_database;

fn test_db_path(tag: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/trackelo-test-{}-{}.db", tag, std::process::id()))
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let db_path = test_db_path("create");
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());

    assert!(db_path.exists(), "Database file was not created");

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let db_path = test_db_path("existing");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_engine_tables_created() {
    let db_path = test_db_path("tables");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    for table in [
        "ratings",
        "comparison_history",
        "rating_sessions",
        "tracks",
        "playlists",
        "playlist_tracks",
        "settings",
        "schema_version",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "Table '{}' was not created", table);
    }

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let db_path = test_db_path("settings");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let k: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = 'rating_k_factor'")
        .fetch_optional(&pool)
        .await
        .unwrap();
    assert_eq!(k, Some("32".to_string()));

    let threshold: Option<String> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = 'global_propagation_threshold'")
            .fetch_optional(&pool)
            .await
            .unwrap();
    assert_eq!(threshold, Some("5".to_string()));

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_schema_version_recorded() {
    let db_path = test_db_path("version");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let version: i32 =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(version, 1);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_reinit_preserves_data() {
    let db_path = test_db_path("reinit");
    let _ = std::fs::remove_file(&db_path);

    {
        let pool = init_database(&db_path).await.unwrap();
        sqlx::query("INSERT INTO ratings (track_id, scope, value) VALUES (?, 'global', 1520.0)")
            .bind("11111111-1111-1111-1111-111111111111")
            .execute(&pool)
            .await
            .unwrap();
    }

    let pool = init_database(&db_path).await.unwrap();
    let value: f64 = sqlx::query_scalar("SELECT value FROM ratings WHERE scope = 'global'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(value, 1520.0);

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_wal_mode_enabled() {
    let db_path = test_db_path("wal");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    drop(pool);
    let _ = std::fs::remove_file(&db_path);
}
