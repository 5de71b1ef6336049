/// Database layer for the Pinory share server
///
/// Manages the SQLite connection pool and the schema for friendships,
/// pinories, and share links.

use crate::error::{PinoryError, PinoryResult};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> PinoryResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await
        .map_err(PinoryError::Database)?;

    Ok(pool)
}

/// Create a single-connection in-memory pool, used by tests
pub async fn create_memory_pool() -> PinoryResult<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .map_err(PinoryError::Database)?;

    Ok(pool)
}

/// Initialize the schema
///
/// Statements are idempotent so the same initializer runs at startup and
/// against in-memory test databases.
pub async fn init_schema(pool: &SqlitePool) -> PinoryResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS friendship (
            id TEXT PRIMARY KEY,
            requester_id TEXT NOT NULL,
            addressee_id TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (requester_id <> addressee_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One row per unordered pair, whichever side initiated
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS friendship_pair_idx
        ON friendship (min(requester_id, addressee_id), max(requester_id, addressee_id))
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pinory (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            default_visibility TEXT NOT NULL DEFAULT 'friends',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS share_link (
            id TEXT PRIMARY KEY,
            pinory_id TEXT NOT NULL,
            share_slug TEXT NOT NULL UNIQUE,
            visibility TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            revoked_at TEXT,
            view_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Partial unique index: at most one active link per (pinory, owner),
    // so a concurrent duplicate create fails at the storage layer
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS share_link_active_idx
        ON share_link (pinory_id, created_by) WHERE is_active = 1
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> PinoryResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(PinoryError::Database)?;

    Ok(())
}

/// Parse an RFC 3339 timestamp stored as TEXT
pub fn parse_timestamp(value: &str) -> PinoryResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PinoryError::Internal(format!("Invalid timestamp: {}", e)))
}
