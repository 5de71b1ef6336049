/// Pinory store
///
/// The owned content being shared: a saved place with notes and photos.
/// This server reads only the id and owner; the store is the minimal
/// surface the share subsystem needs (the full content experience lives
/// in the client app).

use crate::{db, error::PinoryResult, share::Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A pinory row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pinory {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub default_visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Pinory creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinoryRequest {
    pub title: String,
    pub default_visibility: Option<String>,
}

/// Pinory store service
#[derive(Clone)]
pub struct PinoryStore {
    db: SqlitePool,
}

impl PinoryStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a pinory owned by the given user
    pub async fn create(
        &self,
        owner_id: &str,
        title: &str,
        default_visibility: Option<&str>,
    ) -> PinoryResult<Pinory> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let visibility = Visibility::from_request(default_visibility);

        sqlx::query(
            r#"
            INSERT INTO pinory (id, owner_id, title, default_visibility, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(title)
        .bind(visibility.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::debug!("Pinory created: {} (owner {})", id, owner_id);

        Ok(Pinory {
            id,
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            default_visibility: visibility,
            created_at: now,
        })
    }

    /// Get a pinory by id
    pub async fn get(&self, pinory_id: &str) -> PinoryResult<Option<Pinory>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, default_visibility, created_at
            FROM pinory
            WHERE id = ?
            "#,
        )
        .bind(pinory_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = row {
            let visibility: String = row.get("default_visibility");
            let created_at: String = row.get("created_at");

            Ok(Some(Pinory {
                id: row.get("id"),
                owner_id: row.get("owner_id"),
                title: row.get("title"),
                default_visibility: Visibility::from_request(Some(visibility.as_str())),
                created_at: db::parse_timestamp(&created_at)?,
            }))
        } else {
            Ok(None)
        }
    }
}
