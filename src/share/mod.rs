/// Share link lifecycle and access control
///
/// A share link is a published, revocable pointer to one pinory, reachable
/// through an unguessable slug. Revoking keeps the row (and the slug) for
/// history; hard deleting removes it and frees the slug.

pub mod access;
mod manager;
pub mod slug;

pub use manager::ShareManager;

use crate::{
    db,
    error::{PinoryError, PinoryResult},
    share::access::{AccessDecision, DenyReason, ViewType},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Visibility tier of a share link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Friends,
    /// Distinct tier in the product; currently gated by the same binary
    /// friendship check as Friends
    SelectedFriends,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Friends => "friends",
            Visibility::SelectedFriends => "selected_friends",
            Visibility::Public => "public",
        }
    }

    /// Parse a stored or requested tier; callers decide how to handle None
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Visibility::Private),
            "friends" => Some(Visibility::Friends),
            "selected_friends" => Some(Visibility::SelectedFriends),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }

    /// Requested tier from client input, falling back to Friends when the
    /// field is absent or unparseable
    pub fn from_request(value: Option<&str>) -> Self {
        value.and_then(Visibility::parse).unwrap_or(Visibility::Friends)
    }

    /// Whether this tier needs a friendship lookup to evaluate
    pub fn requires_friendship(&self) -> bool {
        matches!(self, Visibility::Friends | Visibility::SelectedFriends)
    }
}

/// A share link row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub pinory_id: String,
    pub share_slug: String,
    pub visibility: Visibility,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub view_count: i64,
}

impl ShareLink {
    /// Whether the link's expiry horizon has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at < now).unwrap_or(false)
    }

    pub(crate) fn from_row(row: &sqlx::sqlite::SqliteRow) -> PinoryResult<Self> {
        let visibility: String = row.get("visibility");
        let created_at: String = row.get("created_at");
        let expires_at: Option<String> = row.get("expires_at");
        let revoked_at: Option<String> = row.get("revoked_at");

        Ok(ShareLink {
            id: row.get("id"),
            pinory_id: row.get("pinory_id"),
            share_slug: row.get("share_slug"),
            visibility: Visibility::parse(&visibility).ok_or_else(|| {
                PinoryError::Internal(format!("Unknown visibility: {}", visibility))
            })?,
            is_active: row.get("is_active"),
            created_by: row.get("created_by"),
            created_at: db::parse_timestamp(&created_at)?,
            expires_at: expires_at.as_deref().map(db::parse_timestamp).transpose()?,
            revoked_at: revoked_at.as_deref().map(db::parse_timestamp).transpose()?,
            view_count: row.get("view_count"),
        })
    }
}

/// Share creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest {
    pub pinory_id: String,
    pub visibility: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Share creation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareResponse {
    pub slug: String,
    pub share_url: String,
    pub visibility: Visibility,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Public share metadata returned to a permitted viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInfo {
    pub slug: String,
    pub visibility: Visibility,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: i64,
}

impl ShareInfo {
    pub fn from_link(link: &ShareLink) -> Self {
        Self {
            slug: link.share_slug.clone(),
            visibility: link.visibility,
            owner_id: link.created_by.clone(),
            created_at: link.created_at,
            expires_at: link.expires_at,
            view_count: link.view_count,
        }
    }
}

/// Outcome of resolving a slug for a viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveShareResponse {
    pub can_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_type: Option<ViewType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<crate::pinory::Pinory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_info: Option<ShareInfo>,
}

impl ResolveShareResponse {
    pub fn denied(reason: DenyReason) -> Self {
        Self {
            can_view: false,
            view_type: None,
            reason: Some(reason),
            content: None,
            share_info: None,
        }
    }

    pub fn from_decision(
        decision: AccessDecision,
        content: crate::pinory::Pinory,
        share_info: ShareInfo,
    ) -> Self {
        if decision.can_view {
            Self {
                can_view: true,
                view_type: decision.view_type,
                reason: None,
                content: Some(content),
                share_info: Some(share_info),
            }
        } else {
            Self::denied(decision.reason.unwrap_or(DenyReason::Private))
        }
    }
}

/// Revocation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeShareResponse {
    pub share_slug: String,
    pub is_active: bool,
    pub revoked_at: DateTime<Utc>,
}
