/// Friendship relationship management
///
/// A friendship is a single row between two distinct user ids, whichever
/// side initiated it. Status moves pending -> accepted via the addressee's
/// accept, or the row is deleted by reject/unfriend. Blocked rows are
/// absorbing and stop new requests between the pair.

mod manager;

pub use manager::FriendshipManager;

use crate::error::{PinoryError, PinoryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a friendship row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> PinoryResult<Self> {
        match value {
            "pending" => Ok(FriendshipStatus::Pending),
            "accepted" => Ok(FriendshipStatus::Accepted),
            "blocked" => Ok(FriendshipStatus::Blocked),
            other => Err(PinoryError::Internal(format!(
                "Unknown friendship status: {}",
                other
            ))),
        }
    }
}

/// A friendship row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: FriendshipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Whether the given user is one of the two parties
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }
}

/// Friend request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestInput {
    pub target_user_id: String,
}

/// Friend list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendListResponse {
    pub friends: Vec<String>,
}

/// Friendship status response ("none" when no row exists)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipStatusResponse {
    pub status: String,
}
