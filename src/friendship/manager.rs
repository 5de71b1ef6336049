/// Friendship state machine over the friendship table
use crate::{
    db,
    error::{PinoryError, PinoryResult},
    friendship::{Friendship, FriendshipStatus},
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Friendship manager service
#[derive(Clone)]
pub struct FriendshipManager {
    db: SqlitePool,
}

impl FriendshipManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Send a friend request
    ///
    /// Creates a pending row unless the pair already has one: accepted rows
    /// conflict as AlreadyFriends, pending rows as RequestAlreadySent, and
    /// blocked rows refuse the request outright.
    pub async fn request(&self, requester_id: &str, addressee_id: &str) -> PinoryResult<Friendship> {
        if requester_id == addressee_id {
            return Err(PinoryError::SelfRequest);
        }

        if let Some(existing) = self.find_between(requester_id, addressee_id).await? {
            return Err(match existing.status {
                FriendshipStatus::Accepted => {
                    PinoryError::Conflict("Already friends".to_string())
                }
                FriendshipStatus::Pending => {
                    PinoryError::Conflict("Friend request already sent".to_string())
                }
                FriendshipStatus::Blocked => {
                    PinoryError::Authorization("Cannot send friend request".to_string())
                }
            });
        }

        let friendship = self
            .insert(requester_id, addressee_id, FriendshipStatus::Pending)
            .await?;

        tracing::info!(
            "Friend request created: {} -> {}",
            requester_id,
            addressee_id
        );
        crate::metrics::FRIEND_REQUESTS_TOTAL.inc();

        Ok(friendship)
    }

    /// Look up the status between two users, in either direction
    pub async fn lookup_status(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> PinoryResult<Option<FriendshipStatus>> {
        Ok(self
            .find_between(user_a, user_b)
            .await?
            .map(|friendship| friendship.status))
    }

    /// Accept a pending friend request
    ///
    /// Only the addressee of a pending row may accept it.
    pub async fn accept(&self, friendship_id: &str, acting_user_id: &str) -> PinoryResult<Friendship> {
        let friendship = self
            .get(friendship_id)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Friendship not found".to_string()))?;

        if friendship.addressee_id != acting_user_id {
            return Err(PinoryError::Authorization(
                "Only the addressee can accept a friend request".to_string(),
            ));
        }

        if friendship.status != FriendshipStatus::Pending {
            return Err(PinoryError::Conflict(
                "Friend request is not pending".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE friendship SET status = ?, updated_at = ? WHERE id = ?")
            .bind(FriendshipStatus::Accepted.as_str())
            .bind(now.to_rfc3339())
            .bind(friendship_id)
            .execute(&self.db)
            .await?;

        tracing::info!(
            "Friend request accepted: {} <-> {}",
            friendship.requester_id,
            friendship.addressee_id
        );

        Ok(Friendship {
            status: FriendshipStatus::Accepted,
            updated_at: now,
            ..friendship
        })
    }

    /// Remove a friendship row
    ///
    /// Works for pending (reject) and accepted (unfriend); either party
    /// may remove.
    pub async fn remove(&self, friendship_id: &str, acting_user_id: &str) -> PinoryResult<()> {
        let friendship = self
            .get(friendship_id)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Friendship not found".to_string()))?;

        if !friendship.involves(acting_user_id) {
            return Err(PinoryError::Authorization(
                "Not a party to this friendship".to_string(),
            ));
        }

        sqlx::query("DELETE FROM friendship WHERE id = ?")
            .bind(friendship_id)
            .execute(&self.db)
            .await?;

        tracing::info!("Friendship removed: {}", friendship_id);

        Ok(())
    }

    /// Block a user
    ///
    /// Replaces any existing row for the pair with a blocked one whose
    /// requester is the blocker. Blocked rows stop future requests.
    pub async fn block(&self, blocker_id: &str, target_id: &str) -> PinoryResult<Friendship> {
        if blocker_id == target_id {
            return Err(PinoryError::SelfRequest);
        }

        if let Some(existing) = self.find_between(blocker_id, target_id).await? {
            sqlx::query("DELETE FROM friendship WHERE id = ?")
                .bind(&existing.id)
                .execute(&self.db)
                .await?;
        }

        let friendship = self
            .insert(blocker_id, target_id, FriendshipStatus::Blocked)
            .await?;

        tracing::info!("User blocked: {} -> {}", blocker_id, target_id);

        Ok(friendship)
    }

    /// List accepted friends of a user, from either side of the row
    pub async fn list_friends(&self, user_id: &str) -> PinoryResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT requester_id, addressee_id
            FROM friendship
            WHERE status = 'accepted' AND (requester_id = ? OR addressee_id = ?)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let requester: String = row.get("requester_id");
                if requester == user_id {
                    row.get("addressee_id")
                } else {
                    requester
                }
            })
            .collect())
    }

    /// Get a friendship row by id
    pub async fn get(&self, friendship_id: &str) -> PinoryResult<Option<Friendship>> {
        let row = sqlx::query(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendship
            WHERE id = ?
            "#,
        )
        .bind(friendship_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Self::row_to_friendship).transpose()
    }

    /// Find the row between two users, checking both orderings
    async fn find_between(&self, user_a: &str, user_b: &str) -> PinoryResult<Option<Friendship>> {
        let row = sqlx::query(
            r#"
            SELECT id, requester_id, addressee_id, status, created_at, updated_at
            FROM friendship
            WHERE (requester_id = ?1 AND addressee_id = ?2)
               OR (requester_id = ?2 AND addressee_id = ?1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.db)
        .await?;

        row.map(Self::row_to_friendship).transpose()
    }

    async fn insert(
        &self,
        requester_id: &str,
        addressee_id: &str,
        status: FriendshipStatus,
    ) -> PinoryResult<Friendship> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO friendship (id, requester_id, addressee_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(requester_id)
        .bind(addressee_id)
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Friendship {
            id,
            requester_id: requester_id.to_string(),
            addressee_id: addressee_id.to_string(),
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn row_to_friendship(row: sqlx::sqlite::SqliteRow) -> PinoryResult<Friendship> {
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Friendship {
            id: row.get("id"),
            requester_id: row.get("requester_id"),
            addressee_id: row.get("addressee_id"),
            status: FriendshipStatus::parse(&status)?,
            created_at: db::parse_timestamp(&created_at)?,
            updated_at: db::parse_timestamp(&updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn setup() -> FriendshipManager {
        let pool = db::create_memory_pool().await.unwrap();
        db::init_schema(&pool).await.unwrap();
        FriendshipManager::new(pool)
    }

    #[tokio::test]
    async fn test_request_creates_pending() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        assert_eq!(friendship.status, FriendshipStatus::Pending);
        assert_eq!(friendship.requester_id, "alice");
        assert_eq!(friendship.addressee_id, "bob");
    }

    #[tokio::test]
    async fn test_self_request_fails() {
        let manager = setup().await;

        let err = manager.request("alice", "alice").await.unwrap_err();
        assert!(matches!(err, PinoryError::SelfRequest));
    }

    #[tokio::test]
    async fn test_duplicate_request_fails() {
        let manager = setup().await;

        manager.request("alice", "bob").await.unwrap();
        let err = manager.request("alice", "bob").await.unwrap_err();
        assert!(matches!(err, PinoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reverse_request_while_pending_fails() {
        let manager = setup().await;

        manager.request("alice", "bob").await.unwrap();
        let err = manager.request("bob", "alice").await.unwrap_err();
        assert!(matches!(err, PinoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_request_after_accept_fails_as_already_friends() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        manager.accept(&friendship.id, "bob").await.unwrap();

        let err = manager.request("alice", "bob").await.unwrap_err();
        assert!(matches!(err, PinoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_lookup_status_is_symmetric() {
        let manager = setup().await;

        manager.request("alice", "bob").await.unwrap();

        let ab = manager.lookup_status("alice", "bob").await.unwrap();
        let ba = manager.lookup_status("bob", "alice").await.unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab, Some(FriendshipStatus::Pending));
    }

    #[tokio::test]
    async fn test_lookup_status_none_when_absent() {
        let manager = setup().await;

        let status = manager.lookup_status("alice", "bob").await.unwrap();
        assert_eq!(status, None);
    }

    #[tokio::test]
    async fn test_accept_by_addressee() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        let accepted = manager.accept(&friendship.id, "bob").await.unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);

        let status = manager.lookup_status("bob", "alice").await.unwrap();
        assert_eq!(status, Some(FriendshipStatus::Accepted));
    }

    #[tokio::test]
    async fn test_accept_by_requester_fails() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        let err = manager.accept(&friendship.id, "alice").await.unwrap_err();
        assert!(matches!(err, PinoryError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_accept_missing_friendship_fails() {
        let manager = setup().await;

        let err = manager.accept("no-such-id", "bob").await.unwrap_err();
        assert!(matches!(err, PinoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_by_either_party() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        manager.remove(&friendship.id, "alice").await.unwrap();
        assert_eq!(manager.lookup_status("alice", "bob").await.unwrap(), None);

        let friendship = manager.request("alice", "bob").await.unwrap();
        manager.remove(&friendship.id, "bob").await.unwrap();
        assert_eq!(manager.lookup_status("alice", "bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_by_outsider_fails() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        let err = manager.remove(&friendship.id, "mallory").await.unwrap_err();
        assert!(matches!(err, PinoryError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_friendship_fails() {
        let manager = setup().await;

        let err = manager.remove("no-such-id", "alice").await.unwrap_err();
        assert!(matches!(err, PinoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_request_to_blocker_is_forbidden() {
        let manager = setup().await;

        manager.block("bob", "alice").await.unwrap();

        let err = manager.request("alice", "bob").await.unwrap_err();
        assert!(matches!(err, PinoryError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_block_replaces_existing_friendship() {
        let manager = setup().await;

        let friendship = manager.request("alice", "bob").await.unwrap();
        manager.accept(&friendship.id, "bob").await.unwrap();

        let blocked = manager.block("bob", "alice").await.unwrap();
        assert_eq!(blocked.status, FriendshipStatus::Blocked);
        assert_eq!(blocked.requester_id, "bob");

        let status = manager.lookup_status("alice", "bob").await.unwrap();
        assert_eq!(status, Some(FriendshipStatus::Blocked));
    }

    #[tokio::test]
    async fn test_list_friends_covers_both_directions() {
        let manager = setup().await;

        let f1 = manager.request("alice", "bob").await.unwrap();
        manager.accept(&f1.id, "bob").await.unwrap();
        let f2 = manager.request("carol", "alice").await.unwrap();
        manager.accept(&f2.id, "alice").await.unwrap();
        // Pending rows are not friends
        manager.request("alice", "dave").await.unwrap();

        let mut friends = manager.list_friends("alice").await.unwrap();
        friends.sort();
        assert_eq!(friends, vec!["bob".to_string(), "carol".to_string()]);
    }
}
