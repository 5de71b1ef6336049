/// Share link lifecycle: create, fetch, resolve, revoke, hard delete
use crate::{
    error::{PinoryError, PinoryResult},
    friendship::FriendshipManager,
    metrics,
    pinory::{Pinory, PinoryStore},
    share::{
        access, slug, CreateShareRequest, ResolveShareResponse, RevokeShareResponse, ShareInfo,
        ShareLink, Visibility,
    },
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// Share lifecycle manager service
#[derive(Clone)]
pub struct ShareManager {
    db: SqlitePool,
    pinories: Arc<PinoryStore>,
    friendships: Arc<FriendshipManager>,
    default_ttl_days: i64,
}

impl ShareManager {
    pub fn new(
        db: SqlitePool,
        pinories: Arc<PinoryStore>,
        friendships: Arc<FriendshipManager>,
        default_ttl_days: i64,
    ) -> Self {
        Self {
            db,
            pinories,
            friendships,
            default_ttl_days,
        }
    }

    /// Create a share link for a pinory
    ///
    /// Idempotent per (pinory, owner): when an active link already exists it
    /// is returned unchanged instead of minting a second slug.
    pub async fn create(
        &self,
        owner_id: &str,
        request: &CreateShareRequest,
    ) -> PinoryResult<ShareLink> {
        let pinory = self
            .pinories
            .get(&request.pinory_id)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Pinory not found".to_string()))?;

        if pinory.owner_id != owner_id {
            return Err(PinoryError::Authorization(
                "Only the owner can share this pinory".to_string(),
            ));
        }

        let visibility = Visibility::from_request(request.visibility.as_deref());

        if let Some(existing) = self.active_link_for(&request.pinory_id, owner_id).await? {
            tracing::debug!(
                "Share create reused active link {} for pinory {}",
                existing.share_slug,
                request.pinory_id
            );
            return Ok(existing);
        }

        let share_slug = self.allocate_slug().await?;
        let now = Utc::now();
        let expires_at = request
            .expires_at
            .unwrap_or_else(|| now + Duration::days(self.default_ttl_days));
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO share_link
                (id, pinory_id, share_slug, visibility, is_active, created_by,
                 created_at, expires_at, revoked_at, view_count)
            VALUES (?, ?, ?, ?, 1, ?, ?, ?, NULL, 0)
            "#,
        )
        .bind(&id)
        .bind(&request.pinory_id)
        .bind(&share_slug)
        .bind(visibility.as_str())
        .bind(owner_id)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!(
            "Share link created: {} for pinory {} ({})",
            share_slug,
            request.pinory_id,
            visibility.as_str()
        );
        metrics::SHARES_CREATED_TOTAL.inc();

        Ok(ShareLink {
            id,
            pinory_id: request.pinory_id.clone(),
            share_slug,
            visibility,
            is_active: true,
            created_by: owner_id.to_string(),
            created_at: now,
            expires_at: Some(expires_at),
            revoked_at: None,
            view_count: 0,
        })
    }

    /// Fetch a link and its pinory snapshot by slug
    ///
    /// Enforces no visibility; resolve() is the policy-aware entry point.
    pub async fn fetch_by_slug(&self, share_slug: &str) -> PinoryResult<(ShareLink, Pinory)> {
        if !slug::is_valid_format(share_slug) {
            return Err(PinoryError::Validation("Malformed share slug".to_string()));
        }

        let link = self
            .get_by_slug(share_slug)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Share not found".to_string()))?;

        let pinory = self
            .pinories
            .get(&link.pinory_id)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Pinory not found".to_string()))?;

        Ok((link, pinory))
    }

    /// Resolve a slug for a viewer and produce the access decision
    ///
    /// Revocation short-circuits before the decision engine runs, so a
    /// revoked link stays dark for everyone, the owner included. Qualifying
    /// non-owner views are counted.
    pub async fn resolve(
        &self,
        share_slug: &str,
        viewer_id: Option<&str>,
    ) -> PinoryResult<ResolveShareResponse> {
        let (mut link, pinory) = self.fetch_by_slug(share_slug).await?;

        if !link.is_active {
            metrics::record_denial("revoked");
            return Ok(ResolveShareResponse::denied(access::DenyReason::Revoked));
        }

        let is_expired = link.is_expired(Utc::now());
        let is_owner = viewer_id == Some(link.created_by.as_str());

        // Friendship status only matters for the friend-gated tiers, and
        // never for the owner or an anonymous viewer
        let friendship_status = match viewer_id {
            Some(viewer) if link.visibility.requires_friendship() && !is_owner => {
                self.friendships.lookup_status(viewer, &link.created_by).await?
            }
            _ => None,
        };

        let decision = access::decide(
            link.visibility,
            viewer_id,
            &link.created_by,
            friendship_status,
            is_expired,
        );

        if decision.can_view && !is_owner {
            self.record_view(&link.id).await?;
            link.view_count += 1;
        }

        if let Some(reason) = decision.reason {
            metrics::record_denial(match reason {
                access::DenyReason::Revoked => "revoked",
                access::DenyReason::Expired => "expired",
                access::DenyReason::Private => "private",
                access::DenyReason::SignInRequired => "sign-in-required",
                access::DenyReason::NotFriends => "not-friends",
            });
        }

        Ok(ResolveShareResponse::from_decision(
            decision,
            pinory,
            ShareInfo::from_link(&link),
        ))
    }

    /// Revoke a link (soft delete)
    ///
    /// The row and its slug survive for history; the link is permanently
    /// non-viewable. A repeat revoke succeeds and refreshes revoked_at.
    pub async fn revoke(
        &self,
        share_slug: &str,
        acting_user_id: &str,
    ) -> PinoryResult<RevokeShareResponse> {
        let link = self.require_owned(share_slug, acting_user_id).await?;

        let now = Utc::now();
        sqlx::query("UPDATE share_link SET is_active = 0, revoked_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(&link.id)
            .execute(&self.db)
            .await?;

        tracing::info!("Share link revoked: {}", share_slug);

        Ok(RevokeShareResponse {
            share_slug: link.share_slug,
            is_active: false,
            revoked_at: now,
        })
    }

    /// Hard-delete a link, freeing its slug for reuse
    pub async fn hard_delete(&self, share_slug: &str, acting_user_id: &str) -> PinoryResult<()> {
        let link = self.require_owned(share_slug, acting_user_id).await?;

        sqlx::query("DELETE FROM share_link WHERE id = ?")
            .bind(&link.id)
            .execute(&self.db)
            .await?;

        tracing::info!("Share link deleted: {}", share_slug);

        Ok(())
    }

    /// Count a view
    ///
    /// The increment is atomic at the storage layer; the counter is
    /// informational, so at-least-once is acceptable under races.
    pub async fn record_view(&self, link_id: &str) -> PinoryResult<()> {
        sqlx::query("UPDATE share_link SET view_count = view_count + 1 WHERE id = ?")
            .bind(link_id)
            .execute(&self.db)
            .await?;

        metrics::SHARE_VIEWS_TOTAL.inc();

        Ok(())
    }

    /// Get a link by slug
    pub async fn get_by_slug(&self, share_slug: &str) -> PinoryResult<Option<ShareLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, pinory_id, share_slug, visibility, is_active, created_by,
                   created_at, expires_at, revoked_at, view_count
            FROM share_link
            WHERE share_slug = ?
            "#,
        )
        .bind(share_slug)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(ShareLink::from_row).transpose()
    }

    async fn active_link_for(
        &self,
        pinory_id: &str,
        owner_id: &str,
    ) -> PinoryResult<Option<ShareLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, pinory_id, share_slug, visibility, is_active, created_by,
                   created_at, expires_at, revoked_at, view_count
            FROM share_link
            WHERE pinory_id = ? AND created_by = ? AND is_active = 1
            "#,
        )
        .bind(pinory_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(ShareLink::from_row).transpose()
    }

    /// Bounded-retry slug allocation against the share_link table
    ///
    /// The UNIQUE constraint on share_slug remains the authority for the
    /// window between check and insert.
    async fn allocate_slug(&self) -> PinoryResult<String> {
        for _ in 0..slug::MAX_ATTEMPTS {
            let candidate = slug::generate();
            if !self.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        tracing::warn!("Slug allocation exhausted {} attempts", slug::MAX_ATTEMPTS);
        Err(PinoryError::SlugExhausted)
    }

    async fn slug_exists(&self, share_slug: &str) -> PinoryResult<bool> {
        let row = sqlx::query("SELECT 1 FROM share_link WHERE share_slug = ?")
            .bind(share_slug)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.is_some())
    }

    async fn require_owned(
        &self,
        share_slug: &str,
        acting_user_id: &str,
    ) -> PinoryResult<ShareLink> {
        let link = self
            .get_by_slug(share_slug)
            .await?
            .ok_or_else(|| PinoryError::NotFound("Share not found".to_string()))?;

        // created_by is the content owner at creation time; ownership
        // transfer is not a thing here
        if link.created_by != acting_user_id {
            return Err(PinoryError::Authorization(
                "Only the owner can manage this share".to_string(),
            ));
        }

        Ok(link)
    }
}
