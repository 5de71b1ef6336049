/// Access decision engine
///
/// A pure function from the share's visibility tier, the viewer's identity,
/// and the pair's friendship status to a view decision. No I/O, no clock:
/// the caller computes expiry and checks revocation (an inactive link is
/// denied before this function ever runs, owner included).
use crate::{friendship::FriendshipStatus, share::Visibility};
use serde::{Deserialize, Serialize};

/// How a permitted viewer relates to the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    Owner,
    Friend,
    Public,
}

/// Why a viewer was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    Revoked,
    Expired,
    Private,
    SignInRequired,
    NotFriends,
}

/// The decision for one (viewer, link) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub can_view: bool,
    pub view_type: Option<ViewType>,
    pub reason: Option<DenyReason>,
}

impl AccessDecision {
    fn allow(view_type: ViewType) -> Self {
        Self {
            can_view: true,
            view_type: Some(view_type),
            reason: None,
        }
    }

    fn deny(reason: DenyReason) -> Self {
        Self {
            can_view: false,
            view_type: None,
            reason: Some(reason),
        }
    }
}

/// Decide whether a viewer may see shared content
///
/// First match wins: expiry, then ownership, then the visibility tier.
pub fn decide(
    visibility: Visibility,
    viewer_id: Option<&str>,
    owner_id: &str,
    friendship_status: Option<FriendshipStatus>,
    is_expired: bool,
) -> AccessDecision {
    if is_expired {
        return AccessDecision::deny(DenyReason::Expired);
    }

    if viewer_id == Some(owner_id) {
        return AccessDecision::allow(ViewType::Owner);
    }

    match visibility {
        Visibility::Public => AccessDecision::allow(ViewType::Public),
        Visibility::Private => AccessDecision::deny(DenyReason::Private),
        Visibility::Friends => decide_friend_gate(viewer_id, friendship_status),
        // Not yet narrowed to a chosen subset; same gate as Friends for now
        Visibility::SelectedFriends => decide_friend_gate(viewer_id, friendship_status),
    }
}

fn decide_friend_gate(
    viewer_id: Option<&str>,
    friendship_status: Option<FriendshipStatus>,
) -> AccessDecision {
    if viewer_id.is_none() {
        return AccessDecision::deny(DenyReason::SignInRequired);
    }

    match friendship_status {
        Some(FriendshipStatus::Accepted) => AccessDecision::allow(ViewType::Friend),
        _ => AccessDecision::deny(DenyReason::NotFriends),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "owner";

    /// The viewers the decision table is evaluated against
    fn viewers() -> Vec<(Option<&'static str>, Option<FriendshipStatus>)> {
        vec![
            (Some(OWNER), None),                               // owner
            (None, None),                                      // anonymous
            (Some("friend"), Some(FriendshipStatus::Accepted)), // accepted friend
            (Some("stranger"), None),                          // non-friend
        ]
    }

    #[test]
    fn test_expired_denies_everyone() {
        for tier in [
            Visibility::Private,
            Visibility::Friends,
            Visibility::SelectedFriends,
            Visibility::Public,
        ] {
            for (viewer, friendship) in viewers() {
                let decision = decide(tier, viewer, OWNER, friendship, true);
                assert!(!decision.can_view);
                assert_eq!(decision.reason, Some(DenyReason::Expired));
            }
        }
    }

    #[test]
    fn test_owner_sees_every_unexpired_tier() {
        for tier in [
            Visibility::Private,
            Visibility::Friends,
            Visibility::SelectedFriends,
            Visibility::Public,
        ] {
            let decision = decide(tier, Some(OWNER), OWNER, None, false);
            assert!(decision.can_view);
            assert_eq!(decision.view_type, Some(ViewType::Owner));
        }
    }

    #[test]
    fn test_public_tier() {
        let decision = decide(Visibility::Public, None, OWNER, None, false);
        assert!(decision.can_view);
        assert_eq!(decision.view_type, Some(ViewType::Public));

        let decision = decide(Visibility::Public, Some("stranger"), OWNER, None, false);
        assert_eq!(decision.view_type, Some(ViewType::Public));
    }

    #[test]
    fn test_private_tier_denies_non_owners() {
        for (viewer, friendship) in viewers() {
            if viewer == Some(OWNER) {
                continue;
            }
            let decision = decide(Visibility::Private, viewer, OWNER, friendship, false);
            assert!(!decision.can_view);
            assert_eq!(decision.reason, Some(DenyReason::Private));
        }
    }

    #[test]
    fn test_friend_tiers_gate_on_accepted_friendship() {
        for tier in [Visibility::Friends, Visibility::SelectedFriends] {
            // Anonymous viewers are asked to sign in
            let decision = decide(tier, None, OWNER, None, false);
            assert_eq!(decision.reason, Some(DenyReason::SignInRequired));

            // Accepted friends may view
            let decision = decide(
                tier,
                Some("friend"),
                OWNER,
                Some(FriendshipStatus::Accepted),
                false,
            );
            assert!(decision.can_view);
            assert_eq!(decision.view_type, Some(ViewType::Friend));

            // Everyone else may not
            for friendship in [
                None,
                Some(FriendshipStatus::Pending),
                Some(FriendshipStatus::Blocked),
            ] {
                let decision = decide(tier, Some("stranger"), OWNER, friendship, false);
                assert!(!decision.can_view);
                assert_eq!(decision.reason, Some(DenyReason::NotFriends));
            }
        }
    }

    #[test]
    fn test_expiry_outranks_ownership() {
        let decision = decide(Visibility::Public, Some(OWNER), OWNER, None, true);
        assert!(!decision.can_view);
        assert_eq!(decision.reason, Some(DenyReason::Expired));
    }
}
