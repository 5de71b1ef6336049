/// Friendship endpoints
use crate::{
    auth::AuthContext,
    context::AppContext,
    error::PinoryResult,
    friendship::{
        FriendListResponse, FriendRequestInput, Friendship, FriendshipStatusResponse,
    },
};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

/// Build friendship routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/friends", get(list_friends))
        .route("/api/friends/requests", post(send_request))
        .route("/api/friends/requests/:id/accept", post(accept_request))
        .route("/api/friends/block", post(block_user))
        .route("/api/friends/status/:user_id", get(friendship_status))
        .route("/api/friends/:id", delete(remove_friendship))
}

/// Send a friend request to another user
async fn send_request(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<FriendRequestInput>,
) -> PinoryResult<Json<Friendship>> {
    let friendship = ctx
        .friendships
        .request(&auth.user_id, &req.target_user_id)
        .await?;

    Ok(Json(friendship))
}

/// Accept a pending friend request (addressee only)
async fn accept_request(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> PinoryResult<Json<Friendship>> {
    let friendship = ctx.friendships.accept(&id, &auth.user_id).await?;

    Ok(Json(friendship))
}

/// Remove a friendship: reject while pending, unfriend once accepted
async fn remove_friendship(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> PinoryResult<Json<serde_json::Value>> {
    ctx.friendships.remove(&id, &auth.user_id).await?;

    Ok(Json(json!({ "removed": true })))
}

/// Block a user, preventing future requests between the pair
async fn block_user(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<FriendRequestInput>,
) -> PinoryResult<Json<Friendship>> {
    let friendship = ctx
        .friendships
        .block(&auth.user_id, &req.target_user_id)
        .await?;

    Ok(Json(friendship))
}

/// List accepted friends of the caller
async fn list_friends(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> PinoryResult<Json<FriendListResponse>> {
    let friends = ctx.friendships.list_friends(&auth.user_id).await?;

    Ok(Json(FriendListResponse { friends }))
}

/// Status between the caller and another user
async fn friendship_status(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> PinoryResult<Json<FriendshipStatusResponse>> {
    let status = ctx.friendships.lookup_status(&auth.user_id, &user_id).await?;

    Ok(Json(FriendshipStatusResponse {
        status: status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "none".to_string()),
    }))
}
