/// Share link endpoints
use crate::{
    api::middleware,
    auth::{AuthContext, OptionalAuthContext},
    context::AppContext,
    error::PinoryResult,
    share::{CreateShareRequest, CreateShareResponse, ResolveShareResponse, RevokeShareResponse},
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;

/// Build share routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/shares", post(create_share))
        .route("/api/shares/:slug", get(resolve_share))
        .route("/api/shares/:slug", delete(delete_share))
        .route("/api/shares/:slug/revoke", post(revoke_share))
        // The path share URLs are composed with
        .route("/s/:slug", get(resolve_share))
}

/// Create a share link for a pinory
async fn create_share(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    headers: HeaderMap,
    Json(req): Json<CreateShareRequest>,
) -> PinoryResult<Json<CreateShareResponse>> {
    tracing::debug!(
        "create_share: pinory {} by {}",
        req.pinory_id,
        auth.user_id
    );

    let link = ctx.shares.create(&auth.user_id, &req).await?;

    let origin = middleware::share_origin(&headers, &ctx.fallback_origin());
    let share_url = format!("{}/s/{}", origin, link.share_slug);

    Ok(Json(CreateShareResponse {
        slug: link.share_slug,
        share_url,
        visibility: link.visibility,
        expires_at: link.expires_at,
        view_count: link.view_count,
        is_active: link.is_active,
        created_at: link.created_at,
    }))
}

/// Resolve a share link for the current viewer (possibly anonymous)
async fn resolve_share(
    State(ctx): State<AppContext>,
    auth: OptionalAuthContext,
    Path(slug): Path<String>,
) -> PinoryResult<Json<ResolveShareResponse>> {
    let outcome = ctx.shares.resolve(&slug, auth.user_id.as_deref()).await?;

    Ok(Json(outcome))
}

/// Revoke a share link (soft delete, owner only)
async fn revoke_share(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(slug): Path<String>,
) -> PinoryResult<Json<RevokeShareResponse>> {
    let outcome = ctx.shares.revoke(&slug, &auth.user_id).await?;

    Ok(Json(outcome))
}

/// Hard-delete a share link (owner only, frees the slug)
async fn delete_share(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(slug): Path<String>,
) -> PinoryResult<Json<serde_json::Value>> {
    ctx.shares.hard_delete(&slug, &auth.user_id).await?;

    Ok(Json(json!({ "deleted": true })))
}
