/// Pinory endpoints
///
/// Minimal create/get surface so shares have content to point at; the
/// full pinory experience (notes, photos, map) belongs to the client app.
use crate::{
    auth::AuthContext,
    context::AppContext,
    error::{PinoryError, PinoryResult},
    pinory::{CreatePinoryRequest, Pinory},
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

/// Build pinory routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/pinories", post(create_pinory))
        .route("/api/pinories/:id", get(get_pinory))
}

/// Create a pinory owned by the caller
async fn create_pinory(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(req): Json<CreatePinoryRequest>,
) -> PinoryResult<Json<Pinory>> {
    if req.title.trim().is_empty() {
        return Err(PinoryError::Validation("Title cannot be empty".to_string()));
    }

    let pinory = ctx
        .pinories
        .create(
            &auth.user_id,
            req.title.trim(),
            req.default_visibility.as_deref(),
        )
        .await?;

    Ok(Json(pinory))
}

/// Get one of the caller's pinories
async fn get_pinory(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> PinoryResult<Json<Pinory>> {
    let pinory = ctx
        .pinories
        .get(&id)
        .await?
        .ok_or_else(|| PinoryError::NotFound("Pinory not found".to_string()))?;

    if pinory.owner_id != auth.user_id {
        return Err(PinoryError::Authorization(
            "Not the owner of this pinory".to_string(),
        ));
    }

    Ok(Json(pinory))
}
