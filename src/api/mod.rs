/// API routes and handlers
pub mod friends;
pub mod middleware;
pub mod pinories;
pub mod shares;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(shares::routes())
        .merge(friends::routes())
        .merge(pinories::routes())
}
