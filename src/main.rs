/// Pinory share server
///
/// Publishes saved places ("pinories") to people outside the app through
/// unguessable share links, gated by visibility tiers and a bidirectional
/// friendship graph.

mod api;
mod auth;
mod config;
mod context;
mod db;
mod error;
mod friendship;
mod metrics;
mod pinory;
mod server;
mod share;

use config::ServerConfig;
use context::AppContext;
use error::PinoryResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> PinoryResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinory_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
