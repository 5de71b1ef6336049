/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    db,
    error::PinoryResult,
    friendship::FriendshipManager,
    pinory::PinoryStore,
    share::ShareManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub pinories: Arc<PinoryStore>,
    pub friendships: Arc<FriendshipManager>,
    pub shares: Arc<ShareManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> PinoryResult<Self> {
        config.validate()?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::init_schema(&pool).await?;
        db::test_connection(&pool).await?;

        Ok(Self::with_pool(config, pool))
    }

    /// Wire managers over an existing pool; tests hand in an in-memory one
    pub fn with_pool(config: ServerConfig, pool: SqlitePool) -> Self {
        let pinories = Arc::new(PinoryStore::new(pool.clone()));
        let friendships = Arc::new(FriendshipManager::new(pool.clone()));
        let shares = Arc::new(ShareManager::new(
            pool.clone(),
            pinories.clone(),
            friendships.clone(),
            config.share.default_ttl_days,
        ));

        Self {
            config: Arc::new(config),
            db: pool,
            pinories,
            friendships,
            shares,
        }
    }

    /// Origin used when composing share URLs without a usable Host header
    pub fn fallback_origin(&self) -> String {
        self.config
            .service
            .public_url
            .clone()
            .unwrap_or_else(|| {
                format!(
                    "http://{}:{}",
                    self.config.service.hostname, self.config.service.port
                )
            })
    }
}
