/// Configuration management for the Pinory share server
use crate::error::{PinoryError, PinoryResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub share: ShareConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public origin used in composed share URLs when the request
    /// carries no usable Host header
    pub public_url: Option<String>,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for bearer tokens minted by the identity provider
    pub jwt_secret: String,
}

/// Share policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Default lifetime of a new share link, in days
    pub default_ttl_days: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PinoryResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("PINORY_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PINORY_PORT")
            .unwrap_or_else(|_| "2820".to_string())
            .parse()
            .map_err(|_| PinoryError::Validation("Invalid port number".to_string()))?;
        let public_url = env::var("PINORY_PUBLIC_URL").ok();
        let version = env::var("PINORY_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("PINORY_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("PINORY_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("pinory.sqlite"));

        let jwt_secret = env::var("PINORY_JWT_SECRET")
            .map_err(|_| PinoryError::Validation("JWT secret required".to_string()))?;

        let default_ttl_days = env::var("PINORY_SHARE_DEFAULT_TTL_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
                version,
            },
            storage: StorageConfig {
                data_directory,
                database,
            },
            authentication: AuthConfig { jwt_secret },
            share: ShareConfig { default_ttl_days },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> PinoryResult<()> {
        if self.service.hostname.is_empty() {
            return Err(PinoryError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(PinoryError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.share.default_ttl_days <= 0 {
            return Err(PinoryError::Validation(
                "Share TTL must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
