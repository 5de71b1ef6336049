/// Authentication extractors and token utilities
///
/// Identity lives with an external provider; callers prove who they are
/// with an HS256 bearer token signed with the shared secret. The server
/// only reads the `sub` claim.
use crate::{api::middleware::extract_bearer_token, context::AppContext, error::PinoryError};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Bearer token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The caller's user id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue an access token for a user id
pub fn issue_access_token(
    user_id: &str,
    jwt_secret: &str,
    ttl: Duration,
) -> Result<String, PinoryError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| PinoryError::Internal(format!("Token signing failed: {}", e)))
}

/// Verify a bearer token and return the caller's user id
pub fn verify_access_token(token: &str, jwt_secret: &str) -> Result<String, PinoryError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Allow some clock skew (5 minutes)
    validation.leeway = 300;

    let data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                PinoryError::Authentication("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                PinoryError::Authentication("Invalid token signature".to_string())
            }
            _ => PinoryError::Authentication(format!("Invalid token: {}", e)),
        }
    })?;

    Ok(data.claims.sub)
}

/// Authenticated context - extracts and validates the caller's identity
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = PinoryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            PinoryError::Authentication("Missing authorization header".to_string())
        })?;

        let user_id = verify_access_token(&token, &state.config.authentication.jwt_secret)?;

        Ok(AuthContext { user_id })
    }
}

/// Optional authenticated context - anonymous callers pass through
#[derive(Debug, Clone)]
pub struct OptionalAuthContext {
    pub user_id: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppContext> for OptionalAuthContext {
    type Rejection = PinoryError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let user_id = extract_bearer_token(&parts.headers).and_then(|token| {
            verify_access_token(&token, &state.config.authentication.jwt_secret).ok()
        });

        Ok(OptionalAuthContext { user_id })
    }
}
