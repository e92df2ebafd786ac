//! Short-lived JWT access tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mintbay_core::{AppError, Role, User};

const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// Signing key and token lifetimes.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `MINTBAY_JWT_SECRET` (required, at least 32 bytes)
    /// - `MINTBAY_ACCESS_TTL_SECS` (optional, defaults to 900)
    /// - `MINTBAY_REFRESH_TTL_DAYS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("MINTBAY_JWT_SECRET").map_err(|_| {
            AppError::ConfigError("MINTBAY_JWT_SECRET not set. Required to sign tokens.".into())
        })?;
        if secret.len() < 32 {
            return Err(AppError::ConfigError(
                "MINTBAY_JWT_SECRET must be at least 32 bytes".into(),
            ));
        }

        let access_ttl = match std::env::var("MINTBAY_ACCESS_TTL_SECS") {
            Err(_) => Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            Ok(raw) => {
                let secs: i64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid MINTBAY_ACCESS_TTL_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if secs <= 0 {
                    return Err(AppError::ConfigError(
                        "MINTBAY_ACCESS_TTL_SECS must be at least 1".into(),
                    ));
                }
                Duration::seconds(secs)
            }
        };

        let refresh_ttl = match std::env::var("MINTBAY_REFRESH_TTL_DAYS") {
            Err(_) => Duration::days(DEFAULT_REFRESH_TTL_DAYS),
            Ok(raw) => {
                let days: i64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid MINTBAY_REFRESH_TTL_DAYS '{raw}': must be a positive integer"
                    ))
                })?;
                if days <= 0 {
                    return Err(AppError::ConfigError(
                        "MINTBAY_REFRESH_TTL_DAYS must be at least 1".into(),
                    ));
                }
                Duration::days(days)
            }
        };

        Ok(Self {
            secret,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Issue an access token for a user within a session.
    pub fn issue_access_token(
        &self,
        user: &User,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = AccessClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            sid: session_id,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InvalidToken(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let data = jsonwebtoken::decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;
        Ok(data.claims)
    }
}

/// Claims carried by an access token.
///
/// `sid` ties the token to the session that issued it so logout can
/// invalidate the right session without a token-to-session lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub sid: Uuid,
    pub iat: i64,
    pub exp: i64,
}
