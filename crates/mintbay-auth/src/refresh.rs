//! Opaque refresh tokens: `<session_id>.<secret>`.
//!
//! The session row stores `SHA-256(secret)`, so a database leak does not
//! yield usable tokens. Rotation replaces the stored hash; a presented
//! secret that no longer matches means the token was already rotated
//! (or stolen), and the session is torn down.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use mintbay_core::AppError;

/// A parsed or freshly generated refresh token.
#[derive(Debug, Clone)]
pub struct RefreshToken {
    pub session_id: Uuid,
    pub secret: String,
}

impl RefreshToken {
    /// Generate a token for a new or rotated session.
    ///
    /// The secret is 64 hex chars built from two v4 UUIDs (244 bits of
    /// randomness), matching the project-wide convention of using UUIDs as
    /// the randomness source instead of pulling in `rand`.
    pub fn generate(session_id: Uuid) -> Self {
        let secret = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        Self { session_id, secret }
    }

    /// Parse the cookie value form.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let (sid, secret) = raw
            .split_once('.')
            .ok_or_else(|| AppError::InvalidToken("malformed refresh token".into()))?;
        let session_id = Uuid::parse_str(sid)
            .map_err(|_| AppError::InvalidToken("malformed refresh token".into()))?;
        if secret.len() != 64 || !secret.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::InvalidToken("malformed refresh token".into()));
        }
        Ok(Self {
            session_id,
            secret: secret.to_string(),
        })
    }

    /// The cookie value form.
    pub fn encode(&self) -> String {
        format!("{}.{}", self.session_id, self.secret)
    }

    /// Hash of the secret as stored in the session row.
    pub fn secret_hash(&self) -> String {
        hash_refresh_secret(&self.secret)
    }
}

/// SHA-256 of the secret, 64-char lowercase hex.
pub fn hash_refresh_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time comparison of a presented secret against the stored hash.
pub fn refresh_secret_matches(secret: &str, stored_hash: &str) -> bool {
    hash_refresh_secret(secret)
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}
