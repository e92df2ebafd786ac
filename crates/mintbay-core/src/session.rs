use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Server-side session row backing a refresh token.
///
/// Only the SHA-256 hash of the refresh secret is stored; the plaintext
/// secret exists solely in the cookie held by the client.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl UserSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Insert payload for a new session.
///
/// The id is generated by the caller because it is embedded in the refresh
/// token before the row exists.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}
