use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use mintbay_core::AppError;
use mintbay_core::session::{NewSession, UserSession};

use crate::db_err;

/// Repository for the session rows backing refresh tokens.
#[derive(Clone)]
pub struct SessionRepository {
    pool: Pool<Postgres>,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewSession) -> Result<UserSession, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO user_sessions (id, user_id, refresh_token_hash, user_agent, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(new.user_id)
        .bind(&new.refresh_token_hash)
        .bind(&new.user_agent)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.into())
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<UserSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(r#"SELECT * FROM user_sessions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Record activity on the session without touching the token.
    pub async fn touch(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(r#"UPDATE user_sessions SET last_activity_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Replace the refresh secret hash and slide the expiry window.
    pub async fn rotate(
        &self,
        id: Uuid,
        new_token_hash: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE user_sessions
            SET refresh_token_hash = $2, expires_at = $3, last_activity_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_token_hash)
        .bind(new_expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// Delete a session; returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM user_sessions WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop all expired sessions; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query(r#"DELETE FROM user_sessions WHERE expires_at <= NOW()"#)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    refresh_token_hash: String,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl From<SessionRow> for UserSession {
    fn from(row: SessionRow) -> Self {
        UserSession {
            id: row.id,
            user_id: row.user_id,
            refresh_token_hash: row.refresh_token_hash,
            user_agent: row.user_agent,
            created_at: row.created_at,
            expires_at: row.expires_at,
            last_activity_at: row.last_activity_at,
        }
    }
}
