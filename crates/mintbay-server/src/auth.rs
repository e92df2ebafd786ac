//! Request authentication: access-token verification with a DB-backed
//! refresh fallback, plus role-gating layers.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use uuid::Uuid;

use mintbay_auth::{RefreshToken, refresh_secret_matches};
use mintbay_core::{AppError, Role, User};

use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, cookie_value, set_cookie};
use crate::dto::ErrorResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated principal, injected as a request extension.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub session_id: Uuid,
}

impl CurrentUser {
    /// Owner-or-role check used by mutation handlers.
    pub fn owns_or_meets(&self, owner_id: Uuid, required: Role) -> bool {
        self.id == owner_id || self.role.meets(required)
    }
}

/// Middleware that authenticates the request.
///
/// The access token (bearer header, then cookie) is preferred and verified
/// without touching the database. When it is absent or stale, the refresh
/// cookie is used to revive the session: the session row is validated,
/// `last_activity_at` is bumped, and a fresh access cookie rides out on
/// the response.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let access_token = bearer.or_else(|| cookie_value(request.headers(), ACCESS_COOKIE));

    if let Some(token) = access_token {
        if let Ok(claims) = state.tokens.verify_access_token(&token) {
            request.extensions_mut().insert(CurrentUser {
                id: claims.sub,
                username: claims.username,
                role: claims.role,
                session_id: claims.sid,
            });
            return next.run(request).await;
        }
    }

    match refresh_session(&state, request.headers()).await {
        Ok((user, session_id, new_access_token)) => {
            request.extensions_mut().insert(CurrentUser {
                id: user.id,
                username: user.username.clone(),
                role: user.role,
                session_id,
            });

            let mut response = next.run(request).await;
            let cookie = set_cookie(
                ACCESS_COOKIE,
                &new_access_token,
                state.tokens.access_ttl.num_seconds(),
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
            response
        }
        Err(err) => ApiError(err).into_response(),
    }
}

/// Validate the refresh cookie against its session row and mint a new
/// access token. Sessions that are expired, or presented with a secret
/// that no longer matches (already rotated, i.e. reuse), are deleted.
async fn refresh_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(User, Uuid, String), AppError> {
    let raw = cookie_value(headers, REFRESH_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("authentication required".into()))?;
    let token = RefreshToken::parse(&raw)?;

    let sessions = state.db.session_repo();
    let session = sessions
        .find(token.session_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("session not found".into()))?;

    if !refresh_secret_matches(&token.secret, &session.refresh_token_hash) {
        tracing::warn!(session_id = %session.id, "refresh token reuse detected");
        sessions.delete(session.id).await?;
        return Err(AppError::Unauthorized("refresh token is no longer valid".into()));
    }

    let now = Utc::now();
    if session.is_expired(now) {
        sessions.delete(session.id).await?;
        return Err(AppError::Unauthorized("session has expired".into()));
    }

    sessions.touch(session.id).await?;

    let user = state
        .db
        .user_repo()
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;

    let access_token = state.tokens.issue_access_token(&user, session.id, now)?;
    Ok((user, session.id, access_token))
}

/// Middleware gating a router to moderators and above.
pub async fn require_moderator(request: Request<Body>, next: Next) -> Response {
    require_role(Role::Moderator, request, next).await
}

/// Middleware gating a router to admins.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    require_role(Role::Admin, request, next).await
}

async fn require_role(required: Role, request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.role.meets(required) => next.run(request).await,
        Some(_) => {
            let body = ErrorResponse {
                error: "forbidden".to_string(),
                message: format!("{required} role required"),
            };
            (StatusCode::FORBIDDEN, axum::Json(body)).into_response()
        }
        None => {
            let body = ErrorResponse {
                error: "unauthorized".to_string(),
                message: "authentication required".to_string(),
            };
            (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
        }
    }
}
