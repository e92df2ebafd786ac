use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, SET_COOKIE, USER_AGENT};
use axum::response::{AppendHeaders, IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use mintbay_auth::{RefreshToken, hash_password, refresh_secret_matches, verify_password_timing_safe};
use mintbay_core::AppError;
use mintbay_core::session::NewSession;
use mintbay_core::user::NewUser;
use mintbay_core::validation::{validate_email, validate_password, validate_username};

use crate::auth::CurrentUser;
use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, clear_cookie, cookie_value, set_cookie};
use crate::dto::{AccountResponse, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Username or email taken", body = crate::dto::ErrorResponse),
        (status = 429, description = "Rate limited"),
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_username(&body.username)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    let new_user = NewUser {
        username: body.username,
        email: body.email.to_lowercase(),
        password_hash: hash_password(&body.password)?,
    };
    let user = state.db.user_repo().create(&new_user).await?;

    Ok((StatusCode::CREATED, axum::Json(AccountResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; tokens issued as cookies", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
        (status = 429, description = "Rate limited"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.to_lowercase();
    let user = state.db.user_repo().find_by_email(&email).await?;

    // The dummy-hash path keeps latency flat when the email is unknown, and
    // the single error message keeps the response from naming the bad field.
    let verified =
        verify_password_timing_safe(&body.password, user.as_ref().map(|u| u.password_hash.as_str()))?;
    let user = match (user, verified) {
        (Some(user), true) => user,
        _ => return Err(AppError::Unauthorized("invalid email or password".into()).into()),
    };

    let now = Utc::now();
    let session_id = Uuid::new_v4();
    let refresh = RefreshToken::generate(session_id);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.chars().take(255).collect());

    state
        .db
        .session_repo()
        .create(&NewSession {
            id: session_id,
            user_id: user.id,
            refresh_token_hash: refresh.secret_hash(),
            user_agent,
            expires_at: now + state.tokens.refresh_ttl,
        })
        .await?;

    let access_token = state.tokens.issue_access_token(&user, session_id, now)?;

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            set_cookie(ACCESS_COOKIE, &access_token, state.tokens.access_ttl.num_seconds()),
        ),
        (
            SET_COOKIE,
            set_cookie(REFRESH_COOKIE, &refresh.encode(), state.tokens.refresh_ttl.num_seconds()),
        ),
    ]);

    tracing::info!(user_id = %user.id, "login");

    Ok((
        cookies,
        axum::Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "Tokens rotated", body = AuthResponse),
        (status = 401, description = "Invalid or expired session", body = crate::dto::ErrorResponse),
        (status = 429, description = "Rate limited"),
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let raw = cookie_value(&headers, REFRESH_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("missing refresh token".into()))?;
    let token = RefreshToken::parse(&raw)?;

    let sessions = state.db.session_repo();
    let session = sessions
        .find(token.session_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("session not found".into()))?;

    // A mismatched secret means this token was already rotated: either the
    // client replayed an old cookie or the token leaked. Kill the session.
    if !refresh_secret_matches(&token.secret, &session.refresh_token_hash) {
        tracing::warn!(session_id = %session.id, "refresh token reuse detected");
        sessions.delete(session.id).await?;
        return Err(AppError::Unauthorized("refresh token is no longer valid".into()).into());
    }

    let now = Utc::now();
    if session.is_expired(now) {
        sessions.delete(session.id).await?;
        return Err(AppError::Unauthorized("session has expired".into()).into());
    }

    let user = state
        .db
        .user_repo()
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;

    let rotated = RefreshToken::generate(session.id);
    sessions
        .rotate(session.id, &rotated.secret_hash(), now + state.tokens.refresh_ttl)
        .await?;

    let access_token = state.tokens.issue_access_token(&user, session.id, now)?;

    let cookies = AppendHeaders([
        (
            SET_COOKIE,
            set_cookie(ACCESS_COOKIE, &access_token, state.tokens.access_ttl.num_seconds()),
        ),
        (
            SET_COOKIE,
            set_cookie(REFRESH_COOKIE, &rotated.encode(), state.tokens.refresh_ttl.num_seconds()),
        ),
    ]);

    Ok((
        cookies,
        axum::Json(AuthResponse {
            user: user.into(),
            access_token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Session deleted; cookies cleared"),
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    // Find the session via the refresh cookie, falling back to the access
    // token's sid claim. Cookies are cleared no matter what was found.
    let session_id = cookie_value(&headers, REFRESH_COOKIE)
        .and_then(|raw| RefreshToken::parse(&raw).ok().map(|t| t.session_id))
        .or_else(|| {
            let token = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_string)
                .or_else(|| cookie_value(&headers, ACCESS_COOKIE))?;
            state
                .tokens
                .verify_access_token(&token)
                .ok()
                .map(|claims| claims.sid)
        });

    if let Some(session_id) = session_id {
        state.db.session_repo().delete(session_id).await?;
    }

    let cookies = AppendHeaders([
        (SET_COOKIE, clear_cookie(ACCESS_COOKIE)),
        (SET_COOKIE, clear_cookie(REFRESH_COOKIE)),
    ]);

    Ok((cookies, StatusCode::NO_CONTENT))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The caller's account", body = AccountResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_repo()
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".into()))?;

    Ok(axum::Json(AccountResponse::from(user)))
}
