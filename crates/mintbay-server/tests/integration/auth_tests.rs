use axum::http::StatusCode;

use crate::common::{
    TEST_PASSWORD, extract_cookie, raw_request, register_and_login, request,
    request_with_cookies, setup_test_app,
};

#[tokio::test]
async fn register_returns_account_without_secrets() {
    let app = setup_test_app().await;

    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "alice",
            "email": "Alice@Example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    // Emails are stored lowercased.
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "user");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_invalid_input() {
    let app = setup_test_app().await;

    for (username, email, password) in [
        ("ab", "a@example.com", TEST_PASSWORD),       // username too short
        ("Alice", "a@example.com", TEST_PASSWORD),    // uppercase username
        ("alice", "not-an-email", TEST_PASSWORD),     // bad email
        ("alice", "a@example.com", "short"),          // password too short
    ] {
        let (status, body) = request(
            &app.router,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted: {username} {email}");
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn duplicate_registration_returns_409() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    // Same username, different email.
    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "alice",
            "email": "other@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Same email, different username.
    let (status, _) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_returns_token_and_sets_cookies() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let response = raw_request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let access = extract_cookie(&response, "access-token").expect("access cookie");
    let refresh = extract_cookie(&response, "refresh-token").expect("refresh cookie");
    assert!(!access.is_empty());
    // Refresh token is <session uuid>.<64 hex chars>.
    let (sid, secret) = refresh.split_once('.').expect("sid.secret form");
    assert!(uuid::Uuid::parse_str(sid).is_ok());
    assert_eq!(secret.len(), 64);

    // Cookie attributes.
    let raw_cookies: Vec<_> = response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(raw_cookies.iter().all(|c| c.contains("HttpOnly")));
}

#[tokio::test]
async fn login_failure_does_not_reveal_which_field_was_wrong() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let (status_wrong_pw, body_wrong_pw) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": "wrong-password",
        })),
    )
    .await;
    let (status_unknown, body_unknown) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "nobody@example.com",
            "password": "wrong-password",
        })),
    )
    .await;

    assert_eq!(status_wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(status_unknown, StatusCode::UNAUTHORIZED);
    // Identical envelopes for both failure modes.
    assert_eq!(body_wrong_pw, body_unknown);
    assert!(body_wrong_pw.get("password_hash").is_none());
}

#[tokio::test]
async fn me_requires_authentication() {
    let app = setup_test_app().await;

    let (status, body) = request(&app.router, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;
    let (status, body) = request(&app.router, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
}

#[tokio::test]
async fn access_token_cookie_authenticates() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let response = raw_request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    let access = extract_cookie(&response, "access-token").unwrap();

    let (status, body, _) = request_with_cookies(
        &app.router,
        "GET",
        "/api/auth/me",
        &format!("access-token={access}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn refresh_cookie_revives_an_expired_access_token() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let response = raw_request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    let refresh = extract_cookie(&response, "refresh-token").unwrap();

    // No access token at all; only the refresh cookie.
    let (status, body, set_cookies) = request_with_cookies(
        &app.router,
        "GET",
        "/api/auth/me",
        &format!("refresh-token={refresh}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    // A fresh access cookie rides out on the response.
    assert!(
        set_cookies.iter().any(|c| c.starts_with("access-token=")),
        "expected a new access cookie, got {set_cookies:?}"
    );
}

#[tokio::test]
async fn refresh_rotates_and_detects_reuse() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let response = raw_request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    let first = extract_cookie(&response, "refresh-token").unwrap();

    // Rotate.
    let (status, _, set_cookies) = request_with_cookies(
        &app.router,
        "POST",
        "/api/auth/refresh",
        &format!("refresh-token={first}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = set_cookies
        .iter()
        .find_map(|c| c.strip_prefix("refresh-token="))
        .map(|rest| rest.split(';').next().unwrap().to_string())
        .expect("rotated refresh cookie");
    assert_ne!(first, second);

    // Replaying the first token is reuse: 401, and the session dies.
    let (status, body, _) = request_with_cookies(
        &app.router,
        "POST",
        "/api/auth/refresh",
        &format!("refresh-token={first}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    // The rotated token is dead as well; the whole session was torn down.
    let (status, _, _) = request_with_cookies(
        &app.router,
        "POST",
        "/api/auth/refresh",
        &format!("refresh-token={second}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_kills_session_and_clears_cookies() {
    let app = setup_test_app().await;
    register_and_login(&app, "alice", "alice@example.com").await;

    let response = raw_request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    let refresh = extract_cookie(&response, "refresh-token").unwrap();

    let (status, _, set_cookies) = request_with_cookies(
        &app.router,
        "POST",
        "/api/auth/logout",
        &format!("refresh-token={refresh}"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(set_cookies.iter().any(|c| c.contains("access-token=;")));
    assert!(set_cookies.iter().any(|c| c.contains("refresh-token=;")));

    // The session is gone.
    let (status, _, _) = request_with_cookies(
        &app.router,
        "POST",
        "/api/auth/refresh",
        &format!("refresh-token={refresh}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_session_still_clears_cookies() {
    let app = setup_test_app().await;

    let (status, _, set_cookies) =
        request_with_cookies(&app.router, "POST", "/api/auth/logout", "refresh-token=garbage")
            .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(set_cookies.iter().any(|c| c.contains("Max-Age=0")));
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() {
    let app = setup_test_app().await;

    let (status, _) = request(
        &app.router,
        "GET",
        "/api/auth/me",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_round_trips() {
    let app = setup_test_app().await;
    let (token, user_id) = register_and_login(&app, "alice", "alice@example.com").await;

    let (status, body) = request(
        &app.router,
        "PUT",
        "/api/users/me",
        Some(&token),
        Some(serde_json::json!({
            "display_name": "Alice",
            "bio": "collector of rare apes",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice");

    // Public profile shows the new fields but never the email.
    let (status, body) =
        request(&app.router, "GET", &format!("/api/users/{user_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice");
    assert_eq!(body["bio"], "collector of rare apes");
    assert!(body.get("email").is_none());
}
