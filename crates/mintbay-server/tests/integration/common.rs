use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::SET_COOKIE;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;
use uuid::Uuid;

use mintbay_auth::TokenConfig;
use mintbay_core::Role;
use mintbay_db::Database;
use mintbay_server::routes;
use mintbay_server::state::AppState;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    _container: ContainerAsync<GenericImage>,
}

/// Spin up a PostgreSQL container, run the real migrations, and build the
/// router with rate limiting disabled.
pub async fn setup_test_app() -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "mintbay_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/mintbay_test");
    let pool = retry_connect(&url).await;

    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");

    let tokens = TokenConfig::new(TEST_JWT_SECRET);
    let state = Arc::new(AppState::new(db.clone(), tokens));

    TestApp {
        router: routes::router(state, None),
        db,
        _container: container,
    }
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(5).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a JSON request and return (status, parsed body).
pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = raw_request(router, method, uri, token, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Send a request and return the raw response (for cookie assertions).
pub async fn raw_request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

/// Send a request with a Cookie header and return (status, parsed body,
/// raw response cookies).
pub async fn request_with_cookies(
    router: &Router,
    method: &str,
    uri: &str,
    cookies: &str,
) -> (StatusCode, serde_json::Value, Vec<String>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookies)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookies = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json, set_cookies)
}

/// Pull a cookie value out of a response's Set-Cookie headers.
pub fn extract_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|raw| {
            raw.strip_prefix(&prefix)
                .and_then(|rest| rest.split(';').next())
                .map(str::to_string)
        })
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register an account and log in; returns (access token, user id).
pub async fn register_and_login(app: &TestApp, username: &str, email: &str) -> (String, Uuid) {
    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/register",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let user_id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();

    let token = login(app, email).await;
    (token, user_id)
}

/// Log in an existing account; returns the access token.
pub async fn login(app: &TestApp, email: &str) -> String {
    let (status, body) = request(
        &app.router,
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": TEST_PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Register an account with the given role; returns (access token, user id).
///
/// The role is set directly in the database and the login happens after,
/// so the token carries the elevated role.
pub async fn register_with_role(
    app: &TestApp,
    username: &str,
    email: &str,
    role: Role,
) -> (String, Uuid) {
    let (_, user_id) = register_and_login(app, username, email).await;
    app.db
        .user_repo()
        .set_role(user_id, role)
        .await
        .unwrap()
        .unwrap();
    let token = login(app, email).await;
    (token, user_id)
}

/// Mint an NFT and return its id.
pub async fn mint_nft(app: &TestApp, token: &str, name: &str, price: i64, listed: bool) -> Uuid {
    let (status, body) = request(
        &app.router,
        "POST",
        "/api/nfts",
        Some(token),
        Some(serde_json::json!({
            "name": name,
            "image_url": "https://cdn.example.com/art.png",
            "price": price,
            "listed": listed,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "mint failed: {body}");
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}
