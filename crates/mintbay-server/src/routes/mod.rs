use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{authenticate, require_admin, require_moderator};
use crate::config::RateLimitConfig;
use crate::dto::HealthResponse;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod admin;
pub mod auctions;
pub mod auth;
pub mod collections;
pub mod nfts;
pub mod transactions;
pub mod users;

/// Build the full router with all routes and middleware.
///
/// `rate_limit` is applied to the auth endpoints only (the brute-forceable
/// surface); `None` disables the layer so tests can drive the router
/// without socket-level peer addresses.
pub fn router(state: Arc<AppState>, rate_limit: Option<RateLimitConfig>) -> Router {
    let mut auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout));

    if let Some(limit) = rate_limit {
        let config = GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_second(limit.replenish_per_second)
            .burst_size(limit.burst)
            .finish();
        // finish() only fails on zero values, which ServerConfig rejects.
        if let Some(config) = config {
            auth_routes = auth_routes.layer(GovernorLayer::new(config));
        }
    }

    let public = Router::new()
        .route("/health", get(health))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/nfts", get(nfts::list_nfts))
        .route("/api/nfts/{id}", get(nfts::get_nft))
        .route("/api/collections", get(collections::list_collections))
        .route("/api/collections/{id}", get(collections::get_collection))
        .route("/api/auctions", get(auctions::list_auctions))
        .route("/api/auctions/{id}", get(auctions::get_auction))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/me", put(users::update_me))
        .route("/api/nfts", post(nfts::create_nft))
        .route("/api/nfts/{id}", put(nfts::update_nft).delete(nfts::delete_nft))
        .route("/api/nfts/{id}/purchase", post(nfts::purchase_nft))
        .route("/api/nfts/{id}/transfer", post(nfts::transfer_nft))
        .route("/api/collections", post(collections::create_collection))
        .route(
            "/api/collections/{id}",
            put(collections::update_collection).delete(collections::delete_collection),
        )
        .route("/api/auctions", post(auctions::create_auction))
        .route("/api/auctions/{id}", delete(auctions::cancel_auction))
        .route("/api/auctions/{id}/bids", post(auctions::place_bid))
        .route("/api/auctions/{id}/settle", post(auctions::settle_auction))
        .route("/api/transactions", get(transactions::list_transactions))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let admin_routes = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .layer(middleware::from_fn(require_moderator))
        .merge(
            Router::new()
                .route("/api/admin/users", get(admin::list_users))
                .route("/api/admin/users/{id}/role", put(admin::set_role))
                .layer(middleware::from_fn(require_admin)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    public
        .merge(auth_routes)
        .merge(protected)
        .merge(admin_routes)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
