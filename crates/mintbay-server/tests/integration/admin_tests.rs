use axum::http::StatusCode;

use mintbay_core::Role;

use crate::common::{
    login, mint_nft, register_and_login, register_with_role, request, setup_test_app,
};

#[tokio::test]
async fn dashboard_requires_moderator_or_above() {
    let app = setup_test_app().await;
    let (user_token, _) = register_and_login(&app, "alice", "alice@example.com").await;
    let (mod_token, _) =
        register_with_role(&app, "janitor", "janitor@example.com", Role::Moderator).await;

    let (status, _) = request(&app.router, "GET", "/api/admin/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        request(&app.router, "GET", "/api/admin/dashboard", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) =
        request(&app.router, "GET", "/api/admin/dashboard", Some(&mod_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
}

#[tokio::test]
async fn dashboard_aggregates_marketplace_activity() {
    let app = setup_test_app().await;
    let (seller_token, _) = register_and_login(&app, "alice", "alice@example.com").await;
    let (buyer_token, _) = register_and_login(&app, "bob", "bob@example.com").await;
    let (admin_token, _) = register_with_role(&app, "root", "root@example.com", Role::Admin).await;

    let nft_id = mint_nft(&app, &seller_token, "Sold", 1200, true).await;
    let (status, _) = request(
        &app.router,
        "POST",
        &format!("/api/nfts/{nft_id}/purchase"),
        Some(&buyer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request(&app.router, "GET", "/api/admin/dashboard", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 3);
    assert_eq!(body["total_nfts"], 1);
    // One mint + one sale.
    assert_eq!(body["total_transactions"], 2);
    assert_eq!(body["sale_volume"], 1200);
    assert_eq!(body["sales_7d"], 1);
    assert_eq!(body["new_users_7d"], 3);
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = setup_test_app().await;
    let (mod_token, _) =
        register_with_role(&app, "janitor", "janitor@example.com", Role::Moderator).await;
    let (admin_token, _) = register_with_role(&app, "root", "root@example.com", Role::Admin).await;

    let (status, _) =
        request(&app.router, "GET", "/api/admin/users", Some(&mod_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        request(&app.router, "GET", "/api/admin/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    // Admin listing exposes emails.
    assert!(body["items"][0]["email"].is_string());
}

#[tokio::test]
async fn role_changes_are_admin_only_and_never_self() {
    let app = setup_test_app().await;
    let (user_token, user_id) = register_and_login(&app, "alice", "alice@example.com").await;
    let (admin_token, admin_id) =
        register_with_role(&app, "root", "root@example.com", Role::Admin).await;

    // A regular user cannot touch roles.
    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/api/admin/users/{user_id}/role"),
        Some(&user_token),
        Some(serde_json::json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unknown role names are a validation error.
    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/api/admin/users/{user_id}/role"),
        Some(&admin_token),
        Some(serde_json::json!({"role": "superuser"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admins cannot change their own role.
    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/api/admin/users/{admin_id}/role"),
        Some(&admin_token),
        Some(serde_json::json!({"role": "user"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Promotion works and takes effect at the next login.
    let (status, body) = request(
        &app.router,
        "PUT",
        &format!("/api/admin/users/{user_id}/role"),
        Some(&admin_token),
        Some(serde_json::json!({"role": "moderator"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "moderator");

    let promoted_token = login(&app, "alice@example.com").await;
    let (status, _) = request(
        &app.router,
        "GET",
        "/api/admin/dashboard",
        Some(&promoted_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn transaction_inspection_is_admin_only() {
    let app = setup_test_app().await;
    let (alice_token, alice_id) = register_and_login(&app, "alice", "alice@example.com").await;
    let (bob_token, _) = register_and_login(&app, "bob", "bob@example.com").await;
    let (admin_token, _) = register_with_role(&app, "root", "root@example.com", Role::Admin).await;

    mint_nft(&app, &alice_token, "Piece", 100, false).await;

    // Bob cannot read Alice's history.
    let (status, _) = request(
        &app.router,
        "GET",
        &format!("/api/transactions?user_id={alice_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The admin can.
    let (status, body) = request(
        &app.router,
        "GET",
        &format!("/api/transactions?user_id={alice_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["kind"], "mint");

    // Kind filter.
    let (_, body) = request(
        &app.router,
        "GET",
        "/api/transactions?kind=sale",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(body["total"], 0);
}
