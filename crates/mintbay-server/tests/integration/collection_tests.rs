use axum::http::StatusCode;
use uuid::Uuid;

use mintbay_core::Role;

use crate::common::{register_and_login, register_with_role, request, setup_test_app};

async fn create_collection(
    app: &crate::common::TestApp,
    token: &str,
    name: &str,
) -> (StatusCode, serde_json::Value) {
    request(
        &app.router,
        "POST",
        "/api/collections",
        Some(token),
        Some(serde_json::json!({"name": name})),
    )
    .await
}

#[tokio::test]
async fn create_derives_a_stable_slug() {
    let app = setup_test_app().await;
    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;

    let (status, body) = create_collection(&app, &token, "Bored Apes #1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "bored-apes-1");
    assert_eq!(body["nft_count"], 0);
}

#[tokio::test]
async fn duplicate_collection_name_conflicts() {
    let app = setup_test_app().await;
    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;

    let (status, _) = create_collection(&app, &token, "Punks").await;
    assert_eq!(status, StatusCode::CREATED);

    // Different spacing, same slug.
    let (status, body) = create_collection(&app, &token, "  Punks  ").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn only_the_creator_mints_into_a_collection() {
    let app = setup_test_app().await;
    let (alice_token, _) = register_and_login(&app, "alice", "alice@example.com").await;
    let (bob_token, _) = register_and_login(&app, "bob", "bob@example.com").await;

    let (_, collection) = create_collection(&app, &alice_token, "Alice Originals").await;
    let collection_id = collection["id"].as_str().unwrap();

    let nft_body = serde_json::json!({
        "name": "Piece",
        "image_url": "https://cdn.example.com/p.png",
        "price": 100,
        "collection_id": collection_id,
    });

    let (status, _) =
        request(&app.router, "POST", "/api/nfts", Some(&bob_token), Some(nft_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        request(&app.router, "POST", "/api/nfts", Some(&alice_token), Some(nft_body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["collection_id"], collection_id);

    // Count reflects the attached NFT.
    let (_, body) = request(
        &app.router,
        "GET",
        &format!("/api/collections/{collection_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(body["nft_count"], 1);
}

#[tokio::test]
async fn minting_into_a_missing_collection_is_404() {
    let app = setup_test_app().await;
    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;

    let (status, _) = request(
        &app.router,
        "POST",
        "/api/nfts",
        Some(&token),
        Some(serde_json::json!({
            "name": "Orphan",
            "image_url": "https://cdn.example.com/o.png",
            "price": 100,
            "collection_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_collection_detaches_its_nfts() {
    let app = setup_test_app().await;
    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;

    let (_, collection) = create_collection(&app, &token, "Ephemeral").await;
    let collection_id = collection["id"].as_str().unwrap().to_string();

    let (_, nft) = request(
        &app.router,
        "POST",
        "/api/nfts",
        Some(&token),
        Some(serde_json::json!({
            "name": "Survivor",
            "image_url": "https://cdn.example.com/s.png",
            "price": 100,
            "collection_id": collection_id,
        })),
    )
    .await;
    let nft_id = nft["id"].as_str().unwrap();

    let (status, _) = request(
        &app.router,
        "DELETE",
        &format!("/api/collections/{collection_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The NFT survives, detached.
    let (status, body) =
        request(&app.router, "GET", &format!("/api/nfts/{nft_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn update_is_limited_to_creator_and_admin() {
    let app = setup_test_app().await;
    let (alice_token, _) = register_and_login(&app, "alice", "alice@example.com").await;
    let (bob_token, _) = register_and_login(&app, "bob", "bob@example.com").await;
    let (mod_token, _) =
        register_with_role(&app, "janitor", "janitor@example.com", Role::Moderator).await;

    let (_, collection) = create_collection(&app, &alice_token, "Guarded").await;
    let id = collection["id"].as_str().unwrap();
    let update = serde_json::json!({"description": "now described"});

    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/api/collections/{id}"),
        Some(&bob_token),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Moderators can delete, not edit.
    let (status, _) = request(
        &app.router,
        "PUT",
        &format!("/api/collections/{id}"),
        Some(&mod_token),
        Some(update.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app.router,
        "PUT",
        &format!("/api/collections/{id}"),
        Some(&alice_token),
        Some(update),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "now described");
}

#[tokio::test]
async fn list_searches_by_name() {
    let app = setup_test_app().await;
    let (token, _) = register_and_login(&app, "alice", "alice@example.com").await;

    create_collection(&app, &token, "Neon Cats").await;
    create_collection(&app, &token, "Neon Dogs").await;
    create_collection(&app, &token, "Plain Rocks").await;

    let (status, body) =
        request(&app.router, "GET", "/api/collections?search=neon", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = request(&app.router, "GET", "/api/collections", None, None).await;
    assert_eq!(body["total"], 3);
}
