use chrono::{Duration, Utc};
use uuid::Uuid;

use mintbay_core::session::NewSession;

use crate::common::{insert_user, setup_test_db};

fn new_session(user_id: Uuid, hash: &str, ttl: Duration) -> NewSession {
    NewSession {
        id: Uuid::new_v4(),
        user_id,
        refresh_token_hash: hash.to_string(),
        user_agent: Some("integration-test".to_string()),
        expires_at: Utc::now() + ttl,
    }
}

#[tokio::test]
async fn create_and_find_round_trip() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let new = new_session(user_id, &"a".repeat(64), Duration::days(30));
    let created = sessions.create(&new).await.unwrap();
    assert_eq!(created.id, new.id);
    assert_eq!(created.user_id, user_id);
    assert_eq!(created.refresh_token_hash, new.refresh_token_hash);

    let found = sessions.find(new.id).await.unwrap().unwrap();
    assert_eq!(found.id, new.id);
    assert!(!found.is_expired(Utc::now()));

    assert!(sessions.find(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn rotate_replaces_hash_and_slides_expiry() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let new = new_session(user_id, &"a".repeat(64), Duration::days(1));
    sessions.create(&new).await.unwrap();

    let new_hash = "b".repeat(64);
    let new_expiry = Utc::now() + Duration::days(30);
    sessions.rotate(new.id, &new_hash, new_expiry).await.unwrap();

    let rotated = sessions.find(new.id).await.unwrap().unwrap();
    assert_eq!(rotated.refresh_token_hash, new_hash);
    assert!(rotated.expires_at > Utc::now() + Duration::days(29));
}

#[tokio::test]
async fn touch_bumps_last_activity() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let new = new_session(user_id, &"a".repeat(64), Duration::days(1));
    let created = sessions.create(&new).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    sessions.touch(new.id).await.unwrap();

    let touched = sessions.find(new.id).await.unwrap().unwrap();
    assert!(touched.last_activity_at > created.last_activity_at);
    // Touch does not move the expiry.
    assert_eq!(touched.expires_at, created.expires_at);
}

#[tokio::test]
async fn delete_reports_whether_a_row_existed() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let new = new_session(user_id, &"a".repeat(64), Duration::days(1));
    sessions.create(&new).await.unwrap();

    assert!(sessions.delete(new.id).await.unwrap());
    assert!(!sessions.delete(new.id).await.unwrap());
    assert!(sessions.find(new.id).await.unwrap().is_none());
}

#[tokio::test]
async fn purge_removes_only_expired_sessions() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let expired = new_session(user_id, &"a".repeat(64), Duration::seconds(-60));
    let live = new_session(user_id, &"b".repeat(64), Duration::days(1));
    sessions.create(&expired).await.unwrap();
    sessions.create(&live).await.unwrap();

    assert_eq!(sessions.purge_expired().await.unwrap(), 1);
    assert!(sessions.find(expired.id).await.unwrap().is_none());
    assert!(sessions.find(live.id).await.unwrap().is_some());
}

#[tokio::test]
async fn deleting_a_user_cascades_to_sessions() {
    let (db, _container) = setup_test_db().await;
    let user_id = insert_user(&db, "alice").await;
    let sessions = db.session_repo();

    let new = new_session(user_id, &"a".repeat(64), Duration::days(1));
    sessions.create(&new).await.unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db.pool())
        .await
        .unwrap();

    assert!(sessions.find(new.id).await.unwrap().is_none());
}
