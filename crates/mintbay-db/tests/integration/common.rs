use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use uuid::Uuid;

use mintbay_core::user::NewUser;
use mintbay_db::Database;

/// Spin up a PostgreSQL container and return a migrated `Database` plus the
/// container handle (dropping it stops the container).
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
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

    (db, container)
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

/// Insert a user with a throwaway hash; repositories never inspect it.
pub async fn insert_user(db: &Database, username: &str) -> Uuid {
    db.user_repo()
        .create(&NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "$argon2id$test$hash".to_string(),
        })
        .await
        .expect("Failed to insert user")
        .id
}
