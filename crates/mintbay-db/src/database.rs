use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use mintbay_core::AppError;

use crate::auction_repository::AuctionRepository;
use crate::collection_repository::CollectionRepository;
use crate::config::DatabaseConfig;
use crate::db_err;
use crate::nft_repository::NftRepository;
use crate::session_repository::SessionRepository;
use crate::stats_repository::StatsRepository;
use crate::transaction_repository::TransactionRepository;
use crate::user_repository::UserRepository;

/// Central database facade — owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        tracing::debug!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn session_repo(&self) -> SessionRepository {
        SessionRepository::new(self.pool.clone())
    }

    pub fn collection_repo(&self) -> CollectionRepository {
        CollectionRepository::new(self.pool.clone())
    }

    pub fn nft_repo(&self) -> NftRepository {
        NftRepository::new(self.pool.clone())
    }

    pub fn auction_repo(&self) -> AuctionRepository {
        AuctionRepository::new(self.pool.clone())
    }

    pub fn transaction_repo(&self) -> TransactionRepository {
        TransactionRepository::new(self.pool.clone())
    }

    pub fn stats_repo(&self) -> StatsRepository {
        StatsRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
