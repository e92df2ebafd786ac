pub mod auction_repository;
pub mod collection_repository;
pub mod config;
pub mod database;
pub mod nft_repository;
pub mod session_repository;
pub mod stats_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use auction_repository::AuctionRepository;
pub use collection_repository::CollectionRepository;
pub use config::DatabaseConfig;
pub use database::Database;
pub use nft_repository::NftRepository;
pub use session_repository::SessionRepository;
pub use stats_repository::StatsRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;

use mintbay_core::AppError;

/// Default mapping for sqlx errors.
pub(crate) fn db_err(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}

/// Map a unique-constraint violation to a 409-worthy conflict, everything
/// else to a database error.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    db_err(e)
}

/// Build an escaped `ILIKE` pattern for a substring search.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}
