use std::time::Duration;

use moka::future::Cache;

use mintbay_auth::TokenConfig;
use mintbay_core::transaction::DashboardStats;
use mintbay_db::Database;

/// Shared application state, available to all route handlers via
/// `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub tokens: TokenConfig,
    /// Dashboard aggregates are expensive full-table counts; a short TTL
    /// keeps the admin page from hammering the database.
    pub stats_cache: Cache<&'static str, DashboardStats>,
}

impl AppState {
    pub fn new(db: Database, tokens: TokenConfig) -> Self {
        Self {
            db,
            tokens,
            stats_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(30))
                .build(),
        }
    }
}
