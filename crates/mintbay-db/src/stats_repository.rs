use sqlx::{PgPool, Pool, Postgres};

use mintbay_core::AppError;
use mintbay_core::transaction::DashboardStats;

use crate::db_err;

/// Aggregate queries for the admin dashboard.
#[derive(Clone)]
pub struct StatsRepository {
    pool: Pool<Postgres>,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Collect the dashboard aggregates in one round trip.
    pub async fn dashboard(&self) -> Result<DashboardStats, AppError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM nfts) AS total_nfts,
                (SELECT COUNT(*) FROM collections) AS total_collections,
                (SELECT COUNT(*) FROM auctions WHERE status = 'active') AS active_auctions,
                (SELECT COUNT(*) FROM transactions) AS total_transactions,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM transactions
                 WHERE kind IN ('sale', 'auction_sale')) AS sale_volume,
                (SELECT COUNT(*) FROM users
                 WHERE created_at >= NOW() - INTERVAL '7 days') AS new_users_7d,
                (SELECT COUNT(*) FROM transactions
                 WHERE kind IN ('sale', 'auction_sale')
                   AND created_at >= NOW() - INTERVAL '7 days') AS sales_7d
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(DashboardStats {
            total_users: row.total_users,
            total_nfts: row.total_nfts,
            total_collections: row.total_collections,
            active_auctions: row.active_auctions,
            total_transactions: row.total_transactions,
            sale_volume: row.sale_volume,
            new_users_7d: row.new_users_7d,
            sales_7d: row.sales_7d,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    total_nfts: i64,
    total_collections: i64,
    active_auctions: i64,
    total_transactions: i64,
    sale_volume: i64,
    new_users_7d: i64,
    sales_7d: i64,
}
