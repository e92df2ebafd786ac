use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use mintbay_core::transaction::{NewTransaction, Transaction, TransactionKind};
use mintbay_core::{AppError, Page, PageParams};

use crate::db_err;

/// Repository for the immutable transaction ledger.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: Pool<Postgres>,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every ledger entry, oldest first. Used by the CLI export.
    pub async fn all(&self) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"SELECT * FROM transactions ORDER BY created_at ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Page through a user's transactions (as buyer or seller), newest
    /// first, optionally filtered by kind.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        kind: Option<TransactionKind>,
        params: PageParams,
    ) -> Result<Page<Transaction>, AppError> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM transactions WHERE (buyer_id = ");
        count_query.push_bind(user_id);
        count_query.push(" OR seller_id = ");
        count_query.push_bind(user_id);
        count_query.push(")");
        if let Some(kind) = kind {
            count_query.push(" AND kind = ");
            count_query.push_bind(kind.as_str());
        }
        let (total,): (i64,) = count_query
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM transactions WHERE (buyer_id = ");
        query.push_bind(user_id);
        query.push(" OR seller_id = ");
        query.push_bind(user_id);
        query.push(")");
        if let Some(kind) = kind {
            query.push(" AND kind = ");
            query.push_bind(kind.as_str());
        }
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(params.limit());
        query.push(" OFFSET ");
        query.push_bind(params.offset());

        let rows: Vec<TransactionRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            params,
        ))
    }
}

/// Insert a transaction inside an open database transaction.
///
/// Ownership changes and their ledger entries must commit together, so the
/// NFT and auction repositories call this with their own connection.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    new: &NewTransaction,
) -> Result<Transaction, AppError> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r#"
        INSERT INTO transactions (nft_id, seller_id, buyer_id, amount, kind)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(new.nft_id)
    .bind(new.seller_id)
    .bind(new.buyer_id)
    .bind(new.amount)
    .bind(new.kind.as_str())
    .fetch_one(conn)
    .await
    .map_err(db_err)?;

    Ok(row.into())
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
pub(crate) struct TransactionRow {
    id: Uuid,
    nft_id: Uuid,
    seller_id: Option<Uuid>,
    buyer_id: Uuid,
    amount: i64,
    kind: String,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Transaction {
            id: row.id,
            nft_id: row.nft_id,
            seller_id: row.seller_id,
            buyer_id: row.buyer_id,
            amount: row.amount,
            kind: row.kind.parse().unwrap_or(TransactionKind::Transfer),
            created_at: row.created_at,
        }
    }
}
