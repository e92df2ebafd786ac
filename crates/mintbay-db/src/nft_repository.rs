use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use mintbay_core::nft::{NewNft, Nft, NftFilter, NftSort, NftUpdate};
use mintbay_core::transaction::{NewTransaction, Transaction, TransactionKind};
use mintbay_core::{AppError, Page, PageParams};

use crate::{db_err, like_pattern, transaction_repository};

/// Repository for NFTs. Ownership-changing operations (purchase, transfer)
/// lock the row and write the ledger entry in the same transaction.
#[derive(Clone)]
pub struct NftRepository {
    pool: Pool<Postgres>,
}

impl NftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a new NFT and record the `mint` ledger entry atomically.
    pub async fn create(&self, new: &NewNft) -> Result<Nft, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, NftRow>(
            r#"
            INSERT INTO nfts (name, description, image_url, attributes, price, listed,
                              owner_id, creator_id, collection_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(&new.attributes)
        .bind(new.price)
        .bind(new.listed)
        .bind(new.creator_id)
        .bind(new.collection_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return AppError::not_found("Collection");
                }
            }
            db_err(e)
        })?;

        transaction_repository::insert(
            &mut *tx,
            &NewTransaction {
                nft_id: row.id,
                seller_id: None,
                buyer_id: new.creator_id,
                amount: 0,
                kind: TransactionKind::Mint,
            },
        )
        .await?;

        tx.commit().await.map_err(db_err)?;
        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Nft>, AppError> {
        let row = sqlx::query_as::<_, NftRow>(r#"SELECT * FROM nfts WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Page through NFTs matching the filter.
    pub async fn list(&self, filter: &NftFilter, params: PageParams) -> Result<Page<Nft>, AppError> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM nfts WHERE TRUE");
        push_filters(&mut count_query, filter);
        let (total,): (i64,) = count_query
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM nfts WHERE TRUE");
        push_filters(&mut query, filter);
        query.push(match filter.sort {
            NftSort::Newest => " ORDER BY created_at DESC",
            NftSort::Oldest => " ORDER BY created_at ASC",
            NftSort::PriceAsc => " ORDER BY price ASC, created_at DESC",
            NftSort::PriceDesc => " ORDER BY price DESC, created_at DESC",
        });
        query.push(" LIMIT ");
        query.push_bind(params.limit());
        query.push(" OFFSET ");
        query.push_bind(params.offset());

        let rows: Vec<NftRow> = query
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

    /// Apply a partial update; `None` fields keep their value.
    pub async fn update(&self, id: Uuid, update: &NftUpdate) -> Result<Option<Nft>, AppError> {
        let row = sqlx::query_as::<_, NftRow>(
            r#"
            UPDATE nfts
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                attributes = COALESCE($5, attributes),
                price = COALESCE($6, price),
                listed = COALESCE($7, listed),
                collection_id = COALESCE($8, collection_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.image_url)
        .bind(&update.attributes)
        .bind(update.price)
        .bind(update.listed)
        .bind(update.collection_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM nfts WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// Buy-now purchase: transfers ownership, delists, and records the sale.
    ///
    /// The NFT row is locked for the read-check-write so two concurrent
    /// purchases cannot both succeed.
    pub async fn purchase(
        &self,
        nft_id: Uuid,
        buyer_id: Uuid,
    ) -> Result<(Nft, Transaction), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let nft = sqlx::query_as::<_, NftRow>(r#"SELECT * FROM nfts WHERE id = $1 FOR UPDATE"#)
            .bind(nft_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::not_found("NFT"))?;

        if !nft.listed {
            return Err(AppError::Conflict("NFT is not listed for sale".into()));
        }
        if nft.owner_id == buyer_id {
            return Err(AppError::Conflict("cannot purchase your own NFT".into()));
        }

        let updated = sqlx::query_as::<_, NftRow>(
            r#"
            UPDATE nfts
            SET owner_id = $2, listed = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(nft_id)
        .bind(buyer_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let ledger_entry = transaction_repository::insert(
            &mut *tx,
            &NewTransaction {
                nft_id,
                seller_id: Some(nft.owner_id),
                buyer_id,
                amount: nft.price,
                kind: TransactionKind::Sale,
            },
        )
        .await?;

        tx.commit().await.map_err(db_err)?;
        Ok((updated.into(), ledger_entry))
    }

    /// Direct transfer to another user, no payment involved.
    pub async fn transfer(
        &self,
        nft_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<(Nft, Transaction), AppError> {
        if sender_id == recipient_id {
            return Err(AppError::Conflict("cannot transfer an NFT to yourself".into()));
        }

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let nft = sqlx::query_as::<_, NftRow>(r#"SELECT * FROM nfts WHERE id = $1 FOR UPDATE"#)
            .bind(nft_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::not_found("NFT"))?;

        if nft.owner_id != sender_id {
            return Err(AppError::Forbidden("only the owner can transfer this NFT".into()));
        }

        let updated = sqlx::query_as::<_, NftRow>(
            r#"
            UPDATE nfts
            SET owner_id = $2, listed = FALSE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(nft_id)
        .bind(recipient_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e {
                if db.is_foreign_key_violation() {
                    return AppError::not_found("Recipient");
                }
            }
            db_err(e)
        })?;

        let ledger_entry = transaction_repository::insert(
            &mut *tx,
            &NewTransaction {
                nft_id,
                seller_id: Some(sender_id),
                buyer_id: recipient_id,
                amount: 0,
                kind: TransactionKind::Transfer,
            },
        )
        .await?;

        tx.commit().await.map_err(db_err)?;
        Ok((updated.into(), ledger_entry))
    }
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &NftFilter) {
    if let Some(collection_id) = filter.collection_id {
        query.push(" AND collection_id = ");
        query.push_bind(collection_id);
    }
    if let Some(owner_id) = filter.owner_id {
        query.push(" AND owner_id = ");
        query.push_bind(owner_id);
    }
    if let Some(listed) = filter.listed {
        query.push(" AND listed = ");
        query.push_bind(listed);
    }
    if let Some(min_price) = filter.min_price {
        query.push(" AND price >= ");
        query.push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ");
        query.push_bind(max_price);
    }
    if let Some(search) = &filter.search {
        query.push(" AND name ILIKE ");
        query.push_bind(like_pattern(search));
        query.push(" ESCAPE '\\'");
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct NftRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    image_url: String,
    attributes: serde_json::Value,
    price: i64,
    listed: bool,
    owner_id: Uuid,
    creator_id: Uuid,
    collection_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NftRow> for Nft {
    fn from(row: NftRow) -> Self {
        Nft {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            attributes: row.attributes,
            price: row.price,
            listed: row.listed,
            owner_id: row.owner_id,
            creator_id: row.creator_id,
            collection_id: row.collection_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
