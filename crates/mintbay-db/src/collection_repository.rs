use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use mintbay_core::collection::{Collection, CollectionUpdate, NewCollection};
use mintbay_core::{AppError, Page, PageParams};

use crate::{conflict_on_unique, db_err, like_pattern};

/// Repository for collections. Read queries attach a live NFT count.
#[derive(Clone)]
pub struct CollectionRepository {
    pool: Pool<Postgres>,
}

const COLLECTION_SELECT: &str = r#"
    SELECT c.id, c.name, c.slug, c.description, c.banner_url, c.creator_id,
           c.created_at, c.updated_at,
           (SELECT COUNT(*) FROM nfts n WHERE n.collection_id = c.id) AS nft_count
    FROM collections c
"#;

impl CollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewCollection) -> Result<Collection, AppError> {
        let row = sqlx::query_as::<_, CollectionRow>(
            r#"
            INSERT INTO collections (name, slug, description, banner_url, creator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, slug, description, banner_url, creator_id,
                      created_at, updated_at, 0::BIGINT AS nft_count
            "#,
        )
        .bind(&new.name)
        .bind(&new.slug)
        .bind(&new.description)
        .bind(&new.banner_url)
        .bind(new.creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "a collection with this name already exists"))?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Collection>, AppError> {
        let row =
            sqlx::query_as::<_, CollectionRow>(&format!("{COLLECTION_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// Page through collections, optionally filtered by a name substring.
    pub async fn list(
        &self,
        search: Option<&str>,
        params: PageParams,
    ) -> Result<Page<Collection>, AppError> {
        let (total, rows) = if let Some(term) = search {
            let pattern = like_pattern(term);
            let (total,): (i64,) = sqlx::query_as(
                r#"SELECT COUNT(*) FROM collections WHERE name ILIKE $1 ESCAPE '\'"#,
            )
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

            let rows = sqlx::query_as::<_, CollectionRow>(&format!(
                r#"{COLLECTION_SELECT}
                WHERE c.name ILIKE $1 ESCAPE '\'
                ORDER BY c.created_at DESC
                LIMIT $2 OFFSET $3"#
            ))
            .bind(&pattern)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            (total, rows)
        } else {
            let (total,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM collections"#)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

            let rows = sqlx::query_as::<_, CollectionRow>(&format!(
                r#"{COLLECTION_SELECT}
                ORDER BY c.created_at DESC
                LIMIT $1 OFFSET $2"#
            ))
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            (total, rows)
        };

        Ok(Page::new(
            rows.into_iter().map(Into::into).collect(),
            total,
            params,
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: &CollectionUpdate,
    ) -> Result<Option<Collection>, AppError> {
        let updated = sqlx::query(
            r#"
            UPDATE collections
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                banner_url = COALESCE($4, banner_url),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.banner_url)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Delete a collection; attached NFTs are detached by the FK.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(r#"DELETE FROM collections WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CollectionRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    banner_url: Option<String>,
    creator_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    nft_count: i64,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Collection {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            banner_url: row.banner_url,
            creator_id: row.creator_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            nft_count: row.nft_count,
        }
    }
}
