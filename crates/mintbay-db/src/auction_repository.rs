use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Pool, Postgres};
use uuid::Uuid;

use mintbay_core::auction::{Auction, AuctionStatus, Bid, NewAuction};
use mintbay_core::transaction::{NewTransaction, Transaction, TransactionKind};
use mintbay_core::{AppError, Page, PageParams};

use crate::{conflict_on_unique, db_err, transaction_repository};

/// Repository for auctions and bids.
///
/// Every state transition (bid, settle, cancel) locks the auction row with
/// `SELECT ... FOR UPDATE`, so concurrent requests serialize at the
/// database instead of racing in the handlers.
#[derive(Clone)]
pub struct AuctionRepository {
    pool: Pool<Postgres>,
}

impl AuctionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open an auction on an NFT the seller owns. The NFT is delisted for
    /// the duration so buy-now and auction cannot compete.
    pub async fn create(&self, new: &NewAuction) -> Result<Auction, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let owner: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT owner_id FROM nfts WHERE id = $1 FOR UPDATE"#)
                .bind(new.nft_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_err)?;

        let (owner_id,) = owner.ok_or_else(|| AppError::not_found("NFT"))?;
        if owner_id != new.seller_id {
            return Err(AppError::Forbidden(
                "only the owner can auction this NFT".into(),
            ));
        }

        let row = sqlx::query_as::<_, AuctionRow>(
            r#"
            INSERT INTO auctions (nft_id, seller_id, starting_price, reserve_price,
                                  current_price, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $3, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.nft_id)
        .bind(new.seller_id)
        .bind(new.starting_price)
        .bind(new.reserve_price)
        .bind(new.starts_at)
        .bind(new.ends_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "an active auction already exists for this NFT"))?;

        sqlx::query(r#"UPDATE nfts SET listed = FALSE, updated_at = NOW() WHERE id = $1"#)
            .bind(new.nft_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(row.into())
    }

    /// The live auction for an NFT, if any.
    pub async fn active_for_nft(&self, nft_id: Uuid) -> Result<Option<Auction>, AppError> {
        let row = sqlx::query_as::<_, AuctionRow>(
            r#"SELECT * FROM auctions WHERE nft_id = $1 AND status = 'active'"#,
        )
        .bind(nft_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Auction>, AppError> {
        let row = sqlx::query_as::<_, AuctionRow>(r#"SELECT * FROM auctions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.map(Into::into))
    }

    /// All bids for an auction, newest first.
    pub async fn bids(&self, auction_id: Uuid) -> Result<Vec<Bid>, AppError> {
        let rows = sqlx::query_as::<_, BidRow>(
            r#"SELECT * FROM bids WHERE auction_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(auction_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list(
        &self,
        status: Option<AuctionStatus>,
        params: PageParams,
    ) -> Result<Page<Auction>, AppError> {
        let (total, rows) = if let Some(status) = status {
            let (total,): (i64,) =
                sqlx::query_as(r#"SELECT COUNT(*) FROM auctions WHERE status = $1"#)
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(db_err)?;

            let rows = sqlx::query_as::<_, AuctionRow>(
                r#"
                SELECT * FROM auctions
                WHERE status = $1
                ORDER BY ends_at ASC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(status.as_str())
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

            (total, rows)
        } else {
            let (total,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM auctions"#)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

            let rows = sqlx::query_as::<_, AuctionRow>(
                r#"
                SELECT * FROM auctions
                ORDER BY created_at DESC
                LIMIT $1 OFFSET $2
                "#,
            )
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

    /// Place a bid. The first bid must meet the starting price; later bids
    /// must strictly exceed the current price.
    pub async fn place_bid(
        &self,
        auction_id: Uuid,
        bidder_id: Uuid,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Bid, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let auction = lock_auction(&mut tx, auction_id).await?;
        if auction.seller_id == bidder_id {
            return Err(AppError::Conflict(
                "the seller cannot bid on their own auction".into(),
            ));
        }
        if !auction.is_open(now) {
            return Err(AppError::Conflict("auction is not open for bidding".into()));
        }

        let (bid_count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM bids WHERE auction_id = $1"#)
                .bind(auction_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

        let acceptable = if bid_count == 0 {
            amount >= auction.starting_price
        } else {
            amount > auction.current_price
        };
        if !acceptable {
            return Err(AppError::Conflict(format!(
                "bid of {amount} does not beat the current price of {}",
                auction.current_price
            )));
        }

        let bid = sqlx::query_as::<_, BidRow>(
            r#"
            INSERT INTO bids (auction_id, bidder_id, amount)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(auction_id)
        .bind(bidder_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query(r#"UPDATE auctions SET current_price = $2 WHERE id = $1"#)
            .bind(auction_id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(bid.into())
    }

    /// Settle an ended auction.
    ///
    /// The highest bid meeting the reserve wins: ownership transfers and an
    /// `auction_sale` ledger entry is written. With no qualifying bid the
    /// auction still settles, just without a winner. `force` skips the
    /// end-time check (admin override).
    pub async fn settle(
        &self,
        auction_id: Uuid,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<(Auction, Option<Transaction>), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let auction = lock_auction(&mut tx, auction_id).await?;
        if auction.status != AuctionStatus::Active {
            return Err(AppError::Conflict(format!(
                "auction is already {}",
                auction.status
            )));
        }
        if !force && !auction.has_ended(now) {
            return Err(AppError::Conflict("auction has not ended yet".into()));
        }

        let top_bid: Option<BidRow> = sqlx::query_as(
            r#"
            SELECT * FROM bids
            WHERE auction_id = $1
            ORDER BY amount DESC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(auction_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let winner = top_bid.filter(|bid| match auction.reserve_price {
            Some(reserve) => bid.amount >= reserve,
            None => true,
        });

        let (settled, ledger_entry) = match winner {
            Some(bid) => {
                let settled = sqlx::query_as::<_, AuctionRow>(
                    r#"
                    UPDATE auctions
                    SET status = 'settled', settled_at = $2, winner_id = $3
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(auction_id)
                .bind(now)
                .bind(bid.bidder_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

                sqlx::query(
                    r#"UPDATE nfts SET owner_id = $2, listed = FALSE, updated_at = NOW()
                       WHERE id = $1"#,
                )
                .bind(auction.nft_id)
                .bind(bid.bidder_id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;

                let entry = transaction_repository::insert(
                    &mut *tx,
                    &NewTransaction {
                        nft_id: auction.nft_id,
                        seller_id: Some(auction.seller_id),
                        buyer_id: bid.bidder_id,
                        amount: bid.amount,
                        kind: TransactionKind::AuctionSale,
                    },
                )
                .await?;

                (settled, Some(entry))
            }
            None => {
                let settled = sqlx::query_as::<_, AuctionRow>(
                    r#"
                    UPDATE auctions
                    SET status = 'settled', settled_at = $2
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(auction_id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;

                (settled, None)
            }
        };

        tx.commit().await.map_err(db_err)?;
        Ok((settled.into(), ledger_entry))
    }

    /// Cancel a bidless auction.
    pub async fn cancel(&self, auction_id: Uuid) -> Result<Auction, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let auction = lock_auction(&mut tx, auction_id).await?;
        if auction.status != AuctionStatus::Active {
            return Err(AppError::Conflict(format!(
                "auction is already {}",
                auction.status
            )));
        }

        let (bid_count,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM bids WHERE auction_id = $1"#)
                .bind(auction_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err)?;
        if bid_count > 0 {
            return Err(AppError::Conflict(
                "cannot cancel an auction that has bids".into(),
            ));
        }

        let cancelled = sqlx::query_as::<_, AuctionRow>(
            r#"
            UPDATE auctions
            SET status = 'cancelled'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(auction_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(cancelled.into())
    }
}

async fn lock_auction(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    auction_id: Uuid,
) -> Result<Auction, AppError> {
    let conn: &mut PgConnection = &mut *tx;
    let row = sqlx::query_as::<_, AuctionRow>(r#"SELECT * FROM auctions WHERE id = $1 FOR UPDATE"#)
        .bind(auction_id)
        .fetch_optional(conn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| AppError::not_found("Auction"))?;

    Ok(row.into())
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct AuctionRow {
    id: Uuid,
    nft_id: Uuid,
    seller_id: Uuid,
    starting_price: i64,
    reserve_price: Option<i64>,
    current_price: i64,
    status: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
    winner_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<AuctionRow> for Auction {
    fn from(row: AuctionRow) -> Self {
        Auction {
            id: row.id,
            nft_id: row.nft_id,
            seller_id: row.seller_id,
            starting_price: row.starting_price,
            reserve_price: row.reserve_price,
            current_price: row.current_price,
            status: row.status.parse().unwrap_or(AuctionStatus::Active),
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            settled_at: row.settled_at,
            winner_id: row.winner_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BidRow {
    id: Uuid,
    auction_id: Uuid,
    bidder_id: Uuid,
    amount: i64,
    created_at: DateTime<Utc>,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Bid {
            id: row.id,
            auction_id: row.auction_id,
            bidder_id: row.bidder_id,
            amount: row.amount,
            created_at: row.created_at,
        }
    }
}
