use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How an NFT changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Creation; no seller, zero amount.
    Mint,
    /// Buy-now purchase of a listed NFT.
    Sale,
    /// Direct owner-to-owner transfer, zero amount.
    Transfer,
    /// Settlement of a won auction.
    AuctionSale,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Mint => "mint",
            TransactionKind::Sale => "sale",
            TransactionKind::Transfer => "transfer",
            TransactionKind::AuctionSale => "auction_sale",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mint" => Ok(TransactionKind::Mint),
            "sale" => Ok(TransactionKind::Sale),
            "transfer" => Ok(TransactionKind::Transfer),
            "auction_sale" => Ok(TransactionKind::AuctionSale),
            other => Err(format!("Unknown transaction kind: {other}")),
        }
    }
}

/// Immutable record of an ownership change.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub nft_id: Uuid,
    /// None for mints.
    pub seller_id: Option<Uuid>,
    pub buyer_id: Uuid,
    pub amount: i64,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub nft_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub buyer_id: Uuid,
    pub amount: i64,
    pub kind: TransactionKind,
}

/// Aggregate numbers for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_nfts: i64,
    pub total_collections: i64,
    pub active_auctions: i64,
    pub total_transactions: i64,
    /// Sum of sale and auction_sale amounts, minor units.
    pub sale_volume: i64,
    pub new_users_7d: i64,
    pub sales_7d: i64,
}
