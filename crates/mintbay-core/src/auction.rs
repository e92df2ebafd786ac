use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lifecycle of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionStatus {
    Active,
    Settled,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Active => "active",
            AuctionStatus::Settled => "settled",
            AuctionStatus::Cancelled => "cancelled",
        }
    }

    /// True once the auction can no longer accept bids or be cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Settled | AuctionStatus::Cancelled)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AuctionStatus::Active),
            "settled" => Ok(AuctionStatus::Settled),
            "cancelled" => Ok(AuctionStatus::Cancelled),
            other => Err(format!("Unknown auction status: {other}")),
        }
    }
}

/// A timed sale of a single NFT.
///
/// `current_price` starts at `starting_price` and tracks the highest bid.
/// An optional `reserve_price` must be met for settlement to name a winner.
#[derive(Debug, Clone)]
pub struct Auction {
    pub id: Uuid,
    pub nft_id: Uuid,
    pub seller_id: Uuid,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub current_price: i64,
    pub status: AuctionStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Auction {
    /// True while bids are accepted: active status and inside the window.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.status == AuctionStatus::Active && now >= self.starts_at && now < self.ends_at
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at
    }
}

#[derive(Debug, Clone)]
pub struct NewAuction {
    pub nft_id: Uuid,
    pub seller_id: Uuid,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// A single bid on an auction.
#[derive(Debug, Clone)]
pub struct Bid {
    pub id: Uuid,
    pub auction_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}
