use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A marketplace item. Prices are integer minor units (never floats).
#[derive(Debug, Clone)]
pub struct Nft {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Arbitrary trait map (e.g. {"background": "gold", "rarity": "legendary"}).
    pub attributes: serde_json::Value,
    pub price: i64,
    pub listed: bool,
    pub owner_id: Uuid,
    pub creator_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for minting. Owner and creator start out identical.
#[derive(Debug, Clone)]
pub struct NewNft {
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub attributes: serde_json::Value,
    pub price: i64,
    pub listed: bool,
    pub creator_id: Uuid,
    pub collection_id: Option<Uuid>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct NftUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub price: Option<i64>,
    pub listed: Option<bool>,
    pub collection_id: Option<Uuid>,
}

impl NftUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.attributes.is_none()
            && self.price.is_none()
            && self.listed.is_none()
            && self.collection_id.is_none()
    }

    /// True if the update touches anything beyond the listing flag.
    ///
    /// Moderators may delist an item but not rewrite it.
    pub fn is_delist_only(&self) -> bool {
        self.listed == Some(false)
            && self.name.is_none()
            && self.description.is_none()
            && self.image_url.is_none()
            && self.attributes.is_none()
            && self.price.is_none()
            && self.collection_id.is_none()
    }
}

/// Sort order for NFT listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NftSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
}

impl FromStr for NftSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(NftSort::Newest),
            "oldest" => Ok(NftSort::Oldest),
            "price_asc" => Ok(NftSort::PriceAsc),
            "price_desc" => Ok(NftSort::PriceDesc),
            other => Err(format!("Unknown sort order: {other}")),
        }
    }
}

/// Filter set for NFT listings; all fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct NftFilter {
    pub collection_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub listed: Option<bool>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub sort: NftSort,
}
