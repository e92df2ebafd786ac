use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mintbay_core::User;
use mintbay_core::auction::{Auction, Bid};
use mintbay_core::collection::Collection;
use mintbay_core::nft::Nft;
use mintbay_core::transaction::{DashboardStats, Transaction};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub user: AccountResponse,
    pub access_token: String,
}

/// The caller's own account, email included.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A public profile; no email, no hash.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.to_string(),
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

// ---------------------------------------------------------------------------
// NFTs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateNftRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Arbitrary trait map; defaults to an empty object.
    pub attributes: Option<serde_json::Value>,
    /// Asking price in minor units.
    pub price: i64,
    /// List for sale immediately (default: false).
    pub listed: Option<bool>,
    pub collection_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateNftRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub price: Option<i64>,
    pub listed: Option<bool>,
    pub collection_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TransferRequest {
    pub recipient_id: Uuid,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NftResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub attributes: serde_json::Value,
    pub price: i64,
    pub listed: bool,
    pub owner_id: Uuid,
    pub creator_id: Uuid,
    pub collection_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Nft> for NftResponse {
    fn from(nft: Nft) -> Self {
        Self {
            id: nft.id,
            name: nft.name,
            description: nft.description,
            image_url: nft.image_url,
            attributes: nft.attributes,
            price: nft.price,
            listed: nft.listed,
            owner_id: nft.owner_id,
            creator_id: nft.creator_id,
            collection_id: nft.collection_id,
            created_at: nft.created_at,
            updated_at: nft.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NftListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub collection_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub listed: Option<bool>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// One of: newest, oldest, price_asc, price_desc.
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NftListResponse {
    pub items: Vec<NftResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PurchaseResponse {
    pub nft: NftResponse,
    pub transaction: TransactionResponse,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner_url: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CollectionResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub creator_id: Uuid,
    pub nft_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Collection> for CollectionResponse {
    fn from(collection: Collection) -> Self {
        Self {
            id: collection.id,
            name: collection.name,
            slug: collection.slug,
            description: collection.description,
            banner_url: collection.banner_url,
            creator_id: collection.creator_id,
            nft_count: collection.nft_count,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CollectionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CollectionListResponse {
    pub items: Vec<CollectionResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// ---------------------------------------------------------------------------
// Auctions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateAuctionRequest {
    pub nft_id: Uuid,
    /// Minimum first bid, minor units.
    pub starting_price: i64,
    /// Optional floor the winning bid must meet.
    pub reserve_price: Option<i64>,
    /// Defaults to now.
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlaceBidRequest {
    pub amount: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuctionResponse {
    pub id: Uuid,
    pub nft_id: Uuid,
    pub seller_id: Uuid,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub current_price: i64,
    pub status: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub winner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Auction> for AuctionResponse {
    fn from(auction: Auction) -> Self {
        Self {
            id: auction.id,
            nft_id: auction.nft_id,
            seller_id: auction.seller_id,
            starting_price: auction.starting_price,
            reserve_price: auction.reserve_price,
            current_price: auction.current_price,
            status: auction.status.to_string(),
            starts_at: auction.starts_at,
            ends_at: auction.ends_at,
            settled_at: auction.settled_at,
            winner_id: auction.winner_id,
            created_at: auction.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BidResponse {
    pub id: Uuid,
    pub auction_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Bid> for BidResponse {
    fn from(bid: Bid) -> Self {
        Self {
            id: bid.id,
            auction_id: bid.auction_id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            created_at: bid.created_at,
        }
    }
}

/// A single auction with its bid history, newest bid first.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuctionDetailResponse {
    #[serde(flatten)]
    pub auction: AuctionResponse,
    pub bids: Vec<BidResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SettleResponse {
    pub auction: AuctionResponse,
    /// Present when a qualifying bid won the auction.
    pub transaction: Option<TransactionResponse>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AuctionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// One of: active, settled, cancelled.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuctionListResponse {
    pub items: Vec<AuctionResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub nft_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub buyer_id: Uuid,
    pub amount: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            nft_id: tx.nft_id,
            seller_id: tx.seller_id,
            buyer_id: tx.buyer_id,
            amount: tx.amount,
            kind: tx.kind.to_string(),
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TransactionListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// One of: mint, sale, transfer, auction_sale.
    pub kind: Option<String>,
    /// Admins may inspect another user's history.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TransactionListResponse {
    pub items: Vec<TransactionResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub total_users: i64,
    pub total_nfts: i64,
    pub total_collections: i64,
    pub active_auctions: i64,
    pub total_transactions: i64,
    pub sale_volume: i64,
    pub new_users_7d: i64,
    pub sales_7d: i64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_nfts: stats.total_nfts,
            total_collections: stats.total_collections,
            active_auctions: stats.active_auctions,
            total_transactions: stats.total_transactions,
            sale_volume: stats.sale_volume,
            new_users_7d: stats.new_users_7d,
            sales_7d: stats.sales_7d,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AdminUserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminUserListResponse {
    pub items: Vec<AccountResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    /// One of: user, moderator, admin.
    pub role: String,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
