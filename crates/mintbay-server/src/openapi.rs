use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mintbay API",
        version = "0.1.0",
        description = "NFT marketplace: accounts, listings, collections, auctions, and admin."
    ),
    paths(
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::users::get_user,
        crate::routes::users::update_me,
        crate::routes::nfts::list_nfts,
        crate::routes::nfts::create_nft,
        crate::routes::nfts::get_nft,
        crate::routes::nfts::update_nft,
        crate::routes::nfts::delete_nft,
        crate::routes::nfts::purchase_nft,
        crate::routes::nfts::transfer_nft,
        crate::routes::collections::list_collections,
        crate::routes::collections::create_collection,
        crate::routes::collections::get_collection,
        crate::routes::collections::update_collection,
        crate::routes::collections::delete_collection,
        crate::routes::auctions::list_auctions,
        crate::routes::auctions::create_auction,
        crate::routes::auctions::get_auction,
        crate::routes::auctions::place_bid,
        crate::routes::auctions::settle_auction,
        crate::routes::auctions::cancel_auction,
        crate::routes::transactions::list_transactions,
        crate::routes::admin::dashboard,
        crate::routes::admin::list_users,
        crate::routes::admin::set_role,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::RegisterRequest,
        crate::dto::LoginRequest,
        crate::dto::AuthResponse,
        crate::dto::AccountResponse,
        crate::dto::UserResponse,
        crate::dto::UpdateProfileRequest,
        crate::dto::CreateNftRequest,
        crate::dto::UpdateNftRequest,
        crate::dto::TransferRequest,
        crate::dto::NftResponse,
        crate::dto::NftListResponse,
        crate::dto::PurchaseResponse,
        crate::dto::CreateCollectionRequest,
        crate::dto::UpdateCollectionRequest,
        crate::dto::CollectionResponse,
        crate::dto::CollectionListResponse,
        crate::dto::CreateAuctionRequest,
        crate::dto::PlaceBidRequest,
        crate::dto::AuctionResponse,
        crate::dto::AuctionDetailResponse,
        crate::dto::AuctionListResponse,
        crate::dto::BidResponse,
        crate::dto::SettleResponse,
        crate::dto::TransactionResponse,
        crate::dto::TransactionListResponse,
        crate::dto::DashboardResponse,
        crate::dto::AdminUserListResponse,
        crate::dto::SetRoleRequest,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session management"),
        (name = "users", description = "Public profiles"),
        (name = "nfts", description = "Minting, listings, purchases, transfers"),
        (name = "collections", description = "NFT groupings"),
        (name = "auctions", description = "Timed sales and bidding"),
        (name = "transactions", description = "Ownership-change ledger"),
        (name = "admin", description = "Dashboard and account administration"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from /api/auth/login; also accepted as the \
                             access-token cookie.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
