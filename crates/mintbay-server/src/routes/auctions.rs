use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use uuid::Uuid;

use mintbay_core::auction::NewAuction;
use mintbay_core::validation::validate_price;
use mintbay_core::{AppError, PageParams, Role};

use crate::auth::CurrentUser;
use crate::dto::{
    AuctionDetailResponse, AuctionListQuery, AuctionListResponse, AuctionResponse, BidResponse,
    CreateAuctionRequest, PlaceBidRequest, SettleResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/auctions",
    params(AuctionListQuery),
    responses(
        (status = 200, description = "Paginated auctions", body = AuctionListResponse),
        (status = 400, description = "Invalid parameters", body = crate::dto::ErrorResponse),
    ),
    tag = "auctions"
)]
pub async fn list_auctions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuctionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = PageParams::new(query.page, query.per_page)?;
    let status = query
        .status
        .map(|s| s.parse().map_err(AppError::Validation))
        .transpose()?;

    let page = state.db.auction_repo().list(status, params).await?;

    Ok(axum::Json(AuctionListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        items: page.items.into_iter().map(AuctionResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auctions",
    request_body = CreateAuctionRequest,
    responses(
        (status = 201, description = "Auction opened", body = AuctionResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::dto::ErrorResponse),
        (status = 404, description = "NFT not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Active auction exists", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auctions"
)]
pub async fn create_auction(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<CreateAuctionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_price("starting_price", body.starting_price)?;
    if let Some(reserve) = body.reserve_price {
        if reserve < body.starting_price {
            return Err(AppError::Validation(
                "reserve_price must be at least the starting price".into(),
            )
            .into());
        }
    }

    let now = Utc::now();
    let starts_at = body.starts_at.unwrap_or(now);
    if body.ends_at <= starts_at {
        return Err(AppError::Validation("ends_at must be after starts_at".into()).into());
    }
    if body.ends_at <= now {
        return Err(AppError::Validation("ends_at must be in the future".into()).into());
    }

    let auction = state
        .db
        .auction_repo()
        .create(&NewAuction {
            nft_id: body.nft_id,
            seller_id: current.id,
            starting_price: body.starting_price,
            reserve_price: body.reserve_price,
            starts_at,
            ends_at: body.ends_at,
        })
        .await?;

    Ok((StatusCode::CREATED, axum::Json(AuctionResponse::from(auction))))
}

#[utoipa::path(
    get,
    path = "/api/auctions/{id}",
    params(("id" = Uuid, Path, description = "Auction ID")),
    responses(
        (status = 200, description = "Auction with bids", body = AuctionDetailResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "auctions"
)]
pub async fn get_auction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let auctions = state.db.auction_repo();
    let auction = auctions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction"))?;
    let bids = auctions.bids(id).await?;

    Ok(axum::Json(AuctionDetailResponse {
        auction: auction.into(),
        bids: bids.into_iter().map(BidResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auctions/{id}/bids",
    params(("id" = Uuid, Path, description = "Auction ID")),
    request_body = PlaceBidRequest,
    responses(
        (status = 201, description = "Bid accepted", body = BidResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Bid too low or auction closed", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auctions"
)]
pub async fn place_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<PlaceBidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_price("amount", body.amount)?;

    let bid = state
        .db
        .auction_repo()
        .place_bid(id, current.id, body.amount, Utc::now())
        .await?;

    tracing::info!(auction_id = %id, bidder_id = %current.id, amount = body.amount, "bid placed");

    Ok((StatusCode::CREATED, axum::Json(BidResponse::from(bid))))
}

#[utoipa::path(
    post,
    path = "/api/auctions/{id}/settle",
    params(("id" = Uuid, Path, description = "Auction ID")),
    responses(
        (status = 200, description = "Auction settled", body = SettleResponse),
        (status = 403, description = "Not the seller", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Not ended or already settled", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auctions"
)]
pub async fn settle_auction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let auctions = state.db.auction_repo();
    let auction = auctions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction"))?;

    let is_admin = current.role.meets(Role::Admin);
    if auction.seller_id != current.id && !is_admin {
        return Err(AppError::Forbidden("only the seller can settle this auction".into()).into());
    }

    // Admins may force-settle before the end time.
    let (settled, transaction) = auctions.settle(id, Utc::now(), is_admin).await?;

    Ok(axum::Json(SettleResponse {
        auction: settled.into(),
        transaction: transaction.map(Into::into),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/auctions/{id}",
    params(("id" = Uuid, Path, description = "Auction ID")),
    responses(
        (status = 200, description = "Auction cancelled", body = AuctionResponse),
        (status = 403, description = "Not the seller", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Auction has bids", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auctions"
)]
pub async fn cancel_auction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let auctions = state.db.auction_repo();
    let auction = auctions
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Auction"))?;

    if !current.owns_or_meets(auction.seller_id, Role::Moderator) {
        return Err(AppError::Forbidden("only the seller can cancel this auction".into()).into());
    }

    let cancelled = auctions.cancel(id).await?;
    Ok(axum::Json(AuctionResponse::from(cancelled)))
}
