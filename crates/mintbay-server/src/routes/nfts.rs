use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use mintbay_core::nft::{NewNft, NftFilter, NftUpdate};
use mintbay_core::validation::{validate_http_url, validate_name, validate_price};
use mintbay_core::{AppError, PageParams, Role};

use crate::auth::CurrentUser;
use crate::dto::{
    CreateNftRequest, NftListQuery, NftListResponse, NftResponse, PurchaseResponse,
    TransferRequest, UpdateNftRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/nfts",
    params(NftListQuery),
    responses(
        (status = 200, description = "Paginated NFTs", body = NftListResponse),
        (status = 400, description = "Invalid parameters", body = crate::dto::ErrorResponse),
    ),
    tag = "nfts"
)]
pub async fn list_nfts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NftListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = PageParams::new(query.page, query.per_page)?;
    let sort = query
        .sort
        .map(|s| s.parse().map_err(AppError::Validation))
        .transpose()?
        .unwrap_or_default();

    let filter = NftFilter {
        collection_id: query.collection_id,
        owner_id: query.owner_id,
        listed: query.listed,
        min_price: query.min_price,
        max_price: query.max_price,
        search: query.search,
        sort,
    };

    let page = state.db.nft_repo().list(&filter, params).await?;

    Ok(axum::Json(NftListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        items: page.items.into_iter().map(NftResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/nfts",
    request_body = CreateNftRequest,
    responses(
        (status = 201, description = "NFT minted", body = NftResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 404, description = "Collection not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "nfts"
)]
pub async fn create_nft(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<CreateNftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name("name", &body.name)?;
    validate_price("price", body.price)?;
    validate_http_url("image_url", &body.image_url)?;

    let attributes = body.attributes.unwrap_or_else(|| serde_json::json!({}));
    if !attributes.is_object() {
        return Err(AppError::Validation("attributes must be a JSON object".into()).into());
    }

    // Minting into a collection is reserved for its creator.
    if let Some(collection_id) = body.collection_id {
        let collection = state
            .db
            .collection_repo()
            .find_by_id(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Collection"))?;
        if collection.creator_id != current.id && !current.role.meets(Role::Admin) {
            return Err(AppError::Forbidden(
                "only the collection creator can mint into it".into(),
            )
            .into());
        }
    }

    let nft = state
        .db
        .nft_repo()
        .create(&NewNft {
            name: body.name.trim().to_string(),
            description: body.description,
            image_url: body.image_url,
            attributes,
            price: body.price,
            listed: body.listed.unwrap_or(false),
            creator_id: current.id,
            collection_id: body.collection_id,
        })
        .await?;

    Ok((StatusCode::CREATED, axum::Json(NftResponse::from(nft))))
}

#[utoipa::path(
    get,
    path = "/api/nfts/{id}",
    params(("id" = Uuid, Path, description = "NFT ID")),
    responses(
        (status = 200, description = "NFT details", body = NftResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "nfts"
)]
pub async fn get_nft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let nft = state
        .db
        .nft_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT"))?;

    Ok(axum::Json(NftResponse::from(nft)))
}

#[utoipa::path(
    put,
    path = "/api/nfts/{id}",
    params(("id" = Uuid, Path, description = "NFT ID")),
    request_body = UpdateNftRequest,
    responses(
        (status = 200, description = "Updated NFT", body = NftResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "NFT is under auction", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "nfts"
)]
pub async fn update_nft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<UpdateNftRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nft = state
        .db
        .nft_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT"))?;

    let update = NftUpdate {
        name: body.name,
        description: body.description,
        image_url: body.image_url,
        attributes: body.attributes,
        price: body.price,
        listed: body.listed,
        collection_id: body.collection_id,
    };
    if update.is_empty() {
        return Err(AppError::Validation("no fields to update".into()).into());
    }

    // Owners and admins may edit freely; moderators may only delist.
    let allowed = current.owns_or_meets(nft.owner_id, Role::Admin)
        || (current.role.meets(Role::Moderator) && update.is_delist_only());
    if !allowed {
        return Err(AppError::Forbidden("you do not own this NFT".into()).into());
    }

    if let Some(name) = &update.name {
        validate_name("name", name)?;
    }
    if let Some(price) = update.price {
        validate_price("price", price)?;
    }
    if let Some(image_url) = &update.image_url {
        validate_http_url("image_url", image_url)?;
    }
    if let Some(attributes) = &update.attributes {
        if !attributes.is_object() {
            return Err(AppError::Validation("attributes must be a JSON object".into()).into());
        }
    }

    // Moving an NFT into a collection is reserved for the collection's
    // creator, same as minting into it.
    if let Some(collection_id) = update.collection_id {
        let collection = state
            .db
            .collection_repo()
            .find_by_id(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found("Collection"))?;
        if collection.creator_id != current.id && !current.role.meets(Role::Admin) {
            return Err(AppError::Forbidden(
                "only the collection creator can add to it".into(),
            )
            .into());
        }
    }

    // Listing state is frozen while an auction is live.
    if update.listed == Some(true)
        && state.db.auction_repo().active_for_nft(id).await?.is_some()
    {
        return Err(AppError::Conflict("NFT has an active auction".into()).into());
    }

    let updated = state
        .db
        .nft_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("NFT"))?;

    Ok(axum::Json(NftResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/nfts/{id}",
    params(("id" = Uuid, Path, description = "NFT ID")),
    responses(
        (status = 204, description = "NFT deleted"),
        (status = 403, description = "Not the owner", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "NFT is under auction", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "nfts"
)]
pub async fn delete_nft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let nft = state
        .db
        .nft_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("NFT"))?;

    if !current.owns_or_meets(nft.owner_id, Role::Moderator) {
        return Err(AppError::Forbidden("you do not own this NFT".into()).into());
    }

    if state.db.auction_repo().active_for_nft(id).await?.is_some() {
        return Err(AppError::Conflict("NFT has an active auction".into()).into());
    }

    state.db.nft_repo().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/nfts/{id}/purchase",
    params(("id" = Uuid, Path, description = "NFT ID")),
    responses(
        (status = 200, description = "Purchase complete", body = PurchaseResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Not listed, or own NFT", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "nfts"
)]
pub async fn purchase_nft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let (nft, transaction) = state.db.nft_repo().purchase(id, current.id).await?;

    tracing::info!(nft_id = %id, buyer_id = %current.id, amount = transaction.amount, "purchase");

    Ok(axum::Json(PurchaseResponse {
        nft: nft.into(),
        transaction: transaction.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/nfts/{id}/transfer",
    params(("id" = Uuid, Path, description = "NFT ID")),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer complete", body = PurchaseResponse),
        (status = 403, description = "Not the owner", body = crate::dto::ErrorResponse),
        (status = 404, description = "NFT or recipient not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Transfer to self, or under auction", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "nfts"
)]
pub async fn transfer_nft(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<TransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.auction_repo().active_for_nft(id).await?.is_some() {
        return Err(AppError::Conflict("NFT has an active auction".into()).into());
    }

    let (nft, transaction) = state
        .db
        .nft_repo()
        .transfer(id, current.id, body.recipient_id)
        .await?;

    Ok(axum::Json(PurchaseResponse {
        nft: nft.into(),
        transaction: transaction.into(),
    }))
}
