use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use mintbay_core::collection::{CollectionUpdate, NewCollection, slug_from_name};
use mintbay_core::validation::{validate_http_url, validate_name};
use mintbay_core::{AppError, PageParams, Role};

use crate::auth::CurrentUser;
use crate::dto::{
    CollectionListQuery, CollectionListResponse, CollectionResponse, CreateCollectionRequest,
    UpdateCollectionRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/collections",
    params(CollectionListQuery),
    responses(
        (status = 200, description = "Paginated collections", body = CollectionListResponse),
        (status = 400, description = "Invalid parameters", body = crate::dto::ErrorResponse),
    ),
    tag = "collections"
)]
pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CollectionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = PageParams::new(query.page, query.per_page)?;
    let page = state
        .db
        .collection_repo()
        .list(query.search.as_deref(), params)
        .await?;

    Ok(axum::Json(CollectionListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        items: page.items.into_iter().map(CollectionResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name already taken", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "collections"
)]
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name("name", &body.name)?;
    if let Some(banner_url) = &body.banner_url {
        validate_http_url("banner_url", banner_url)?;
    }

    let name = body.name.trim().to_string();
    let slug = slug_from_name(&name);
    if slug.is_empty() {
        return Err(
            AppError::Validation("name must contain at least one letter or digit".into()).into(),
        );
    }

    let collection = state
        .db
        .collection_repo()
        .create(&NewCollection {
            name,
            slug,
            description: body.description,
            banner_url: body.banner_url,
            creator_id: current.id,
        })
        .await?;

    Ok((StatusCode::CREATED, axum::Json(CollectionResponse::from(collection))))
}

#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 200, description = "Collection details", body = CollectionResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "collections"
)]
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .db
        .collection_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Collection"))?;

    Ok(axum::Json(CollectionResponse::from(collection)))
}

#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    request_body = UpdateCollectionRequest,
    responses(
        (status = 200, description = "Updated collection", body = CollectionResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Not the creator", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "collections"
)]
pub async fn update_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<UpdateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .db
        .collection_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Collection"))?;

    if !current.owns_or_meets(collection.creator_id, Role::Admin) {
        return Err(AppError::Forbidden("you do not own this collection".into()).into());
    }

    if let Some(name) = &body.name {
        validate_name("name", name)?;
    }
    if let Some(banner_url) = &body.banner_url {
        validate_http_url("banner_url", banner_url)?;
    }

    let update = CollectionUpdate {
        name: body.name,
        description: body.description,
        banner_url: body.banner_url,
    };
    if update.is_empty() {
        return Err(AppError::Validation("no fields to update".into()).into());
    }

    let updated = state
        .db
        .collection_repo()
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Collection"))?;

    Ok(axum::Json(CollectionResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection ID")),
    responses(
        (status = 204, description = "Collection deleted; NFTs detached"),
        (status = 403, description = "Not the creator", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "collections"
)]
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .db
        .collection_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Collection"))?;

    if !current.owns_or_meets(collection.creator_id, Role::Moderator) {
        return Err(AppError::Forbidden("you do not own this collection".into()).into());
    }

    state.db.collection_repo().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
