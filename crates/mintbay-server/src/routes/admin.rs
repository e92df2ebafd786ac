use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use mintbay_core::{AppError, PageParams, Role};

use crate::auth::CurrentUser;
use crate::dto::{
    AccountResponse, AdminUserListQuery, AdminUserListResponse, DashboardResponse, SetRoleRequest,
};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Marketplace aggregates", body = DashboardResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Moderator role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .stats_cache
        .try_get_with("dashboard", async { state.db.stats_repo().dashboard().await })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(axum::Json(DashboardResponse::from(stats)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(AdminUserListQuery),
    responses(
        (status = 200, description = "Paginated accounts with emails", body = AdminUserListResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AdminUserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = PageParams::new(query.page, query.per_page)?;
    let page = state.db.user_repo().list(params).await?;

    Ok(axum::Json(AdminUserListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        items: page.items.into_iter().map(AccountResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Unknown role", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Cannot change own role", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn set_role(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<SetRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role: Role = body.role.parse().map_err(AppError::Validation)?;

    // Role changes always target another account.
    if id == current.id {
        return Err(AppError::Conflict("cannot change your own role".into()).into());
    }

    let user = state
        .db
        .user_repo()
        .set_role(id, role)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    tracing::info!(user_id = %id, role = %role, changed_by = %current.id, "role changed");

    Ok(axum::Json(AccountResponse::from(user)))
}
