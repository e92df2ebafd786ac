use std::sync::Arc;

use axum::Extension;
use axum::extract::{Query, State};
use axum::response::IntoResponse;

use mintbay_core::{AppError, PageParams, Role};

use crate::auth::CurrentUser;
use crate::dto::{TransactionListQuery, TransactionListResponse, TransactionResponse};
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "Paginated transaction history", body = TransactionListResponse),
        (status = 400, description = "Invalid parameters", body = crate::dto::ErrorResponse),
        (status = 403, description = "Cannot inspect other users", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<TransactionListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let params = PageParams::new(query.page, query.per_page)?;
    let kind = query
        .kind
        .map(|k| k.parse().map_err(AppError::Validation))
        .transpose()?;

    // Regular users see their own history; admins may inspect anyone's.
    let user_id = match query.user_id {
        Some(target) if target != current.id => {
            if !current.role.meets(Role::Admin) {
                return Err(AppError::Forbidden(
                    "cannot view another user's transactions".into(),
                )
                .into());
            }
            target
        }
        _ => current.id,
    };

    let page = state
        .db
        .transaction_repo()
        .list_for_user(user_id, kind, params)
        .await?;

    Ok(axum::Json(TransactionListResponse {
        total: page.total,
        page: page.page,
        per_page: page.per_page,
        items: page.items.into_iter().map(TransactionResponse::from).collect(),
    }))
}
