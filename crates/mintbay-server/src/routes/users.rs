use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use uuid::Uuid;

use mintbay_core::AppError;
use mintbay_core::user::ProfileUpdate;
use mintbay_core::validation::validate_http_url;

use crate::auth::CurrentUser;
use crate::dto::{AccountResponse, UpdateProfileRequest, UserResponse};
use crate::error::ApiError;
use crate::state::AppState;

const DISPLAY_NAME_MAX: usize = 64;
const BIO_MAX: usize = 1000;

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = UserResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(axum::Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    axum::Json(body): axum::Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(display_name) = &body.display_name {
        if display_name.trim().is_empty() || display_name.len() > DISPLAY_NAME_MAX {
            return Err(AppError::Validation(format!(
                "display_name must be 1-{DISPLAY_NAME_MAX} characters"
            ))
            .into());
        }
    }
    if let Some(bio) = &body.bio {
        if bio.len() > BIO_MAX {
            return Err(
                AppError::Validation(format!("bio must be at most {BIO_MAX} characters")).into(),
            );
        }
    }
    if let Some(avatar_url) = &body.avatar_url {
        validate_http_url("avatar_url", avatar_url)?;
    }

    let update = ProfileUpdate {
        display_name: body.display_name,
        bio: body.bio,
        avatar_url: body.avatar_url,
    };
    if update.is_empty() {
        return Err(AppError::Validation("no fields to update".into()).into());
    }

    let user = state
        .db
        .user_repo()
        .update_profile(current.id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(axum::Json(AccountResponse::from(user)))
}
