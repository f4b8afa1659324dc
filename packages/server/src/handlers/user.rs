use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::models::user::UserProfileResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUserProfile",
    summary = "Get a user's public profile",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Public profile", body = UserProfileResponse),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user = user::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}
