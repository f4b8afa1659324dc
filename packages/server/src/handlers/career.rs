use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{career, subject};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::career::{CareerResponse, CreateCareerRequest, validate_create_career};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Careers",
    operation_id = "listCareers",
    summary = "List careers",
    responses(
        (status = 200, description = "All careers, by name", body = Vec<CareerResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_careers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CareerResponse>>, AppError> {
    let careers = career::Entity::find()
        .order_by_asc(career::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(careers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Careers",
    operation_id = "getCareer",
    summary = "Get a career by ID",
    params(("id" = i32, Path, description = "Career ID")),
    responses(
        (status = 200, description = "Career details", body = CareerResponse),
        (status = 404, description = "Career not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_career(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CareerResponse>, AppError> {
    let model = find_career(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Careers",
    operation_id = "createCareer",
    summary = "Create a career",
    description = "Requires the `career:manage` permission.",
    request_body = CreateCareerRequest,
    responses(
        (status = 200, description = "Career created", body = CareerResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 409, description = "Name already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_career(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCareerRequest>,
) -> Result<Json<CareerResponse>, AppError> {
    auth_user.require_permission("career:manage")?;
    validate_create_career(&payload)?;

    let model = career::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A career with this name already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Careers",
    operation_id = "deleteCareer",
    summary = "Delete a career",
    description = "Requires the `career:manage` permission. Returns 409 CONFLICT if the \
        career still has subjects.",
    params(("id" = i32, Path, description = "Career ID")),
    responses(
        (status = 200, description = "Career deleted", body = CareerResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Career not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Career has subjects (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_career(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CareerResponse>, AppError> {
    auth_user.require_permission("career:manage")?;

    let txn = state.db.begin().await?;

    let existing = find_career(&txn, id).await?;

    let subject_count = subject::Entity::find()
        .filter(subject::Column::CareerId.eq(id))
        .count(&txn)
        .await?;
    if subject_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a career that still has subjects".into(),
        ));
    }

    career::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(existing.into()))
}

async fn find_career<C: ConnectionTrait>(db: &C, id: i32) -> Result<career::Model, AppError> {
    career::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Career not found".into()))
}
