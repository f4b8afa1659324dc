use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{career, entry, subject};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::subject::{
    CreateSubjectRequest, SubjectResponse, UpdateSubjectRequest, validate_create_subject,
    validate_update_subject,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Subjects",
    operation_id = "listSubjects",
    summary = "List subjects",
    responses(
        (status = 200, description = "All subjects, by name", body = Vec<SubjectResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    let subjects = subject::Entity::find()
        .order_by_asc(subject::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Subjects",
    operation_id = "getSubject",
    summary = "Get a subject by ID",
    params(("id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject details", body = SubjectResponse),
        (status = 404, description = "Subject not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubjectResponse>, AppError> {
    let model = find_subject(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Subjects",
    operation_id = "createSubject",
    summary = "Create a subject",
    description = "Requires the `subject:manage` permission.",
    request_body = CreateSubjectRequest,
    responses(
        (status = 200, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Career not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubjectRequest>,
) -> Result<Json<SubjectResponse>, AppError> {
    auth_user.require_permission("subject:manage")?;
    validate_create_subject(&payload)?;

    career::Entity::find_by_id(payload.career_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Career not found".into()))?;

    let model = subject::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        career_id: Set(payload.career_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Subjects",
    operation_id = "updateSubject",
    summary = "Update a subject",
    description = "Requires the `subject:manage` permission. Only provided fields change.",
    params(("id" = i32, Path, description = "Subject ID")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Subject or career not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubjectRequest>,
) -> Result<Json<SubjectResponse>, AppError> {
    auth_user.require_permission("subject:manage")?;
    validate_update_subject(&payload)?;

    if payload == UpdateSubjectRequest::default() {
        let existing = find_subject(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_subject(&txn, id).await?;
    let mut active: subject::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(career_id) = payload.career_id {
        career::Entity::find_by_id(career_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Career not found".into()))?;
        active.career_id = Set(career_id);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Subjects",
    operation_id = "deleteSubject",
    summary = "Delete a subject",
    description = "Requires the `subject:manage` permission. Returns 409 CONFLICT if the \
        subject still has entries.",
    params(("id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = SubjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Subject not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Subject has entries (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubjectResponse>, AppError> {
    auth_user.require_permission("subject:manage")?;

    let txn = state.db.begin().await?;

    let existing = find_subject(&txn, id).await?;

    let entry_count = entry::Entity::find()
        .filter(entry::Column::SubjectId.eq(id))
        .count(&txn)
        .await?;
    if entry_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a subject that still has entries".into(),
        ));
    }

    subject::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(existing.into()))
}

async fn find_subject<C: ConnectionTrait>(db: &C, id: i32) -> Result<subject::Model, AppError> {
    subject::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".into()))
}
