use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::vote;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::vote::{
    CastVoteRequest, CastVoteResponse, Polarity, ScoreResponse, VoteOutcome,
};
use crate::state::AppState;
use crate::utils::score::{comment_count_of, score_of};

use super::entry::find_entry;

#[utoipa::path(
    post,
    path = "/{id}/vote",
    tag = "Votes",
    operation_id = "castVote",
    summary = "Cast, toggle or flip a vote on an entry",
    description = "First vote by a user creates it; repeating the same polarity removes \
        it (toggle-off); the opposite polarity overwrites it in place (flip). Voting on \
        your own entry is forbidden. The response reports what happened and the entry's \
        aggregate after the operation.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Vote processed", body = CastVoteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Self-vote (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(entry_id, user_id = auth_user.user_id))]
pub async fn cast_vote(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<i32>,
    AppJson(payload): AppJson<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, AppError> {
    let entry = find_entry(&state.db, entry_id).await?;

    if entry.author_id == auth_user.user_id {
        return Err(AppError::Forbidden(
            "You cannot vote on your own content".into(),
        ));
    }

    let existing = vote::Entity::find_by_id((entry_id, auth_user.user_id))
        .one(&state.db)
        .await?;

    let outcome = match existing {
        None => {
            match insert_vote(&state.db, entry_id, auth_user.user_id, payload.polarity).await {
                Ok(outcome) => outcome,
                // A concurrent first vote won the insert race; the composite
                // primary key rejected ours. Retry against the winner's row.
                Err(AppError::Conflict(_)) => {
                    tracing::debug!("Vote insert race: primary key caught duplicate");
                    let winner = vote::Entity::find_by_id((entry_id, auth_user.user_id))
                        .one(&state.db)
                        .await?
                        .ok_or_else(|| {
                            AppError::Internal("vote missing after unique violation".into())
                        })?;
                    resolve_existing(&state.db, winner, payload.polarity).await?
                }
                Err(e) => return Err(e),
            }
        }
        Some(existing) => resolve_existing(&state.db, existing, payload.polarity).await?,
    };

    let score = score_of(&state.db, entry_id).await?;

    Ok(Json(CastVoteResponse { outcome, score }))
}

#[utoipa::path(
    get,
    path = "/{id}/score",
    tag = "Votes",
    operation_id = "getScore",
    summary = "Get an entry's vote aggregate",
    description = "Counts live vote rows at read time; no denormalized counters exist.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Vote aggregate", body = ScoreResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(entry_id))]
pub async fn get_score(
    State(state): State<AppState>,
    Path(entry_id): Path<i32>,
) -> Result<Json<ScoreResponse>, AppError> {
    find_entry(&state.db, entry_id).await?;

    let score = score_of(&state.db, entry_id).await?;
    let comment_count = comment_count_of(&state.db, entry_id).await?;

    Ok(Json(ScoreResponse {
        entry_id,
        upvotes: score.upvotes,
        downvotes: score.downvotes,
        comment_count,
    }))
}

/// Insert the first vote for a pair. A duplicate-key failure is reported as
/// `Conflict` so the caller can fall back to the existing-row path.
async fn insert_vote(
    db: &DatabaseConnection,
    entry_id: i32,
    user_id: i32,
    polarity: Polarity,
) -> Result<VoteOutcome, AppError> {
    let new_vote = vote::ActiveModel {
        entry_id: Set(entry_id),
        user_id: Set(user_id),
        polarity: Set(polarity.as_str().to_string()),
        created_at: Set(Utc::now()),
    };

    new_vote.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("vote already exists".into())
        }
        _ => AppError::from(e),
    })?;

    Ok(VoteOutcome::Created)
}

/// Apply the repeat-vote rules to an existing row: same polarity toggles the
/// vote off, the opposite flips it in place. The row is never duplicated.
async fn resolve_existing(
    db: &DatabaseConnection,
    existing: vote::Model,
    polarity: Polarity,
) -> Result<VoteOutcome, AppError> {
    let current = Polarity::parse(&existing.polarity)?;

    if current == polarity {
        vote::Entity::delete_by_id((existing.entry_id, existing.user_id))
            .exec(db)
            .await?;
        Ok(VoteOutcome::Removed)
    } else {
        let mut active: vote::ActiveModel = existing.into();
        active.polarity = Set(polarity.as_str().to_string());
        active.update(db).await?;
        Ok(VoteOutcome::Updated)
    }
}
