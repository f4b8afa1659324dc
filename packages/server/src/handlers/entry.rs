use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{entry, entry_file, stored_file, subject, user, vote};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::entry::*;
use crate::state::AppState;
use crate::utils::score::{comment_count_of, score_of};

#[utoipa::path(
    post,
    path = "/",
    tag = "Posts",
    operation_id = "createEntry",
    summary = "Create a post or a comment",
    description = "Creates a new entry. `parent_id` 0 (or absent) makes a root post, which \
        requires a title and a subject; a root entry's id makes a comment, which inherits \
        the parent's subject and carries no title. Comments on comments are rejected — \
        threads are exactly one level deep. An optional base64 `attachment` is stored and \
        linked to the entry.",
    request_body = CreateEntryRequest,
    responses(
        (status = 200, description = "Entry created", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Parent or subject not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    validate_create_entry(&payload, &state.config.content)?;

    let (subject_id, title) = if payload.parent_id == entry::ROOT_PARENT {
        let subject_id = payload
            .subject_id
            .ok_or_else(|| AppError::Validation("Root posts require a subject_id".into()))?;
        find_subject(&state.db, subject_id).await?;
        let title = payload.title.as_deref().map(|t| t.trim().to_string());
        (subject_id, title)
    } else {
        let parent = entry::Entity::find_by_id(payload.parent_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Parent entry not found".into()))?;
        if !parent.is_root() {
            return Err(AppError::Validation(
                "Comments can only reply to root posts".into(),
            ));
        }
        // Comments inherit the parent's subject and never carry a title.
        (parent.subject_id, None)
    };

    let stored = match payload.attachment {
        Some(ref attachment) => Some(store_attachment(&state, attachment).await?),
        None => None,
    };

    let now = Utc::now();
    let new_entry = entry::ActiveModel {
        author_id: Set(auth_user.user_id),
        subject_id: Set(subject_id),
        parent_id: Set(payload.parent_id),
        title: Set(title),
        body: Set(payload.body),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = async {
        let txn = state.db.begin().await?;
        let model = new_entry.insert(&txn).await?;

        if let Some(ref stored) = stored {
            let file = stored_file::ActiveModel {
                key: Set(stored.upload.key.clone()),
                url: Set(state.file_url(&stored.upload.key)),
                category: Set(stored.category.clone()),
                filename: Set(stored.filename.clone()),
                content_type: Set(mime_guess::from_path(&stored.filename)
                    .first()
                    .map(|m| m.to_string())),
                size: Set(stored.upload.size as i64),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;

            entry_file::ActiveModel {
                entry_id: Set(model.id),
                file_id: Set(file.id),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(model)
    }
    .await;

    match result {
        Ok(model) => Ok(Json(EntryResponse::from(model))),
        Err(e) => {
            // The stored bytes cannot join the DB transaction; compensate.
            if let Some(stored) = stored {
                let _ = state.files.delete(&stored.upload.key).await;
            }
            Err(e)
        }
    }
}

/// An attachment already persisted to the file store.
struct StoredAttachment {
    upload: common::StoredUpload,
    category: String,
    filename: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listEntries",
    summary = "List root posts",
    description = "Returns a paginated, newest-first list of root posts, each annotated \
        with its author's name, vote counts and comment count. Supports filtering by \
        author, subject and case-insensitive title search.",
    params(EntryListQuery),
    responses(
        (status = 200, description = "List of posts", body = EntryListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<EntryListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = entry::Entity::find().filter(entry::Column::ParentId.eq(entry::ROOT_PARENT));

    if let Some(author_id) = query.author_id {
        select = select.filter(entry::Column::AuthorId.eq(author_id));
    }
    if let Some(subject_id) = query.subject_id {
        select = select.filter(entry::Column::SubjectId.eq(subject_id));
    }
    if let Some(ref search) = query.search {
        select = title_search_filter(select, search);
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let roots = select
        .order_by_desc(entry::Column::CreatedAt)
        .order_by_desc(entry::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = annotate_entries(&state.db, roots).await?;

    Ok(Json(EntryListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getThread",
    summary = "Get an entry as an assembled thread",
    description = "Returns the entry with its author name, vote counts, attached file URL \
        and its direct comments in creation order, each comment carrying its own author \
        name and vote counts. Fetching a comment directly yields an empty comment list.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Assembled thread", body = ThreadResponse),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ThreadResponse>, AppError> {
    let root = find_entry(&state.db, id).await?;

    let author_name = author_name_of(&state.db, root.author_id).await?;
    let score = score_of(&state.db, root.id).await?;

    // Comments never have children, so this query is naturally empty when the
    // requested entry is itself a comment.
    let comments = entry::Entity::find()
        .filter(entry::Column::ParentId.eq(root.id))
        .order_by_asc(entry::Column::CreatedAt)
        .order_by_asc(entry::Column::Id)
        .all(&state.db)
        .await?;

    // Per-comment score and author lookups are independent reads; issue them
    // concurrently and wait for all of them before composing.
    let db = &state.db;
    let comment_views = futures::future::try_join_all(comments.into_iter().map(|c| async move {
        let score = score_of(db, c.id).await?;
        let author_name = author_name_of(db, c.author_id).await?;
        Ok::<_, AppError>(CommentView {
            id: c.id,
            author_id: c.author_id,
            author_name,
            body: c.body,
            upvotes: score.upvotes,
            downvotes: score.downvotes,
            created_at: c.created_at,
        })
    }))
    .await?;

    let file_url = attached_file_url(&state.db, root.id).await?;

    Ok(Json(ThreadResponse {
        entry: EntryResponse::from(root),
        author_name,
        upvotes: score.upvotes,
        downvotes: score.downvotes,
        comment_count: comment_views.len() as u64,
        comments: comment_views,
        file_url,
    }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Posts",
    operation_id = "updateEntry",
    summary = "Update an entry",
    description = "Partially updates an entry — only provided fields are modified. Only \
        the author (or a caller with `entry:moderate`) may update. Title and subject \
        changes are ignored for comments. An empty payload returns the current resource \
        unchanged.",
    params(("id" = i32, Path, description = "Entry ID")),
    request_body = UpdateEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = EntryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    validate_update_entry(&payload, &state.config.content)?;

    if payload == UpdateEntryRequest::default() {
        let existing = find_entry(&state.db, id).await?;
        require_author_or_moderator(&auth_user, &existing)?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_entry(&txn, id).await?;
    require_author_or_moderator(&auth_user, &existing)?;

    let is_root = existing.is_root();
    let mut active: entry::ActiveModel = existing.into();

    if is_root {
        if let Some(ref title) = payload.title {
            active.title = Set(Some(title.trim().to_string()));
        }
        if let Some(subject_id) = payload.subject_id {
            find_subject(&txn, subject_id).await?;
            active.subject_id = Set(subject_id);
        }
    }
    if let Some(body) = payload.body {
        active.body = Set(body);
    }
    active.updated_at = Set(Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    operation_id = "deleteEntry",
    summary = "Delete an entry",
    description = "Deletes an entry together with its votes, its comments (and their \
        votes), and all attached file records and stored bytes. Only the author (or a \
        caller with `entry:moderate`) may delete.",
    params(("id" = i32, Path, description = "Entry ID")),
    responses(
        (status = 200, description = "Entry deleted", body = DeleteEntryResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "Entry not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteEntryResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_entry(&txn, id).await?;
    require_author_or_moderator(&auth_user, &existing)?;

    // The entry plus its direct comments; comments have no children.
    let mut doomed_ids = vec![existing.id];
    let comment_ids: Vec<i32> = entry::Entity::find()
        .filter(entry::Column::ParentId.eq(existing.id))
        .select_only()
        .column(entry::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;
    doomed_ids.extend(comment_ids);

    let joins = entry_file::Entity::find()
        .filter(entry_file::Column::EntryId.is_in(doomed_ids.clone()))
        .all(&txn)
        .await?;
    let file_ids: Vec<i32> = joins.iter().map(|j| j.file_id).collect();

    let doomed_files = stored_file::Entity::find()
        .filter(stored_file::Column::Id.is_in(file_ids.clone()))
        .all(&txn)
        .await?;

    vote::Entity::delete_many()
        .filter(vote::Column::EntryId.is_in(doomed_ids.clone()))
        .exec(&txn)
        .await?;
    entry_file::Entity::delete_many()
        .filter(entry_file::Column::EntryId.is_in(doomed_ids.clone()))
        .exec(&txn)
        .await?;
    if !file_ids.is_empty() {
        stored_file::Entity::delete_many()
            .filter(stored_file::Column::Id.is_in(file_ids))
            .exec(&txn)
            .await?;
    }
    entry::Entity::delete_many()
        .filter(entry::Column::Id.is_in(doomed_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    // Best effort; an orphaned upload is preferable to a dangling row.
    for file in doomed_files {
        let _ = state.files.delete(&file.key).await;
    }

    Ok(Json(DeleteEntryResponse { id }))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Posts",
    operation_id = "searchEntries",
    summary = "Search root posts by title",
    description = "Case-insensitive title substring search over root posts, newest first. \
        Also accepts the term as a JSON body via POST.",
    params(SearchRequest),
    responses(
        (status = 200, description = "Matching posts", body = SearchResponse),
        (status = 400, description = "Empty search term (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn search_entries(
    State(state): State<AppState>,
    Query(query): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    run_search(&state, query.term.as_deref()).await
}

#[utoipa::path(
    post,
    path = "/search",
    tag = "Posts",
    operation_id = "searchEntriesPost",
    summary = "Search root posts by title (term in body)",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching posts", body = SearchResponse),
        (status = 400, description = "Empty search term (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn search_entries_post(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    run_search(&state, payload.term.as_deref()).await
}

/// Maximum number of rows a search returns.
const SEARCH_LIMIT: u64 = 100;

async fn run_search(state: &AppState, term: Option<&str>) -> Result<Json<SearchResponse>, AppError> {
    let term = term.map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::Validation("Search term must not be empty".into()));
    }

    let select = title_search_filter(
        entry::Entity::find().filter(entry::Column::ParentId.eq(entry::ROOT_PARENT)),
        term,
    );

    let roots = select
        .order_by_desc(entry::Column::CreatedAt)
        .order_by_desc(entry::Column::Id)
        .limit(Some(SEARCH_LIMIT))
        .all(&state.db)
        .await?;

    let data = annotate_entries(&state.db, roots).await?;
    Ok(Json(SearchResponse { data }))
}

/// Apply a case-insensitive, escaped LIKE filter on the title column.
fn title_search_filter(
    select: Select<entry::Entity>,
    term: &str,
) -> Select<entry::Entity> {
    let term = escape_like(term.trim());
    if term.is_empty() {
        return select;
    }
    select.filter(
        Expr::expr(Func::lower(Expr::col(entry::Column::Title)))
            .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
    )
}

/// Annotate entries with author names and read-time counts.
async fn annotate_entries<C: ConnectionTrait>(
    db: &C,
    entries: Vec<entry::Model>,
) -> Result<Vec<EntryListItem>, AppError> {
    let author_ids: Vec<i32> = entries.iter().map(|e| e.author_id).collect();
    let names = author_names(db, &author_ids).await?;

    let mut items = Vec::with_capacity(entries.len());
    for e in entries {
        let score = score_of(db, e.id).await?;
        let comment_count = comment_count_of(db, e.id).await?;
        let author_name = names
            .get(&e.author_id)
            .cloned()
            .ok_or_else(|| dangling_author(e.id, e.author_id))?;
        items.push(EntryListItem {
            id: e.id,
            author_id: e.author_id,
            author_name,
            subject_id: e.subject_id,
            title: e.title,
            body: e.body,
            upvotes: score.upvotes,
            downvotes: score.downvotes,
            comment_count,
            created_at: e.created_at,
        });
    }
    Ok(items)
}

/// Batch-resolve author display names.
async fn author_names<C: ConnectionTrait>(
    db: &C,
    ids: &[i32],
) -> Result<HashMap<i32, String>, AppError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

/// Resolve a single author display name, failing loudly on a dangling id.
async fn author_name_of<C: ConnectionTrait>(db: &C, author_id: i32) -> Result<String, AppError> {
    user::Entity::find_by_id(author_id)
        .one(db)
        .await?
        .map(|u| u.username)
        .ok_or_else(|| {
            AppError::DataIntegrity(format!("entry references missing user {author_id}"))
        })
}

fn dangling_author(entry_id: i32, author_id: i32) -> AppError {
    AppError::DataIntegrity(format!(
        "entry {entry_id} references missing user {author_id}"
    ))
}

/// URL of the entry's attachment, surfacing the oldest join record when more
/// than one exists.
async fn attached_file_url<C: ConnectionTrait>(
    db: &C,
    entry_id: i32,
) -> Result<Option<String>, AppError> {
    let join = entry_file::Entity::find()
        .filter(entry_file::Column::EntryId.eq(entry_id))
        .order_by_asc(entry_file::Column::CreatedAt)
        .order_by_asc(entry_file::Column::FileId)
        .one(db)
        .await?;

    let Some(join) = join else {
        return Ok(None);
    };

    let file = stored_file::Entity::find_by_id(join.file_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "entry {entry_id} references missing file {}",
                join.file_id
            ))
        })?;

    Ok(Some(file.url))
}

/// Decode, size-check and persist an attachment's bytes.
async fn store_attachment(
    state: &AppState,
    attachment: &AttachmentPayload,
) -> Result<StoredAttachment, AppError> {
    let data = BASE64
        .decode(attachment.data.trim())
        .map_err(|e| AppError::Validation(format!("Attachment is not valid base64: {e}")))?;

    let max = state.config.storage.max_file_size;
    if data.len() as u64 > max {
        return Err(AppError::Validation(format!(
            "Attachment exceeds the maximum size of {max} bytes"
        )));
    }

    let category = attachment.category.as_deref().unwrap_or("document");
    let upload = state
        .files
        .store(&data, category, &attachment.filename)
        .await?;

    Ok(StoredAttachment {
        upload,
        category: category.to_string(),
        filename: attachment.filename.clone(),
    })
}

fn require_author_or_moderator(
    auth_user: &AuthUser,
    entry: &entry::Model,
) -> Result<(), AppError> {
    if entry.author_id == auth_user.user_id || auth_user.has_permission("entry:moderate") {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author may modify this entry".into(),
        ))
    }
}

pub(crate) async fn find_entry<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<entry::Model, AppError> {
    entry::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".into()))
}

async fn find_subject<C: ConnectionTrait>(db: &C, id: i32) -> Result<subject::Model, AppError> {
    subject::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".into()))
}
