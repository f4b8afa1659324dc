use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ContentConfig;
use crate::entity::entry;
use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::{validate_body, validate_title};

/// Base64 attachment payload supplied alongside a new entry.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AttachmentPayload {
    /// Original filename.
    #[schema(example = "apuntes.pdf")]
    pub filename: String,
    /// Base64-encoded file content.
    pub data: String,
    /// Optional category tag; defaults to "document".
    pub category: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEntryRequest {
    /// Subject the entry belongs to. Ignored for comments, which inherit
    /// their parent's subject.
    pub subject_id: Option<i32>,
    /// 0 or absent for a root post; a root entry's id for a comment.
    #[serde(default)]
    pub parent_id: i32,
    /// Required for root posts; ignored for comments.
    pub title: Option<String>,
    pub body: String,
    /// Optional file attached to the entry.
    pub attachment: Option<AttachmentPayload>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateEntryRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub subject_id: Option<i32>,
}

/// Query parameters for listing root posts.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct EntryListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Restrict to posts by this author.
    pub author_id: Option<i32>,
    /// Restrict to posts under this subject.
    pub subject_id: Option<i32>,
    /// Case-insensitive title substring match.
    pub search: Option<String>,
}

/// Search term, accepted via query string (GET) or JSON body (POST).
#[derive(Deserialize, Default, utoipa::ToSchema, utoipa::IntoParams)]
pub struct SearchRequest {
    pub term: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryResponse {
    pub id: i32,
    pub author_id: i32,
    pub subject_id: i32,
    /// 0 for root posts.
    pub parent_id: i32,
    pub title: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<entry::Model> for EntryResponse {
    fn from(m: entry::Model) -> Self {
        Self {
            id: m.id,
            author_id: m.author_id,
            subject_id: m.subject_id,
            parent_id: m.parent_id,
            title: m.title,
            body: m.body,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Root post as it appears in list and search results.
#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryListItem {
    pub id: i32,
    pub author_id: i32,
    /// Author's display name.
    #[schema(example = "amalia_dev")]
    pub author_name: String,
    pub subject_id: i32,
    pub title: Option<String>,
    pub body: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EntryListResponse {
    pub data: Vec<EntryListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SearchResponse {
    pub data: Vec<EntryListItem>,
}

/// One comment inside an assembled thread.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentView {
    pub id: i32,
    pub author_id: i32,
    pub author_name: String,
    pub body: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub created_at: DateTime<Utc>,
}

/// A root entry composed with its author, score, comments and attachment.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub entry: EntryResponse,
    pub author_name: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub comment_count: u64,
    /// Direct comments in creation order. Empty when the entry is itself a
    /// comment.
    pub comments: Vec<CommentView>,
    /// URL of the attached file, if any.
    pub file_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteEntryResponse {
    /// ID of the deleted entry.
    pub id: i32,
}

pub fn validate_create_entry(
    req: &CreateEntryRequest,
    content: &ContentConfig,
) -> Result<(), AppError> {
    if req.parent_id < 0 {
        return Err(AppError::Validation("parent_id must be >= 0".into()));
    }
    if req.parent_id == entry::ROOT_PARENT {
        match req.title.as_deref() {
            Some(title) => validate_title(title, content)?,
            None => {
                return Err(AppError::Validation(
                    "Root posts require a non-empty title".into(),
                ));
            }
        }
        if req.subject_id.is_none() {
            return Err(AppError::Validation(
                "Root posts require a subject_id".into(),
            ));
        }
    }
    validate_body(&req.body, content)?;
    Ok(())
}

pub fn validate_update_entry(
    req: &UpdateEntryRequest,
    content: &ContentConfig,
) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title, content)?;
    }
    if let Some(ref body) = req.body {
        validate_body(body, content)?;
    }
    Ok(())
}
