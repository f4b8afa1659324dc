use serde::Serialize;

use crate::config::ContentConfig;
use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed root-post title against the configured bound.
pub fn validate_title(title: &str, content: &ContentConfig) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > content.max_title_length {
        return Err(AppError::Validation(format!(
            "Title must be 1-{} characters",
            content.max_title_length
        )));
    }
    Ok(())
}

/// Validate an entry body against the configured bound.
pub fn validate_body(body: &str, content: &ContentConfig) -> Result<(), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Body must not be empty".into()));
    }
    if body.chars().count() > content.max_body_length {
        return Err(AppError::Validation(format!(
            "Body exceeds the maximum length of {} characters",
            content.max_body_length
        )));
    }
    Ok(())
}

/// Validate a resource name (careers, subjects).
pub fn validate_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 256 {
        return Err(AppError::Validation("Name must be 1-256 characters".into()));
    }
    Ok(())
}
