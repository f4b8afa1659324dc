use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::stored_file;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{key}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a stored file",
    description = "Streams the stored bytes for an upload key. Supports ETag-based \
        caching via If-None-Match.",
    params(("key" = String, Path, description = "Store key (category/name)")),
    responses(
        (status = 200, description = "File content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers), fields(key))]
pub async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let file = stored_file::Entity::find()
        .filter(stored_file::Column::Key.eq(&key))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".into()))?;

    // Keys are immutable once stored, so the key doubles as the ETag.
    let etag_value = format!("\"{}\"", file.key);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let reader = state.files.open(&file.key).await?;
    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    let content_type = file
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&file.filename),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("inline; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
