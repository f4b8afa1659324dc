use super::error::StorageError;

/// Maximum length of a sanitized filename component.
const MAX_FILENAME_LEN: usize = 128;

/// Reduce an upload's original filename to a safe key component.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are stripped so a key can never name a hidden file or `..`.
pub fn sanitize_filename(original: &str) -> String {
    let cleaned: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        return "file".to_string();
    }

    trimmed.chars().take(MAX_FILENAME_LEN).collect()
}

/// Validate a category tag (single flat path segment, lowercase slug).
pub fn validate_category(category: &str) -> Result<&str, StorageError> {
    if category.is_empty() || category.len() > 64 {
        return Err(StorageError::InvalidKey(
            "category must be 1-64 characters".into(),
        ));
    }
    if !category
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(StorageError::InvalidKey(format!(
            "category '{category}' must contain only lowercase letters, digits and '-'"
        )));
    }
    Ok(category)
}
