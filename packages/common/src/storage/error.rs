use thiserror::Error;

/// Errors that can occur during upload storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No upload exists under the given key.
    #[error("upload not found: {0}")]
    NotFound(String),

    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The key or one of its components is not acceptable.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The upload exceeds the configured size limit.
    #[error("upload exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
}
