use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Receipt for a stored upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredUpload {
    /// Store key in `{category}/{identifier}-{filename}` form. The key is the
    /// stable handle for later retrieval and for building the public URL.
    pub key: String,
    /// Size of the stored bytes.
    pub size: u64,
}

/// Category-sharded upload storage.
///
/// Each upload lands under its category with a fresh random identifier, so
/// storing the same bytes twice yields two independent uploads.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store an upload and return its key.
    async fn store(
        &self,
        data: &[u8],
        category: &str,
        filename: &str,
    ) -> Result<StoredUpload, StorageError>;

    /// Open an upload as a streaming async reader.
    async fn open(&self, key: &str) -> Result<BoxReader, StorageError>;

    /// Read an upload fully into memory.
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.open(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Check whether an upload exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete an upload by key.
    ///
    /// Returns `true` if the upload was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Get the size of an upload in bytes.
    async fn size(&self, key: &str) -> Result<u64, StorageError>;
}
