use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use uuid::Uuid;

use super::error::StorageError;
use super::key::{sanitize_filename, validate_category};
use super::traits::{BoxReader, FileStore, StoredUpload};

/// Filesystem-backed upload store.
///
/// Uploads are stored as `{base_path}/{category}/{uuid}-{filename}`; the part
/// after `{base_path}/` is the upload's key.
pub struct FilesystemFileStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemFileStore {
    /// Create a new filesystem upload store.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Resolve a key to its on-disk path, rejecting keys that escape the base.
    fn upload_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let (category, name) = key
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidKey(format!("malformed key '{key}'")))?;
        validate_category(category)?;
        if name.is_empty() || name.contains('/') || Path::new(name).file_name().is_none() {
            return Err(StorageError::InvalidKey(format!("malformed key '{key}'")));
        }
        if name != sanitize_filename(name) {
            return Err(StorageError::InvalidKey(format!(
                "key '{key}' contains unsafe characters"
            )));
        }
        Ok(self.base_path.join(category).join(name))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path.join(".tmp").join(Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl FileStore for FilesystemFileStore {
    async fn store(
        &self,
        data: &[u8],
        category: &str,
        filename: &str,
    ) -> Result<StoredUpload, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let category = validate_category(category)?;
        let name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let key = format!("{category}/{name}");
        let target = self.base_path.join(category).join(&name);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(StoredUpload {
            key,
            size: data.len() as u64,
        })
    }

    async fn open(&self, key: &str) -> Result<BoxReader, StorageError> {
        let path = self.upload_path(key)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.upload_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.upload_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn size(&self, key: &str) -> Result<u64, StorageError> {
        let path = self.upload_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
