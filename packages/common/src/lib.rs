pub mod storage;

pub use storage::{BoxReader, FileStore, StorageError, StoredUpload};
