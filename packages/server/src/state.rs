use std::sync::Arc;

use common::FileStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub files: Arc<dyn FileStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Build the public URL for a stored upload key.
    pub fn file_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.storage.public_base_url.trim_end_matches('/'),
            key
        )
    }
}
