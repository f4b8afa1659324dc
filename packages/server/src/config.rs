use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the filesystem upload store.
    pub uploads_dir: PathBuf,
    /// Maximum decoded attachment size in bytes.
    pub max_file_size: u64,
    /// Base URL prepended to store keys to form retrievable file URLs.
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Maximum entry body length in characters.
    pub max_body_length: usize,
    /// Maximum title length in characters.
    pub max_title_length: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub content: ContentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.uploads_dir", "./uploads")?
            .set_default("storage.max_file_size", 2 * 1024 * 1024)?
            .set_default(
                "storage.public_base_url",
                "http://127.0.0.1:3000/api/v1/files",
            )?
            .set_default("content.max_body_length", 4000)?
            .set_default("content.max_title_length", 200)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., AULA__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("AULA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
