use std::time::Duration;

use common::StorageConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::drawings::{DRAWING_SUFFIX, DrawingSettings};

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
pub struct DrawingConfig {
    /// Object key suffix that marks a drawing. Matched case-sensitively.
    pub suffix: String,
    pub default_url_ttl_secs: u64,
    pub max_url_ttl_secs: u64,
    /// Nodes reconciled in parallel during a batch run.
    pub reconcile_concurrency: usize,
}

impl From<&DrawingConfig> for DrawingSettings {
    fn from(config: &DrawingConfig) -> Self {
        Self {
            suffix: config.suffix.clone(),
            default_url_ttl: Duration::from_secs(config.default_url_ttl_secs),
            max_url_ttl: Duration::from_secs(config.max_url_ttl_secs),
            reconcile_concurrency: config.reconcile_concurrency,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub drawings: DrawingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", vec!["*"])?
            .set_default("server.cors.max_age", 3600)?
            .set_default("drawings.suffix", DRAWING_SUFFIX)?
            .set_default("drawings.default_url_ttl_secs", 3600)?
            .set_default("drawings.max_url_ttl_secs", 7 * 24 * 3600)?
            .set_default("drawings.reconcile_concurrency", 1)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., QTRACK__DATABASE__URL)
            .add_source(Environment::with_prefix("QTRACK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
