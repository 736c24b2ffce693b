use std::path::PathBuf;

use common::config::{StorageAppConfig, StorageBackend};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    /// Origins allowed to call the API. Empty disables the CORS layer.
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the static front end.
    pub public_dir: PathBuf,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. Empty leaves the record store unavailable.
    #[serde(default)]
    pub url: String,
    /// Connection attempts at startup before giving up. Default: 5.
    #[serde(default = "default_connect_max_attempts")]
    pub connect_max_attempts: u32,
    #[serde(default = "default_connect_base_delay_ms")]
    pub connect_base_delay_ms: u64,
    #[serde(default = "default_connect_max_delay_ms")]
    pub connect_max_delay_ms: u64,
}

fn default_connect_max_attempts() -> u32 {
    5
}
fn default_connect_base_delay_ms() -> u64 {
    1000
}
fn default_connect_max_delay_ms() -> u64 {
    30_000
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_max_attempts: default_connect_max_attempts(),
            connect_base_delay_ms: default_connect_base_delay_ms(),
            connect_max_delay_ms: default_connect_max_delay_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageAppConfig,
}

/// Conventional deployment variables mapped onto config keys.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("DATABASE_URL", "database.url"),
    ("CLOUDINARY_CLOUD_NAME", "storage.cloudinary.cloud_name"),
    ("CLOUDINARY_API_KEY", "storage.cloudinary.api_key"),
    ("CLOUDINARY_API_SECRET", "storage.cloudinary.api_secret"),
];

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.public_dir", "public")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., INKFOLIO__DATABASE__URL)
            .add_source(Environment::with_prefix("INKFOLIO").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            let value = std::env::var(var).ok().filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Settings that are absent but needed for full operation.
    ///
    /// These are reported as warnings at startup; the server still starts.
    pub fn missing_settings(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.database.url.trim().is_empty() {
            missing.push("database.url (DATABASE_URL) is not set; records cannot be stored".into());
        }
        if self.storage.backend == StorageBackend::Cloudinary {
            for name in self.storage.cloudinary.missing_credentials() {
                missing.push(format!(
                    "storage.cloudinary.{name} (CLOUDINARY_{}) is not set; uploads will fail",
                    name.to_ascii_uppercase()
                ));
            }
        }
        missing
    }
}
