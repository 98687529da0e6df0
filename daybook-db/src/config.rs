use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
}

/// Connection details for the hosted account backend. The api_key and
/// operator credentials come from the environment, never from source.
#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub remote: Remote,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional; tools run from
        //    anywhere in the checkout)
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let dev_path = PathBuf::from("daybook-tools").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("database.path", "daybook.db")?
            .set_default("remote.base_url", "")?;

        // 2. Override with environment variables (highest priority)
        if let Ok(db_path) = std::env::var("DATABASE_PATH") {
            builder = builder.set_override("database.path", db_path)?;
        }
        if let Ok(base_url) = std::env::var("REMOTE_BASE_URL") {
            builder = builder.set_override("remote.base_url", base_url)?;
        }
        if let Ok(api_key) = std::env::var("REMOTE_API_KEY") {
            builder = builder.set_override("remote.api_key", api_key)?;
        }
        if let Ok(email) = std::env::var("REMOTE_EMAIL") {
            builder = builder.set_override("remote.email", email)?;
        }
        if let Ok(password) = std::env::var("REMOTE_PASSWORD") {
            builder = builder.set_override("remote.password", password)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
