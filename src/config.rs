//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;

/// Which storage backend holds the character and workout records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// JSON files in `data_dir`, survives restarts
    File,
    /// Process memory only
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the file storage backend
    pub data_dir: PathBuf,
    /// Storage backend selection
    pub storage: StorageKind,
    /// Address the local API binds to
    pub bind_addr: String,
    /// Server port
    pub port: u16,
    /// Front-end origin allowed by CORS
    pub frontend_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            storage: StorageKind::Memory,
            bind_addr: "127.0.0.1".to_string(),
            port: 8787,
            frontend_url: "http://localhost:8081".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("FITQUEST_STORAGE")
            .unwrap_or_else(|_| "file".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "file" => StorageKind::File,
            "memory" => StorageKind::Memory,
            other => return Err(ConfigError::Invalid("FITQUEST_STORAGE", other.to_string())),
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8787,
        };

        Ok(Self {
            data_dir: env::var("FITQUEST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            storage,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env mutations don't race with each other.
    #[test]
    fn test_config_from_env() {
        env::set_var("FITQUEST_STORAGE", "Memory");
        env::set_var("FITQUEST_DATA_DIR", "/tmp/fitquest-test");
        env::set_var("PORT", "9000");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/fitquest-test"));
        assert_eq!(config.port, 9000);

        env::set_var("PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("PORT", _))
        ));

        env::set_var("PORT", "9000");
        env::set_var("FITQUEST_STORAGE", "cloud");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("FITQUEST_STORAGE", _))
        ));

        env::remove_var("FITQUEST_STORAGE");
        env::remove_var("FITQUEST_DATA_DIR");
        env::remove_var("PORT");
    }
}
