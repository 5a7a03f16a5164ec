use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from a TOML file in the platform config dir; missing file
/// means defaults. Everything here exists so tests and mirrors can
/// repoint the remote endpoints without code changes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Load config from the default location, defaults if absent
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("medbook");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Book search API base
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Country reference list endpoint
    #[serde(default = "default_countries_url")]
    pub countries_url: String,

    /// IP geolocation endpoint
    #[serde(default = "default_geoip_url")]
    pub geoip_url: String,

    /// Cover image host
    #[serde(default = "default_covers_url")]
    pub covers_url: String,
}

fn default_search_url() -> String {
    "https://openlibrary.org".to_string()
}

fn default_countries_url() -> String {
    "https://api.first.org/data/v1/countries".to_string()
}

fn default_geoip_url() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_covers_url() -> String {
    "https://covers.openlibrary.org".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            countries_url: default_countries_url(),
            geoip_url: default_geoip_url(),
            covers_url: default_covers_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// SQLite file path; platform data dir when unset
    pub db_path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_db_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("medbook");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir.join("medbook.db"))
    }
}
