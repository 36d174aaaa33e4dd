use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::credentials::CredentialStore;

/// Environment variable that overrides every other source of the OMDb key.
pub const API_KEY_ENV: &str = "POPCORN_OMDB_API_KEY";

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("omdb.base_url must not be empty")]
    EmptyBaseUrl,
    #[error("omdb.timeout_seconds must be greater than zero")]
    ZeroTimeout,
    #[error("search.min_query_length must be at least 1")]
    ZeroMinQueryLength,
    #[error("rating.max_rating must be between 1 and {max}, got {value}")]
    InvalidMaxRating { value: u8, max: u8 },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub rating: RatingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    /// Leave unset to read the key from the environment or credentials file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    #[serde(default = "default_max_rating")]
    pub max_rating: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides `<data dir>/watched.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logging")]
    pub json: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Upper bound for the rating scale; a scale this long is already unusable.
pub const MAX_RATING_SCALE: u8 = 20;

fn default_base_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_min_query_length() -> usize {
    3
}

fn default_max_rating() -> u8 {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_json_logging() -> bool {
    use std::io::IsTerminal;
    !std::io::stdout().is_terminal()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_query_length: default_min_query_length() }
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self { max_rating: default_max_rating() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json_logging(),
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, or defaults when it does not exist yet.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.omdb.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if self.omdb.timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.search.min_query_length == 0 {
            return Err(ConfigError::ZeroMinQueryLength);
        }
        if self.rating.max_rating == 0 || self.rating.max_rating > MAX_RATING_SCALE {
            return Err(ConfigError::InvalidMaxRating {
                value: self.rating.max_rating,
                max: MAX_RATING_SCALE,
            });
        }
        Ok(())
    }

    /// Resolve the OMDb key: environment, then config file, then credentials.
    pub fn resolve_api_key(&self, credentials: &CredentialStore) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key_with(from_env, credentials)
    }

    fn resolve_api_key_with(&self, from_env: Option<String>, credentials: &CredentialStore) -> Option<String> {
        [
            from_env,
            self.omdb.api_key.clone(),
            credentials.get_omdb_api_key().cloned(),
        ]
        .into_iter()
        .flatten()
        .map(|key| key.trim().to_string())
        .find(|key| is_usable_api_key(key))
    }
}

pub fn is_usable_api_key(key: &str) -> bool {
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}
