pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, ConfigError, LoggingConfig, OmdbConfig, RatingConfig, SearchConfig, StorageConfig, API_KEY_ENV};
pub use credentials::CredentialStore;
pub use paths::{PathManager, BASE_PATH_ENV};
