use color_eyre::eyre::{eyre, Result};
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use popcorn_core::WatchedStore;
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;

/// Everything a command needs from disk, loaded once at startup.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();

        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let mut credentials = CredentialStore::new(paths.credentials_file());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", paths.credentials_file().display(), e))?;

        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    pub fn api_key(&self) -> Option<String> {
        self.config.resolve_api_key(&self.credentials)
    }

    pub fn movie_source(&self) -> Result<Arc<dyn MovieSource>> {
        let api_key = self.api_key().ok_or_else(|| {
            eyre!(
                "No OMDb API key configured. Run 'popcorn config api-key' or set {}",
                API_KEY_ENV
            )
        })?;

        let client = OmdbClient::from_config(&self.config.omdb, api_key).map_err(|e| eyre!("{}", e))?;
        tracing::debug!(base_url = client.base_url(), "Using OMDb source");
        Ok(Arc::new(client))
    }

    pub fn watched_store(&self) -> Result<WatchedStore> {
        WatchedStore::open(&self.paths, &self.config).map_err(|e| eyre!("Failed to open watched list: {}", e))
    }
}
