use anyhow::Result;
use std::path::{Path, PathBuf};

/// Base path override, e.g. for containers or tests.
pub const BASE_PATH_ENV: &str = "POPCORN_BASE_PATH";

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("popcorn");

        Ok(Self::from_base(base_dir))
    }

    /// Config files at the base, data and logs in subdirectories.
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn watched_file(&self) -> PathBuf {
        self.data_dir.join("watched.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("popcorn.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Ok(base) = std::env::var(BASE_PATH_ENV) {
            return Self::from_base(PathBuf::from(base));
        }

        // Platform paths (~/.config/popcorn on Linux), falling back to the working directory
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".popcorn")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::from_base(PathBuf::from("/srv/popcorn"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/popcorn/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/popcorn/credentials.toml"));
        assert_eq!(paths.watched_file(), PathBuf::from("/srv/popcorn/data/watched.json"));
        assert_eq!(paths.log_file(), PathBuf::from("/srv/popcorn/logs/popcorn.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().join("popcorn"));
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}
