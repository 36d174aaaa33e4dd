use anyhow::{anyhow, Result};
use popcorn_config::{Config, PathManager};
use popcorn_models::WatchedEntry;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::summary::{summarize, WatchedSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// An entry with the same id existed and was replaced in place.
    Replaced,
}

/// The user's watched list, written through to a JSON file on every change.
///
/// At most one entry exists per identifier; adding an id that is already
/// present replaces that entry and keeps its position.
pub struct WatchedStore {
    path: PathBuf,
    entries: Vec<WatchedEntry>,
}

impl WatchedStore {
    /// Open the store at the configured location (or `<data dir>/watched.json`).
    pub fn open(path_manager: &PathManager, config: &Config) -> Result<Self> {
        let path = config
            .storage
            .watched_file
            .clone()
            .unwrap_or_else(|| path_manager.watched_file());
        Self::load(path)
    }

    /// Rehydrate from `path`. A missing file is an empty list; an unreadable
    /// one is moved aside to `<file>.bak` and also starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = Self {
            path,
            entries: Vec::new(),
        };

        if !store.path.exists() {
            debug!(path = %store.path.display(), "Watched list file does not exist, starting empty");
            return Ok(store);
        }

        let content = std::fs::read_to_string(&store.path)?;
        // The browser app stored `null` before anything was added.
        match serde_json::from_str::<Option<Vec<WatchedEntry>>>(&content) {
            Ok(entries) => {
                for entry in entries.unwrap_or_default() {
                    store.upsert(entry);
                }
                info!(path = %store.path.display(), count = store.entries.len(), "Loaded watched list");
            }
            Err(e) => {
                let backup_path = store.path.with_extension("json.bak");
                match std::fs::rename(&store.path, &backup_path) {
                    Ok(()) => warn!(
                        "Watched list at {:?} is unreadable ({}). Moved it to {:?} and starting empty.",
                        store.path, e, backup_path
                    ),
                    Err(backup_err) => warn!(
                        "Watched list at {:?} is unreadable ({}) and could not be backed up: {}. Starting empty.",
                        store.path, e, backup_err
                    ),
                }
            }
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.imdb_id == imdb_id)
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    pub fn user_rating_for(&self, imdb_id: &str) -> Option<u8> {
        self.get(imdb_id).map(|e| e.user_rating)
    }

    fn upsert(&mut self, entry: WatchedEntry) -> AddOutcome {
        match self.entries.iter_mut().find(|e| e.imdb_id == entry.imdb_id) {
            Some(existing) => {
                *existing = entry;
                AddOutcome::Replaced
            }
            None => {
                self.entries.push(entry);
                AddOutcome::Added
            }
        }
    }

    pub fn add(&mut self, entry: WatchedEntry) -> Result<AddOutcome> {
        if entry.imdb_id.is_empty() {
            return Err(anyhow!("Cannot add a watched entry without an id"));
        }
        let imdb_id = entry.imdb_id.clone();
        let outcome = self.upsert(entry);
        self.save()?;
        info!(imdb_id = %imdb_id, ?outcome, "Watched list updated");
        Ok(outcome)
    }

    /// Remove `imdb_id`. Returns false (and writes nothing) when it was absent.
    pub fn remove(&mut self, imdb_id: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.imdb_id != imdb_id);
        if self.entries.len() == before {
            debug!(imdb_id, "Remove requested for id not in watched list");
            return Ok(false);
        }
        self.save()?;
        info!(imdb_id, "Removed from watched list");
        Ok(true)
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        self.save()?;
        info!(removed, "Cleared watched list");
        Ok(removed)
    }

    pub fn summary(&self) -> WatchedSummary {
        summarize(&self.entries)
    }

    /// Write the list as CSV, one row per entry.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record([
            "imdb_id",
            "title",
            "year",
            "runtime_minutes",
            "imdb_rating",
            "user_rating",
            "rating_decisions",
            "added_at",
        ])?;
        for entry in &self.entries {
            csv_writer.write_record([
                entry.imdb_id.clone(),
                entry.title.clone(),
                entry.year.clone(),
                entry.runtime.map(|r| r.to_string()).unwrap_or_default(),
                entry.imdb_rating.map(|r| r.to_string()).unwrap_or_default(),
                entry.user_rating.to_string(),
                entry.count_rating_decisions.to_string(),
                entry.added_at.to_rfc3339(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Overwrite the file with the in-memory list (temp file, then rename).
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| anyhow!("Failed to serialize watched list: {}", e))?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), count = self.entries.len(), "Watched list saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(imdb_id: &str, user_rating: u8) -> WatchedEntry {
        WatchedEntry {
            imdb_id: imdb_id.to_string(),
            title: format!("Title {}", imdb_id),
            year: "2010".to_string(),
            poster: None,
            runtime: Some(120),
            imdb_rating: Some(7.5),
            user_rating,
            count_rating_decisions: 1,
            added_at: Utc::now(),
        }
    }

    fn temp_store() -> (tempfile::TempDir, WatchedStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchedStore::load(dir.path().join("watched.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_same_id_twice_upserts() {
        let (_dir, mut store) = temp_store();

        assert_eq!(store.add(entry("tt1", 6)).unwrap(), AddOutcome::Added);
        assert_eq!(store.add(entry("tt2", 8)).unwrap(), AddOutcome::Added);
        assert_eq!(store.add(entry("tt1", 9)).unwrap(), AddOutcome::Replaced);

        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].imdb_id, "tt1");
        assert_eq!(store.user_rating_for("tt1"), Some(9));
    }

    #[test]
    fn test_remove_absent_id_is_noop() {
        let (_dir, mut store) = temp_store();
        store.add(entry("tt1", 6)).unwrap();
        let before = store.entries().to_vec();

        assert!(!store.remove("tt404").unwrap());
        assert_eq!(store.entries(), before.as_slice());

        assert!(store.remove("tt1").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reload_yields_same_collection() {
        let (dir, mut store) = temp_store();
        store.add(entry("tt1", 6)).unwrap();
        store.add(entry("tt2", 10)).unwrap();
        store.remove("tt1").unwrap();
        store.add(entry("tt3", 3)).unwrap();

        let reloaded = WatchedStore::load(dir.path().join("watched.json")).unwrap();
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let (dir, mut store) = temp_store();
        let path = dir.path().join("watched.json");

        store.add(entry("tt1", 6)).unwrap();
        assert_eq!(WatchedStore::load(&path).unwrap().len(), 1);

        store.clear().unwrap();
        assert_eq!(WatchedStore::load(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_null_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.json");
        std::fs::write(&path, "null").unwrap();

        let store = WatchedStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_ids_on_disk_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.json");
        let on_disk = vec![entry("tt1", 2), entry("tt2", 5), entry("tt1", 7)];
        std::fs::write(&path, serde_json::to_string(&on_disk).unwrap()).unwrap();

        let store = WatchedStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.user_rating_for("tt1"), Some(7));
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watched.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = WatchedStore::load(&path).unwrap();
        assert!(store.is_empty());
        assert!(dir.path().join("watched.json.bak").exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_export_csv() {
        let (_dir, mut store) = temp_store();
        store.add(entry("tt1", 6)).unwrap();
        let mut missing = entry("tt2", 9);
        missing.runtime = None;
        missing.imdb_rating = None;
        store.add(missing).unwrap();

        let mut buffer = Vec::new();
        store.export_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("imdb_id,title,year"));
        assert!(lines[1].starts_with("tt1,Title tt1,2010,120,7.5,6,1,"));
        assert!(lines[2].starts_with("tt2,Title tt2,2010,,,9,1,"));
    }

    #[test]
    fn test_open_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().to_path_buf());
        let mut config = Config::default();

        let store = WatchedStore::open(&paths, &config).unwrap();
        assert_eq!(store.path(), paths.watched_file().as_path());

        config.storage.watched_file = Some(dir.path().join("elsewhere.json"));
        let store = WatchedStore::open(&paths, &config).unwrap();
        assert_eq!(store.path(), dir.path().join("elsewhere.json").as_path());
    }
}
