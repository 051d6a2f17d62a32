use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Mutex;

use lru::LruCache;
use tracing::debug;

use super::{CacheEntry, KeyValueStore};
use crate::error::{CaskError, CaskResult};

/// Maximum number of entries kept in memory in front of the files
const MEMORY_CAPACITY: usize = 16;

/// One JSON file per key under the workflow cache directory.
pub struct FileStore {
    dir: PathBuf,
    memory: Mutex<LruCache<String, CacheEntry>>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let capacity = NonZeroUsize::new(MEMORY_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            dir: dir.into(),
            memory: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn remember(&self, key: &str, entry: &CacheEntry) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.put(key.to_string(), entry.clone());
        }
    }

    fn forget(&self, key: &str) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.pop(key);
        }
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> CaskResult<Option<CacheEntry>> {
        if let Ok(mut memory) = self.memory.lock()
            && let Some(entry) = memory.get(key)
        {
            return Ok(Some(entry.clone()));
        }

        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CaskError::io(format!("reading cache file {}", path.display()), e))?;
        let entry: CacheEntry =
            serde_json::from_str(&content).map_err(|e| CaskError::json(&path, e))?;
        self.remember(key, &entry);
        Ok(Some(entry))
    }

    fn save(&self, key: &str, entry: &CacheEntry) -> CaskResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CaskError::io(format!("creating {}", self.dir.display()), e))?;

        let path = self.entry_path(key);
        let content = serde_json::to_string(entry).map_err(|e| CaskError::json(&path, e))?;

        // Write then rename so a concurrent reader never sees half an entry
        let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
        std::fs::write(&tmp, content)
            .map_err(|e| CaskError::io(format!("writing cache file {}", tmp.display()), e))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CaskError::io(format!("replacing cache file {}", path.display()), e))?;

        self.remember(key, entry);
        debug!(key, "cached until next refresh");
        Ok(())
    }

    fn delete(&self, key: &str) -> CaskResult<()> {
        self.forget(key);
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| {
                CaskError::io(format!("removing cache file {}", path.display()), e)
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::Payload;

    fn entry(lines: &[&str]) -> CacheEntry {
        CacheEntry {
            payload: Payload::Lines(lines.iter().map(|s| s.to_string()).collect()),
            stored_at: Utc::now(),
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let saved = entry(&["firefox", "vlc"]);
        FileStore::new(dir.path())
            .save("cask_all_casks", &saved)
            .unwrap();

        // a fresh store has nothing in memory and must read the file
        let reopened = FileStore::new(dir.path());
        assert_eq!(reopened.load("cask_all_casks").unwrap(), Some(saved));
        assert!(dir.path().join("cask_all_casks.json").exists());
    }

    #[test]
    fn delete_removes_file_and_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("cask_configured", &entry(&[])).unwrap();
        store.delete("cask_configured").unwrap();

        assert_eq!(store.load("cask_configured").unwrap(), None);
        assert!(!dir.path().join("cask_configured.json").exists());
        // deleting a missing key is not an error
        store.delete("cask_configured").unwrap();
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load("broken"), Err(CaskError::Json { .. })));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.save("k", &entry(&["a"])).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["k.json"]);
    }
}
