use std::collections::HashMap;
use std::sync::Mutex;

use super::{CacheEntry, KeyValueStore};
use crate::error::CaskResult;

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> CaskResult<Option<CacheEntry>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, entry: &CacheEntry) -> CaskResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    fn delete(&self, key: &str) -> CaskResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
