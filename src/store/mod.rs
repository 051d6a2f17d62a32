//! Time-bounded key/value cache.
//!
//! Entries are written whole and stamped with the time they were stored; a
//! read is a hit only while the entry is younger than the caller's max age.
//! A max age of zero therefore always re-fetches while still leaving the
//! latest value behind for inspection.

mod file;
#[cfg(test)]
mod memory;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CaskResult;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    Lines(Vec<String>),
    Flag(bool),
}

impl Payload {
    pub fn into_lines(self) -> Option<Vec<String>> {
        match self {
            Self::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: Payload,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match (now - self.stored_at).to_std() {
            Ok(age) => age < max_age,
            // stored in the future: the clock moved backwards
            Err(_) => false,
        }
    }
}

pub trait KeyValueStore {
    fn load(&self, key: &str) -> CaskResult<Option<CacheEntry>>;
    fn save(&self, key: &str, entry: &CacheEntry) -> CaskResult<()>;
    fn delete(&self, key: &str) -> CaskResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn load(&self, key: &str) -> CaskResult<Option<CacheEntry>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, entry: &CacheEntry) -> CaskResult<()> {
        (**self).save(key, entry)
    }

    fn delete(&self, key: &str) -> CaskResult<()> {
        (**self).delete(key)
    }
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct Cache<S> {
    store: S,
    clock: Clock,
}

impl<S: KeyValueStore> Cache<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(Utc::now))
    }

    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Returns the stored payload, fresh or not.
    #[cfg(test)]
    pub fn peek(&self, key: &str) -> Option<Payload> {
        self.load_logged(key).map(|entry| entry.payload)
    }

    pub fn fresh(&self, key: &str, max_age: Duration) -> Option<Payload> {
        let entry = self.load_logged(key)?;
        if entry.is_fresh((self.clock)(), max_age) {
            debug!(key, "cache hit");
            Some(entry.payload)
        } else {
            debug!(key, "cache entry stale");
            None
        }
    }

    pub fn put(&self, key: &str, payload: Payload) -> CaskResult<()> {
        let entry = CacheEntry {
            payload,
            stored_at: (self.clock)(),
        };
        self.store.save(key, &entry)
    }

    pub fn delete(&self, key: &str) -> CaskResult<()> {
        self.store.delete(key)
    }

    /// Read-through lookup: serves fresh lines or runs `fetch` and stores
    /// its result. Failed fetches leave the previous entry untouched.
    pub async fn cached_lines<F, Fut>(
        &self,
        key: &str,
        max_age: Duration,
        fetch: F,
    ) -> anyhow::Result<Vec<String>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Vec<String>>>,
    {
        if let Some(lines) = self.fresh(key, max_age).and_then(Payload::into_lines) {
            return Ok(lines);
        }

        let lines = fetch().await?;
        self.put_logged(key, Payload::Lines(lines.clone()));
        Ok(lines)
    }

    pub async fn cached_flag<F, Fut>(&self, key: &str, max_age: Duration, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        if let Some(flag) = self.fresh(key, max_age).and_then(|payload| payload.as_flag()) {
            return flag;
        }

        let flag = fetch().await;
        self.put_logged(key, Payload::Flag(flag));
        flag
    }

    fn put_logged(&self, key: &str, payload: Payload) {
        if let Err(err) = self.put(key, payload) {
            warn!(key, "failed to write cache entry: {err}");
        }
    }

    fn load_logged(&self, key: &str) -> Option<CacheEntry> {
        match self.store.load(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, "ignoring unreadable cache entry: {err}");
                None
            }
        }
    }
}
