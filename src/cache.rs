//! # Cache layer
//! Time-boxed memoization behind a narrow `get`/`set` interface.
//!
//! `MemoryCache` is the single-process implementation; an external store can
//! implement `CacheStore` without the pipeline noticing. TTL is absolute (no
//! sliding refresh): an entry expires `ttl` after it was written.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

pub trait CacheStore<V>: Send + Sync {
    /// Live value for `key`, or `None` if absent/expired.
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
    fn remove(&self, key: &str);
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// Thread-safe in-memory cache.
#[derive(Debug)]
pub struct MemoryCache<V> {
    inner: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    // Writes are idempotent, so a poisoned map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Number of live entries (expired ones are purged first).
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let mut map = self.lock();
        map.retain(|_, e| e.is_live(now));
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send> CacheStore<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut map = self.lock();
        match map.get(key) {
            Some(e) if e.is_live(now) => Some(e.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.lock().insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}
