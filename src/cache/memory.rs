//! In-memory cache backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;

use crate::cache::{Cache, CacheError};

/// A stored response body and the instant it stops being visible.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Bytes,
    /// `None` when `now + ttl` does not fit in an `Instant`.
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Bytes, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    /// An entry is visible only while `now < expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }
}

/// Thread-safe cache backed by a sharded concurrent map.
///
/// Each shard sits behind its own reader/writer lock, so concurrent `get`s
/// never block each other and `set`/`delete` hold a write lock only for the
/// duration of the map mutation. Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry that has expired. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Cache for InMemoryCache {
    fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired_at(now) {
                return Some(entry.value.clone());
            }
        }

        // Only remove the entry if it is still the expired one; a concurrent
        // `set` may have replaced it once the read guard was released.
        self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
        tracing::trace!(key = %key, "Expired cache entry removed");
        None
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    fn entry_count(&self) -> Option<usize> {
        Some(self.len())
    }
}
