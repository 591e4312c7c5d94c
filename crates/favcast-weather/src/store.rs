//! In-memory TTL store.
//!
//! Entries expire lazily: a lookup that finds a stale entry removes it and
//! reports a miss. `purge_expired` backs the optional periodic sweep.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::key::CacheKey;

/// Stand-in expiry for TTLs too large to add to the clock (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A stored value and the instant it stops being servable.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Strictly before expiry; an entry is already stale at `expires_at`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
pub struct TtlStore<V> {
    entries: HashMap<CacheKey, CacheEntry<V>>,
}

impl<V> Default for TtlStore<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V: Clone> TtlStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value for `key` if present and unexpired. A stale entry is dropped.
    pub fn get(&mut self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh_at(now) => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace unconditionally; the entry expires `ttl` from now.
    /// A TTL past the end of the clock's range never expires in practice.
    pub fn set(&mut self, key: CacheKey, value: V, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Remove `key`; returns whether an entry (fresh or stale) was present.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now));
        before - self.entries.len()
    }

    /// Expiry of the entry for `key`, stale or not.
    pub fn expires_at(&self, key: &CacheKey) -> Option<Instant> {
        self.entries.get(key).map(|entry| entry.expires_at)
    }

    /// Number of physically stored entries, including stale ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
