//! In-memory shared store implementation

use crate::{Result, SharedStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Entry in the in-memory store
#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Instant::now() > exp)
            .unwrap_or(false)
    }
}

/// In-memory shared store.
///
/// A single instance shared by several engines stands in for the
/// shared-memory segment shared by peer worker processes. Counters are kept
/// as stringified integers so the values stay inspectable.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    store: Arc<DashMap<String, Entry>>,
}

impl InMemoryStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Remove expired entries.
    ///
    /// Reads already treat expired entries as absent; this reclaims their
    /// memory.
    pub fn cleanup(&self) {
        let mut removed = 0;
        self.store.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            debug!(removed, "cleaned up expired entries");
        }
    }

    /// Number of entries in the store, including not-yet-collected expired ones.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SharedStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        trace!(key, "store GET");

        if let Some(entry) = self.store.get(key) {
            if entry.is_expired() {
                drop(entry); // Release read lock
                self.store.remove(key);
                return Ok(None);
            }
            return Ok(Some(entry.value.clone()));
        }

        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        trace!(key, ttl_secs = ?ttl.map(|d| d.as_secs()), "store SET");

        self.store.insert(key.to_string(), Entry::new(value, ttl));

        Ok(())
    }

    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        trace!(key, delta, "store INCR");

        let mut new_value = delta;

        self.store
            .entry(key.to_string())
            .and_modify(|entry| {
                if !entry.is_expired() {
                    // Parse existing value and increment
                    if let Ok(current) = std::str::from_utf8(&entry.value) {
                        if let Ok(current_num) = current.parse::<i64>() {
                            new_value = current_num + delta;
                            entry.value = new_value.to_string().into_bytes();
                            return;
                        }
                    }
                }

                // If expired or invalid, restart at delta
                entry.value = delta.to_string().into_bytes();
                entry.expires_at = None;
            })
            .or_insert_with(|| Entry::new(delta.to_string().into_bytes(), None));

        Ok(new_value)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        trace!(key, "store DELETE");
        self.store.remove(key);
        Ok(())
    }

    async fn add(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<bool> {
        trace!(key, "store ADD");

        match self.store.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_expired() {
                    occupied.insert(Entry::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, ttl));
                Ok(true)
            }
        }
    }
}
