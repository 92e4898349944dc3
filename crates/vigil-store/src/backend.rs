//! Shared store trait definition

use crate::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Shared key-value store seam.
///
/// One store instance is the segment a fleet of peer workers coordinates
/// through: the authoritative target list, per-target state and counters,
/// and the named locks all live here. All operations are async so networked
/// backends can implement the trait.
#[async_trait]
pub trait SharedStore: Send + Sync + fmt::Debug {
    /// Get a value by key.
    ///
    /// Returns `None` when the key doesn't exist or has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value with optional TTL.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Atomic increment.
    ///
    /// A missing key is created at `delta`. Returns the post-increment value.
    async fn incr(&self, key: &str, delta: i64) -> Result<i64>;

    /// Delete a key.
    ///
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Set `value` only when `key` is absent (or expired).
    ///
    /// Returns whether the write happened. The lock primitive builds on this.
    async fn add(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<bool>;

    /// Whether `key` currently exists.
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
