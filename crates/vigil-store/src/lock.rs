//! Named locks over the shared store

use crate::{Result, SharedStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Poll interval while waiting on a contended lock.
const RETRY_DELAY: Duration = Duration::from_millis(25);

/// A held named lock.
///
/// The lock key carries a TTL, so a guard that is never released (crashed
/// worker, dropped task) self-releases when the TTL elapses.
#[derive(Debug)]
#[must_use = "dropping the guard without release() leaves the lock held until its TTL elapses"]
pub struct LockGuard {
    store: Arc<dyn SharedStore>,
    key: String,
}

impl LockGuard {
    /// Release the lock.
    ///
    /// Failure to delete the key is logged and swallowed: the TTL releases
    /// the lock eventually, and the caller's work is already done.
    pub async fn release(self) {
        if let Err(err) = self.store.delete(&self.key).await {
            warn!(key = %self.key, error = %err, "failed to release lock");
        }
    }
}

/// Try to acquire the named lock `key` within `timeout`.
///
/// The lock key is written with `exptime` as TTL. Returns `None` when the
/// timeout elapses without the lock becoming free; store errors propagate.
pub async fn acquire(
    store: &Arc<dyn SharedStore>,
    key: &str,
    timeout: Duration,
    exptime: Duration,
) -> Result<Option<LockGuard>> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if store.add(key, b"locked".to_vec(), Some(exptime)).await? {
            return Ok(Some(LockGuard {
                store: Arc::clone(store),
                key: key.to_string(),
            }));
        }

        if tokio::time::Instant::now() >= deadline {
            return Ok(None);
        }

        tokio::time::sleep(RETRY_DELAY).await;
    }
}
