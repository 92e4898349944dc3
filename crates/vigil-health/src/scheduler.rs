//! Periodic active-check scheduling
//!
//! Two independent tickers, one per verdict class. Tickers fire at a
//! sub-interval granularity and race for a store-side period lock whose TTL
//! equals the configured interval: exactly one worker fleet-wide wins a
//! given window, so active probes are never duplicated, and a dead winner's
//! window simply expires.

use crate::checker::Inner;
use crate::prober;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Which verdict class a periodic tick probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickMode {
    /// Probe targets currently healthy or mostly healthy
    Healthy,
    /// Probe targets currently unhealthy or mostly unhealthy
    Unhealthy,
}

impl TickMode {
    pub(crate) fn label(self) -> &'static str {
        match self {
            TickMode::Healthy => "healthy",
            TickMode::Unhealthy => "unhealthy",
        }
    }

    fn wants_healthy(self) -> bool {
        matches!(self, TickMode::Healthy)
    }
}

/// Largest pause between period-lock attempts.
const MAX_SUB_INTERVAL: Duration = Duration::from_millis(500);

/// Spawn the ticker task for one verdict class.
///
/// The task holds the engine only weakly, so it winds down when the engine
/// is dropped as well as when the shutdown flag flips.
pub(crate) fn spawn_ticker(inner: &Arc<Inner>, mode: TickMode, interval: Duration) -> JoinHandle<()> {
    let weak: Weak<Inner> = Arc::downgrade(inner);
    let mut shutdown = inner.shutdown.subscribe();

    tokio::spawn(async move {
        let sub_interval = interval.min(MAX_SUB_INTERVAL);
        let mut ticker = tokio::time::interval(sub_interval);
        // The immediate first tick is not a probe slot
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(inner) = weak.upgrade() else { break };
                    if inner.worker_exiting() {
                        break;
                    }
                    run_tick(&inner, mode, interval).await;
                }
                changed = shutdown.changed() => {
                    // A closed channel means the engine is gone
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(mode = mode.label(), "ticker stopped");
    })
}

/// One tick: win the fleet-wide window, then probe the matching targets.
async fn run_tick(inner: &Arc<Inner>, mode: TickMode, interval: Duration) {
    let key = inner.keys.period_lock(mode.label());
    match inner.store.add(&key, b"locked".to_vec(), Some(interval)).await {
        Ok(true) => {}
        // Another worker owns this window
        Ok(false) => return,
        Err(err) => {
            warn!(mode = mode.label(), error = %err, "period lock unavailable");
            return;
        }
    }

    let targets = inner.index.read().matching(mode.wants_healthy());
    if targets.is_empty() {
        return;
    }

    debug!(mode = mode.label(), count = targets.len(), "running active checks");
    prober::check_all(inner, targets).await;
}
