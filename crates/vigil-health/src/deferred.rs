//! Deferred-work queue
//!
//! Work that cannot run inline (a lock-guarded mutation whose lock was
//! contended) is funnelled through a single queue drained by a single task.
//! A burst of contended operations therefore costs one task, not one timer
//! per callback, and the operations apply in the order they were deferred.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::warn;

/// A queued unit of deferred work.
pub(crate) type DeferredTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Handle to the engine's deferred-work queue.
///
/// The drainer task exits once every handle is dropped.
#[derive(Clone)]
pub(crate) struct DeferredQueue {
    tx: mpsc::UnboundedSender<DeferredTask>,
}

impl DeferredQueue {
    /// Create the queue and spawn its drainer task.
    pub(crate) fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<DeferredTask>();

        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                task.await;
            }
        });

        Self { tx }
    }

    /// Queue `task` for execution.
    pub(crate) fn push(&self, task: DeferredTask) {
        if self.tx.send(task).is_err() {
            warn!("deferred queue closed; dropping task");
        }
    }
}

impl fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue").finish_non_exhaustive()
    }
}
