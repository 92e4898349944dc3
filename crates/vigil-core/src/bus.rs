//! Inter-worker event bus seam

use crate::event::TargetEvent;
use async_trait::async_trait;
use std::fmt;
use std::sync::Weak;

/// Errors raised by event bus implementations
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The event could not be published
    #[error("event post failed: {0}")]
    Post(String),

    /// The bus is no longer accepting subscriptions or events
    #[error("event bus closed")]
    Closed,
}

/// Receiver side of an engine subscription.
///
/// Handlers run on the poster's task and must only touch worker-local state;
/// anything slow or fallible belongs elsewhere.
pub trait EventSink: Send + Sync {
    /// Handle one event published for the subscribed source.
    fn handle(&self, event: &TargetEvent);
}

/// Inter-worker event bus.
///
/// Subscriptions are weak: the bus never keeps a sink alive, so a dropped
/// engine silently stops receiving events.
#[async_trait]
pub trait EventBus: Send + Sync + fmt::Debug {
    /// Publish an event under `source`.
    async fn post(&self, source: &str, event: TargetEvent) -> Result<(), BusError>;

    /// Subscribe `sink` to events published under `source`.
    fn register_weak(&self, source: &str, sink: Weak<dyn EventSink>);

    /// Drop every subscription registered under `source`.
    fn unregister(&self, source: &str);
}
