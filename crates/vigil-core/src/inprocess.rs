//! In-process event bus implementation

use crate::bus::{BusError, EventBus, EventSink};
use crate::event::TargetEvent;
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

/// In-process event bus.
///
/// Dispatches synchronously to every live subscriber of a source and prunes
/// dead weak references on each post. One instance shared by several engines
/// stands in for the cluster-wide bus shared by peer workers.
#[derive(Clone, Default)]
pub struct InProcessBus {
    sinks: Arc<DashMap<String, Vec<Weak<dyn EventSink>>>>,
}

impl InProcessBus {
    /// Create a new bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscriptions for `source`.
    pub fn subscriber_count(&self, source: &str) -> usize {
        self.sinks
            .get(source)
            .map(|sinks| sinks.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }
}

impl fmt::Debug for InProcessBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InProcessBus")
            .field("sources", &self.sinks.len())
            .finish()
    }
}

#[async_trait]
impl EventBus for InProcessBus {
    async fn post(&self, source: &str, event: TargetEvent) -> Result<(), BusError> {
        // Collect upgraded sinks before dispatching so handlers never run
        // under the map shard guard.
        let live: Vec<Arc<dyn EventSink>> = match self.sinks.get_mut(source) {
            Some(mut sinks) => {
                sinks.retain(|w| w.strong_count() > 0);
                sinks.iter().filter_map(Weak::upgrade).collect()
            }
            None => Vec::new(),
        };

        trace!(source, subscribers = live.len(), "dispatching event");

        for sink in live {
            sink.handle(&event);
        }

        Ok(())
    }

    fn register_weak(&self, source: &str, sink: Weak<dyn EventSink>) {
        self.sinks.entry(source.to_string()).or_default().push(sink);
    }

    fn unregister(&self, source: &str) {
        self.sinks.remove(source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthState;
    use parking_lot::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<TargetEvent>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }
    }

    impl EventSink for RecordingSink {
        fn handle(&self, event: &TargetEvent) {
            self.events.lock().push(event.clone());
        }
    }

    fn health_event(ip: &str) -> TargetEvent {
        TargetEvent::Health {
            ip: ip.to_string(),
            port: 80,
            hostname: None,
            health: HealthState::Healthy,
        }
    }

    #[tokio::test]
    async fn test_post_reaches_all_subscribers() {
        let bus = InProcessBus::new();
        let a = RecordingSink::new();
        let b = RecordingSink::new();

        let weak_a: Weak<dyn EventSink> = Arc::downgrade(&(a.clone() as Arc<dyn EventSink>));
        let weak_b: Weak<dyn EventSink> = Arc::downgrade(&(b.clone() as Arc<dyn EventSink>));
        bus.register_weak("upstream", weak_a);
        bus.register_weak("upstream", weak_b);

        bus.post("upstream", health_event("10.0.0.1")).await.unwrap();

        assert_eq!(a.events.lock().len(), 1);
        assert_eq!(b.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_sources_are_isolated() {
        let bus = InProcessBus::new();
        let sink = RecordingSink::new();

        let weak: Weak<dyn EventSink> = Arc::downgrade(&(sink.clone() as Arc<dyn EventSink>));
        bus.register_weak("upstream-a", weak);

        bus.post("upstream-b", health_event("10.0.0.1"))
            .await
            .unwrap();
        assert!(sink.events.lock().is_empty());

        bus.post("upstream-a", health_event("10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(sink.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_sink_is_pruned() {
        let bus = InProcessBus::new();
        let sink = RecordingSink::new();

        let weak: Weak<dyn EventSink> = Arc::downgrade(&(sink.clone() as Arc<dyn EventSink>));
        bus.register_weak("upstream", weak);
        assert_eq!(bus.subscriber_count("upstream"), 1);

        drop(sink);

        bus.post("upstream", health_event("10.0.0.1")).await.unwrap();
        assert_eq!(bus.subscriber_count("upstream"), 0);
    }

    #[tokio::test]
    async fn test_unregister() {
        let bus = InProcessBus::new();
        let sink = RecordingSink::new();

        let weak: Weak<dyn EventSink> = Arc::downgrade(&(sink.clone() as Arc<dyn EventSink>));
        bus.register_weak("upstream", weak);
        bus.unregister("upstream");

        bus.post("upstream", health_event("10.0.0.1")).await.unwrap();
        assert!(sink.events.lock().is_empty());
    }
}
