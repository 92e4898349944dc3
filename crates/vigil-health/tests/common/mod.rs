//! Shared fixtures for the integration suites

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use vigil_core::{EventBus, EventSink, HealthState, InProcessBus, TargetEvent};
use vigil_health::{Checker, CheckerConfig};
use vigil_store::{InMemoryStore, SharedStore};

/// A simulated fleet: one shared store segment plus one event bus, shared
/// by every checker built from it.
pub struct Cluster {
    pub store: Arc<dyn SharedStore>,
    pub bus: Arc<InProcessBus>,
}

impl Cluster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            bus: Arc::new(InProcessBus::new()),
        }
    }

    /// Build one peer worker over the shared segment and bus.
    pub async fn checker(&self, config: CheckerConfig) -> Checker {
        Checker::new(config, Arc::clone(&self.store), self.bus.clone())
            .await
            .unwrap()
    }

    /// Record every event posted for the engine named `name`.
    #[allow(dead_code)]
    pub fn watch_events(&self, name: &str) -> Arc<EventLog> {
        let log = Arc::new(EventLog::default());
        let weak: Weak<dyn EventSink> = Arc::downgrade(&(log.clone() as Arc<dyn EventSink>));
        self.bus.register_weak(&format!("vigil:{name}"), weak);
        log
    }
}

/// Event recorder used to assert on fanout behavior.
#[allow(dead_code)]
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<TargetEvent>>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn events(&self) -> Vec<TargetEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Number of recorded verdict events carrying the given health.
    pub fn health_count(&self, health: HealthState) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, TargetEvent::Health { health: h, .. } if *h == health))
            .count()
    }
}

impl EventSink for EventLog {
    fn handle(&self, event: &TargetEvent) {
        self.events.lock().push(event.clone());
    }
}
