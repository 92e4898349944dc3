//! Per-worker target index
//!
//! A cache of what is in the shared store: an insertion-ordered list plus a
//! two-layer `ip -> port -> hostname` map for O(1) lookup. Kept current by
//! the local registry operations and the event-bus subscriber; the shared
//! store remains the source of truth.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use vigil_core::{HealthState, Target};

/// One registered target plus this worker's view of its health.
#[derive(Debug)]
pub(crate) struct TargetEntry {
    /// The registered target
    pub(crate) target: Target,
    health: AtomicU8,
}

impl TargetEntry {
    fn new(target: Target, health: HealthState) -> Self {
        Self {
            target,
            health: AtomicU8::new(health.as_u8()),
        }
    }

    /// Current internal health.
    pub(crate) fn health(&self) -> HealthState {
        HealthState::from_u8(self.health.load(Ordering::Relaxed)).unwrap_or(HealthState::Healthy)
    }

    /// Replace the internal health.
    pub(crate) fn set_health(&self, health: HealthState) {
        self.health.store(health.as_u8(), Ordering::Relaxed);
    }
}

/// Per-worker target index.
#[derive(Debug, Default)]
pub(crate) struct Index {
    list: Vec<Arc<TargetEntry>>,
    by_ip: HashMap<String, HashMap<u16, HashMap<String, Arc<TargetEntry>>>>,
}

impl Index {
    /// Look up a target by its identity triple.
    pub(crate) fn get(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
    ) -> Option<Arc<TargetEntry>> {
        self.by_ip
            .get(ip)?
            .get(&port)?
            .get(hostname.unwrap_or(ip))
            .cloned()
    }

    /// Insert a target; an already-present triple is left untouched.
    pub(crate) fn insert(&mut self, target: Target, health: HealthState) -> Arc<TargetEntry> {
        if let Some(existing) = self.get(&target.ip, target.port, target.hostname.as_deref()) {
            return existing;
        }

        let entry = Arc::new(TargetEntry::new(target, health));
        let target = &entry.target;
        self.by_ip
            .entry(target.ip.clone())
            .or_default()
            .entry(target.port)
            .or_default()
            .insert(target.hostname_or_ip().to_string(), Arc::clone(&entry));
        self.list.push(Arc::clone(&entry));
        entry
    }

    /// Remove a target, pruning leaf maps left empty.
    pub(crate) fn remove(
        &mut self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
    ) -> Option<Arc<TargetEntry>> {
        let ports = self.by_ip.get_mut(ip)?;
        let hostnames = ports.get_mut(&port)?;
        let removed = hostnames.remove(hostname.unwrap_or(ip))?;

        if hostnames.is_empty() {
            ports.remove(&port);
        }
        if ports.is_empty() {
            self.by_ip.remove(ip);
        }

        self.list.retain(|entry| !Arc::ptr_eq(entry, &removed));
        Some(removed)
    }

    /// Drop every target.
    pub(crate) fn clear(&mut self) {
        self.list.clear();
        self.by_ip.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    /// Ordered snapshot of the registered targets.
    pub(crate) fn targets(&self) -> Vec<Target> {
        self.list.iter().map(|entry| entry.target.clone()).collect()
    }

    /// Targets whose boolean verdict matches `healthy`, in insertion order.
    pub(crate) fn matching(&self, healthy: bool) -> Vec<Target> {
        self.list
            .iter()
            .filter(|entry| entry.health().is_healthy() == healthy)
            .map(|entry| entry.target.clone())
            .collect()
    }
}
