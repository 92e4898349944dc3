//! The health-checker engine
//!
//! A `Checker` is one worker's handle onto a fleet-wide engine instance:
//! the target registry and all per-target state live in the shared store,
//! verdict transitions fan out over the event bus, and each worker keeps a
//! local index as a cache. Several `Checker`s constructed with the same
//! name over the same store and bus behave as peer workers.

use crate::codec::{self, Counter, KeySpace, FAILURE_MASK, SUCCESS_MASK};
use crate::config::{CheckKind, CheckType, CheckerConfig};
use crate::deferred::DeferredQueue;
use crate::index::Index;
use crate::scheduler::{self, TickMode};
use crate::{tls, Error, Result};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vigil_core::{EventBus, EventSink, HealthState, Target, TargetEvent};
use vigil_store::{lock, SharedStore};

/// Acquire budget for shared-store locks.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// TTL on held lock keys; an abandoned lock self-releases.
const LOCK_EXPIRE: Duration = Duration::from_secs(10);

/// Acquire attempts a deferred operation makes before giving up.
const DEFERRED_ATTEMPTS: u32 = 5;

/// How a lock-guarded mutation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The mutation ran before the call returned
    Ran,
    /// The lock was contended; the mutation was queued and applies
    /// asynchronously
    Deferred,
}

/// Direction of a health observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HealthMode {
    Healthy,
    Unhealthy,
}

impl HealthMode {
    fn target_state(self) -> HealthState {
        match self {
            HealthMode::Healthy => HealthState::Healthy,
            HealthMode::Unhealthy => HealthState::Unhealthy,
        }
    }
}

/// A lock-guarded mutation; invoked again when the mutation is deferred.
type LockedOp = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// Multi-worker health checker.
///
/// Cheap to clone; all clones share the same engine state.
#[derive(Debug, Clone)]
pub struct Checker {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    /// Self-reference so `&self` methods can hand owned handles to closures
    /// and tasks without keeping the engine alive from those methods alone
    weak_self: Weak<Inner>,
    pub(crate) config: CheckerConfig,
    pub(crate) keys: KeySpace,
    pub(crate) store: Arc<dyn SharedStore>,
    pub(crate) bus: Arc<dyn EventBus>,
    pub(crate) index: RwLock<Index>,
    pub(crate) tls: Option<Arc<rustls::ClientConfig>>,
    pub(crate) shutdown: watch::Sender<bool>,
    status_ver: AtomicU64,
    started: AtomicBool,
    tickers: Mutex<Vec<JoinHandle<()>>>,
    deferred: DeferredQueue,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inner")
            .field("name", &self.config.name)
            .finish_non_exhaustive()
    }
}

impl Checker {
    /// Create a new checker over the given store segment and event bus.
    ///
    /// The configuration is validated and TLS material parsed here; both are
    /// fatal when invalid. Targets already registered in the segment by peer
    /// workers are adopted into the local index. The checker subscribes
    /// itself weakly on the bus, so dropping every clone ends the
    /// subscription.
    pub async fn new(
        config: CheckerConfig,
        store: Arc<dyn SharedStore>,
        bus: Arc<dyn EventBus>,
    ) -> Result<Self> {
        config.validate()?;

        let identity = match (&config.ssl_cert, &config.ssl_key) {
            (Some(cert), Some(key)) => {
                Some((tls::parse_cert_chain(cert)?, tls::parse_private_key(key)?))
            }
            _ => None,
        };

        let tls = if config.checks.active.check_type == CheckType::Https {
            Some(tls::client_config(
                config.checks.active.https_verify_certificate,
                identity,
            )?)
        } else {
            None
        };

        let keys = KeySpace::new(&config.name);
        let (shutdown, _) = watch::channel(false);

        let inner = Arc::new_cyclic(|weak| Inner {
            weak_self: weak.clone(),
            keys,
            store,
            bus,
            index: RwLock::new(Index::default()),
            tls,
            shutdown,
            status_ver: AtomicU64::new(0),
            started: AtomicBool::new(false),
            tickers: Mutex::new(Vec::new()),
            deferred: DeferredQueue::spawn(),
            config,
        });

        let sink: Arc<dyn EventSink> = inner.clone();
        inner
            .bus
            .register_weak(inner.keys.source(), Arc::downgrade(&sink));

        inner.adopt_registered_targets().await?;

        info!(
            name = %inner.config.name,
            targets = inner.index.read().len(),
            "health checker created"
        );

        Ok(Self { inner })
    }

    /// Engine instance name.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Worker-local version counter.
    ///
    /// Increments exactly when some target's boolean verdict flips, so
    /// consumers can poll it to detect changes cheaply.
    pub fn status_ver(&self) -> u64 {
        self.inner.status_ver.load(Ordering::Relaxed)
    }

    /// Ordered snapshot of the targets this worker knows.
    pub fn targets(&self) -> Vec<Target> {
        self.inner.index.read().targets()
    }

    /// Register a target.
    ///
    /// Re-adding a registered triple is a no-op that preserves its state and
    /// counters. New targets start `healthy` or `unhealthy` per
    /// `healthy_init`, and every worker learns of them through the posted
    /// verdict event.
    pub async fn add_target(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        healthy_init: bool,
        hostheader: Option<&str>,
    ) -> Result<LockOutcome> {
        let mut target = Target::new(ip, port, hostname.map(str::to_string));
        if let Some(hostheader) = hostheader {
            target = target.with_hostheader(hostheader);
        }
        let state = if healthy_init {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };

        let inner = Arc::clone(&self.inner);
        let op: LockedOp = Arc::new(move || {
            let inner = Arc::clone(&inner);
            let target = target.clone();
            Box::pin(async move {
                let mut list = inner.load_target_list().await?;
                if list
                    .iter()
                    .any(|t| t.matches(&target.ip, target.port, target.hostname.as_deref()))
                {
                    debug!(target = %target, "target already registered");
                    return Ok(());
                }

                // State before list: a peer initializing from the store must
                // never see a listed target without a state key.
                inner
                    .store
                    .set(&inner.keys.state(&target), codec::encode_state(state), None)
                    .await?;

                list.push(target.clone());
                inner
                    .store
                    .set(
                        &inner.keys.target_list(),
                        codec::encode_target_list(&list)?,
                        None,
                    )
                    .await?;

                info!(target = %target, initial = %state, "target added");
                inner.raise_health_event(&target, state).await;
                Ok(())
            })
        });

        self.inner
            .locked(self.inner.keys.target_list_lock(), op)
            .await
    }

    /// Deregister a target.
    ///
    /// Removing an unknown triple is a no-op.
    pub async fn remove_target(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
    ) -> Result<LockOutcome> {
        let ip = ip.to_string();
        let hostname = hostname.map(str::to_string);

        let inner = Arc::clone(&self.inner);
        let op: LockedOp = Arc::new(move || {
            let inner = Arc::clone(&inner);
            let ip = ip.clone();
            let hostname = hostname.clone();
            Box::pin(async move {
                let mut list = inner.load_target_list().await?;
                let Some(pos) = list
                    .iter()
                    .position(|t| t.matches(&ip, port, hostname.as_deref()))
                else {
                    debug!(ip = %ip, port, "target not registered");
                    return Ok(());
                };
                let target = list.remove(pos);

                // List before state: the list must stop referencing the
                // target before its keys are erased, or a peer could reload
                // a stateless target.
                inner
                    .store
                    .set(
                        &inner.keys.target_list(),
                        codec::encode_target_list(&list)?,
                        None,
                    )
                    .await?;
                inner.store.delete(&inner.keys.state(&target)).await?;
                inner.store.delete(&inner.keys.counter(&target)).await?;

                info!(target = %target, "target removed");
                inner
                    .raise_event(TargetEvent::Remove {
                        ip: target.ip.clone(),
                        port: target.port,
                        hostname: target.hostname.clone(),
                    })
                    .await;
                Ok(())
            })
        });

        self.inner
            .locked(self.inner.keys.target_list_lock(), op)
            .await
    }

    /// Deregister every target.
    pub async fn clear(&self) -> Result<LockOutcome> {
        // The local view empties immediately; peers follow via the event.
        self.inner.index.write().clear();

        let inner = Arc::clone(&self.inner);
        let op: LockedOp = Arc::new(move || {
            let inner = Arc::clone(&inner);
            Box::pin(async move {
                let old = inner.load_target_list().await?;
                inner
                    .store
                    .set(
                        &inner.keys.target_list(),
                        codec::encode_target_list(&[])?,
                        None,
                    )
                    .await?;
                for target in &old {
                    inner.store.delete(&inner.keys.state(target)).await?;
                    inner.store.delete(&inner.keys.counter(target)).await?;
                }

                info!(removed = old.len(), "target registry cleared");
                inner.raise_event(TargetEvent::Clear).await;
                Ok(())
            })
        });

        self.inner
            .locked(self.inner.keys.target_list_lock(), op)
            .await
    }

    /// Boolean verdict for a target.
    pub fn get_target_status(&self, ip: &str, port: u16, hostname: Option<&str>) -> Result<bool> {
        let entry = self
            .inner
            .index
            .read()
            .get(ip, port, hostname)
            .ok_or_else(|| Error::TargetNotFound {
                ip: ip.to_string(),
                port,
            })?;
        Ok(entry.health().is_healthy())
    }

    /// Report a generic failure.
    ///
    /// Counts as an HTTP failure for http(s) profiles and as a TCP failure
    /// for tcp profiles.
    pub async fn report_failure(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        kind: CheckKind,
    ) -> Result<LockOutcome> {
        let counter = match self.inner.config.checks.profile_type(kind) {
            CheckType::Http | CheckType::Https => Counter::HttpFailure,
            CheckType::Tcp => Counter::TcpFailure,
        };
        self.report(ip, port, hostname, HealthMode::Unhealthy, counter, kind)
            .await
    }

    /// Report a success.
    pub async fn report_success(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        kind: CheckKind,
    ) -> Result<LockOutcome> {
        self.report(ip, port, hostname, HealthMode::Healthy, Counter::Success, kind)
            .await
    }

    /// Report a TCP-layer failure (connect/send/receive).
    pub async fn report_tcp_failure(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        kind: CheckKind,
    ) -> Result<LockOutcome> {
        self.report(
            ip,
            port,
            hostname,
            HealthMode::Unhealthy,
            Counter::TcpFailure,
            kind,
        )
        .await
    }

    /// Report a timeout failure.
    pub async fn report_timeout(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        kind: CheckKind,
    ) -> Result<LockOutcome> {
        self.report(
            ip,
            port,
            hostname,
            HealthMode::Unhealthy,
            Counter::TimeoutFailure,
            kind,
        )
        .await
    }

    /// Report an observed HTTP status code.
    ///
    /// Routes through the profile's status sets: a healthy status counts as
    /// a success, an unhealthy status (or a missing/zero code, as produced
    /// by an unparseable status line) as an HTTP failure. A status in
    /// neither set is ignored and returns `None`.
    pub async fn report_http_status(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        status: Option<u16>,
        kind: CheckKind,
    ) -> Result<Option<LockOutcome>> {
        self.inner
            .http_status_report(ip, port, hostname, status, kind)
            .await
    }

    /// Force a target's verdict, bypassing the state machine.
    ///
    /// Counters restart from zero and the verdict event is posted
    /// unconditionally.
    pub async fn set_target_status(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        healthy: bool,
    ) -> Result<LockOutcome> {
        let entry = self
            .inner
            .index
            .read()
            .get(ip, port, hostname)
            .ok_or_else(|| Error::TargetNotFound {
                ip: ip.to_string(),
                port,
            })?;
        self.inner.force_status(entry.target.clone(), healthy).await
    }

    /// Force the verdict of every target with the given hostname and port.
    ///
    /// Individual failures do not stop the sweep; they are aggregated into
    /// a single [`Error::Bulk`].
    pub async fn set_all_target_statuses_for_hostname(
        &self,
        hostname: &str,
        port: u16,
        healthy: bool,
    ) -> Result<()> {
        let matched: Vec<Target> = self
            .inner
            .index
            .read()
            .targets()
            .into_iter()
            .filter(|t| t.hostname_or_ip() == hostname && t.port == port)
            .collect();

        let mut errors = Vec::new();
        for target in matched {
            let label = target.to_string();
            if let Err(err) = self.inner.force_status(target, healthy).await {
                errors.push(format!("{label}: {err}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Bulk(errors.join("; ")))
        }
    }

    /// Start the periodic active checks.
    ///
    /// One ticker per verdict class, each disabled when its interval is 0.
    /// Errors when the tickers are already running.
    pub fn start(&self) -> Result<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }
        self.inner.shutdown.send_replace(false);

        let active = &self.inner.config.checks.active;
        let mut tickers = self.inner.tickers.lock();
        for (mode, interval) in [
            (TickMode::Healthy, active.healthy.interval),
            (TickMode::Unhealthy, active.unhealthy.interval),
        ] {
            if interval > 0.0 {
                tickers.push(scheduler::spawn_ticker(
                    &self.inner,
                    mode,
                    Duration::from_secs_f64(interval),
                ));
            }
        }

        info!(name = %self.inner.config.name, "active health checks started");
        Ok(())
    }

    /// Stop the periodic active checks.
    ///
    /// Returns immediately; in-flight probes finish naturally and no new
    /// probes are issued.
    pub fn stop(&self) {
        if !self.inner.started.swap(false, Ordering::SeqCst) {
            return;
        }

        self.inner.shutdown.send_replace(true);
        self.inner.tickers.lock().clear();

        info!(name = %self.inner.config.name, "active health checks stopped");
    }

    async fn report(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        mode: HealthMode,
        counter: Counter,
        kind: CheckKind,
    ) -> Result<LockOutcome> {
        let threshold = self.inner.config.checks.threshold(kind, counter);
        self.inner
            .run_report(ip, port, hostname, mode, counter, threshold)
            .await
    }
}

impl Inner {
    /// Whether this worker is shutting down.
    pub(crate) fn worker_exiting(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn load_target_list(&self) -> Result<Vec<Target>> {
        codec::decode_target_list(self.store.get(&self.keys.target_list()).await?)
    }

    /// Seed the local index with targets peer workers registered earlier.
    async fn adopt_registered_targets(&self) -> Result<()> {
        let list = self.load_target_list().await?;

        let mut seeded = Vec::with_capacity(list.len());
        for target in list {
            let health = match codec::decode_state(self.store.get(&self.keys.state(&target)).await?)?
            {
                Some(health) => health,
                None => {
                    // add/remove ordering makes this unreachable; stay tolerant
                    warn!(target = %target, "listed target has no state key");
                    HealthState::Healthy
                }
            };
            seeded.push((target, health));
        }

        let mut index = self.index.write();
        for (target, health) in seeded {
            index.insert(target, health);
        }
        Ok(())
    }

    /// Run `op` under the named store lock, or defer it when contended.
    async fn locked(&self, key: String, op: LockedOp) -> Result<LockOutcome> {
        match lock::acquire(&self.store, &key, LOCK_TIMEOUT, LOCK_EXPIRE).await? {
            Some(guard) => {
                let result = op().await;
                guard.release().await;
                result.map(|()| LockOutcome::Ran)
            }
            None => {
                warn!(key = %key, "lock contended; deferring operation");
                self.defer_locked(key, op);
                Ok(LockOutcome::Deferred)
            }
        }
    }

    /// Queue a contended operation for retry off the caller's back.
    fn defer_locked(&self, key: String, op: LockedOp) {
        let Some(inner) = self.weak_self.upgrade() else {
            return;
        };
        self.deferred.push(Box::pin(async move {
            for attempt in 1..=DEFERRED_ATTEMPTS {
                match lock::acquire(&inner.store, &key, LOCK_TIMEOUT, LOCK_EXPIRE).await {
                    Ok(Some(guard)) => {
                        if let Err(err) = op().await {
                            warn!(key = %key, error = %err, "deferred operation failed");
                        }
                        guard.release().await;
                        return;
                    }
                    Ok(None) => {
                        debug!(key = %key, attempt, "deferred lock still contended");
                    }
                    Err(err) => {
                        warn!(key = %key, error = %err, "deferred lock acquisition error");
                        return;
                    }
                }
            }
            warn!(key = %key, "giving up on deferred operation");
        }));
    }

    /// Counter-threshold state machine entry point.
    pub(crate) async fn run_report(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        mode: HealthMode,
        counter: Counter,
        threshold: u32,
    ) -> Result<LockOutcome> {
        // Category disabled by configuration
        if threshold == 0 {
            return Ok(LockOutcome::Ran);
        }

        let entry = self.index.read().get(ip, port, hostname);
        let Some(entry) = entry else {
            // Transient sync lag; a future event will bring the target
            warn!(ip, port, "health report for unknown target");
            return Ok(LockOutcome::Ran);
        };

        // A verdict already saturated in the report's direction cannot move
        let current = entry.health();
        if matches!(
            (mode, current),
            (HealthMode::Healthy, HealthState::Healthy)
                | (HealthMode::Unhealthy, HealthState::Unhealthy)
        ) {
            return Ok(LockOutcome::Ran);
        }

        let target = entry.target.clone();
        let lock_key = self.keys.target_lock(&target);
        let Some(inner) = self.weak_self.upgrade() else {
            return Ok(LockOutcome::Ran);
        };
        let op: LockedOp = Arc::new(move || {
            let inner = Arc::clone(&inner);
            let target = target.clone();
            Box::pin(async move { inner.apply_report(&target, mode, counter, threshold).await })
        });
        self.locked(lock_key, op).await
    }

    /// Slow path of the state machine, run under the per-target lock.
    async fn apply_report(
        &self,
        target: &Target,
        mode: HealthMode,
        counter: Counter,
        threshold: u32,
    ) -> Result<()> {
        let counter_key = self.keys.counter(target);

        // The increment is atomic in the store; masking the other lanes is
        // a read-modify-write serialized by the per-target lock.
        let raw = self.store.incr(&counter_key, 1i64 << counter.shift()).await?;
        let word = codec::saturate(codec::truncate_word(raw), counter);
        let ctr = codec::extract(word, counter);

        let masked = match mode {
            HealthMode::Healthy => word & SUCCESS_MASK,
            HealthMode::Unhealthy => word & FAILURE_MASK,
        };
        if i64::from(masked) != raw {
            self.store
                .set(&counter_key, codec::encode_counter_word(masked), None)
                .await?;
        }

        let current = {
            let index = self.index.read();
            match index.get(&target.ip, target.port, target.hostname.as_deref()) {
                Some(entry) => entry.health(),
                // Removed while we waited on the lock
                None => return Ok(()),
            }
        };

        let new_health = if u32::from(ctr) >= threshold {
            Some(mode.target_state())
        } else if current == HealthState::Healthy && masked & FAILURE_MASK != 0 {
            Some(HealthState::MostlyHealthy)
        } else if current == HealthState::Unhealthy && masked & SUCCESS_MASK != 0 {
            Some(HealthState::MostlyUnhealthy)
        } else {
            None
        };

        if let Some(new_health) = new_health {
            if new_health != current {
                self.store
                    .set(&self.keys.state(target), codec::encode_state(new_health), None)
                    .await?;
                self.raise_health_event(target, new_health).await;
            }
        }

        Ok(())
    }

    /// Route an observed HTTP status through the profile's status sets.
    pub(crate) async fn http_status_report(
        &self,
        ip: &str,
        port: u16,
        hostname: Option<&str>,
        status: Option<u16>,
        kind: CheckKind,
    ) -> Result<Option<LockOutcome>> {
        // A missing status (unparseable status line) behaves like code 0
        let code = status.unwrap_or(0);
        let checks = &self.config.checks;

        if checks.healthy_statuses(kind).contains(&code) {
            let threshold = checks.threshold(kind, Counter::Success);
            return self
                .run_report(ip, port, hostname, HealthMode::Healthy, Counter::Success, threshold)
                .await
                .map(Some);
        }

        if code == 0 || checks.unhealthy_statuses(kind).contains(&code) {
            let threshold = checks.threshold(kind, Counter::HttpFailure);
            return self
                .run_report(
                    ip,
                    port,
                    hostname,
                    HealthMode::Unhealthy,
                    Counter::HttpFailure,
                    threshold,
                )
                .await
                .map(Some);
        }

        debug!(ip, port, code, "http status in neither profile set; ignored");
        Ok(None)
    }

    /// Forced verdict override, bypassing the state machine.
    pub(crate) async fn force_status(
        &self,
        target: Target,
        healthy: bool,
    ) -> Result<LockOutcome> {
        let state = if healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };
        let lock_key = self.keys.target_lock(&target);

        let Some(inner) = self.weak_self.upgrade() else {
            return Ok(LockOutcome::Ran);
        };
        let op: LockedOp = Arc::new(move || {
            let inner = Arc::clone(&inner);
            let target = target.clone();
            Box::pin(async move {
                inner
                    .store
                    .set(
                        &inner.keys.counter(&target),
                        codec::encode_counter_word(0),
                        None,
                    )
                    .await?;
                inner
                    .store
                    .set(&inner.keys.state(&target), codec::encode_state(state), None)
                    .await?;

                info!(target = %target, forced = %state, "target status forced");
                inner.raise_health_event(&target, state).await;
                Ok(())
            })
        });
        self.locked(lock_key, op).await
    }

    async fn raise_health_event(&self, target: &Target, health: HealthState) {
        self.raise_event(TargetEvent::Health {
            ip: target.ip.clone(),
            port: target.port,
            hostname: target.hostname.clone(),
            health,
        })
        .await;
    }

    /// Post an event; failures are logged, never propagated.
    async fn raise_event(&self, event: TargetEvent) {
        if let Err(err) = self.bus.post(self.keys.source(), event).await {
            warn!(error = %err, "failed to post event");
        }
    }
}

impl EventSink for Inner {
    fn handle(&self, event: &TargetEvent) {
        match event {
            TargetEvent::Health {
                ip,
                port,
                hostname,
                health,
            } => {
                let mut index = self.index.write();
                match index.get(ip, *port, hostname.as_deref()) {
                    Some(entry) => {
                        let before = entry.health();
                        if before == *health {
                            return;
                        }
                        entry.set_health(*health);
                        if before.is_healthy() != health.is_healthy() {
                            self.status_ver.fetch_add(1, Ordering::Relaxed);
                        }
                        info!(
                            ip = %ip,
                            port,
                            from = %before,
                            to = %health,
                            "target health changed"
                        );
                    }
                    None => {
                        // First sight of a target registered by a peer
                        index.insert(
                            Target::new(ip.clone(), *port, hostname.clone()),
                            *health,
                        );
                        debug!(ip = %ip, port, health = %health, "target learned from event");
                    }
                }
            }
            TargetEvent::Remove { ip, port, hostname } => {
                let mut index = self.index.write();
                if index.remove(ip, *port, hostname.as_deref()).is_none() {
                    warn!(ip = %ip, port, "remove event for unknown target");
                }
            }
            TargetEvent::Clear => {
                let mut index = self.index.write();
                debug!(dropped = index.len(), "clearing local index");
                index.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_mode_target_state() {
        assert_eq!(HealthMode::Healthy.target_state(), HealthState::Healthy);
        assert_eq!(HealthMode::Unhealthy.target_state(), HealthState::Unhealthy);
    }
}
