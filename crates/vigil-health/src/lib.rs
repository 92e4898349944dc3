//! # Vigil Health
//!
//! A multi-worker health-checking engine for network endpoints, built to be
//! embedded in a reverse proxy or load balancer:
//!
//! - **Target registry** shared across workers through a [`SharedStore`]
//!   segment, with a per-worker index for O(1) lookup
//! - **Counter-threshold state machine** turning success/failure streams
//!   into a four-state hysteretic verdict
//! - **Passive reports** fed in from real traffic and **active probes**
//!   (TCP connect, optional TLS handshake, optional HTTP GET) the engine
//!   issues itself
//! - **Event fanout** keeping every worker's view consistent, with a
//!   fleet-wide period lock so only one worker probes per tick
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil_core::InProcessBus;
//! use vigil_health::{CheckKind, Checker, CheckerConfig};
//! use vigil_store::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> vigil_health::Result<()> {
//!     let checker = Checker::new(
//!         CheckerConfig::new("upstream"),
//!         Arc::new(InMemoryStore::new()),
//!         Arc::new(InProcessBus::new()),
//!     )
//!     .await?;
//!
//!     checker.add_target("10.0.0.1", 80, None, true, None).await?;
//!     checker
//!         .report_http_status("10.0.0.1", 80, None, Some(503), CheckKind::Passive)
//!         .await?;
//!
//!     let healthy = checker.get_target_status("10.0.0.1", 80, None)?;
//!     println!("10.0.0.1:80 healthy = {healthy}");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

mod checker;
mod codec;
mod config;
mod deferred;
mod error;
mod index;
mod prober;
mod scheduler;
mod status;
mod tls;

pub use checker::{Checker, LockOutcome};
pub use codec::{extract, pack, Counter};
pub use config::{
    ActiveChecks, ActiveHealthy, ActiveUnhealthy, CheckKind, CheckType, CheckerConfig,
    ChecksConfig, PassiveChecks, PassiveHealthy, PassiveUnhealthy,
};
pub use error::{Error, Result};
pub use status::{get_target_list, CounterBreakdown, TargetInfo};

// Seams this crate is wired through
pub use vigil_core::{EventBus, HealthState, InProcessBus, Target, TargetEvent};
pub use vigil_store::{InMemoryStore, SharedStore};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::checker::{Checker, LockOutcome};
    pub use crate::config::{CheckKind, CheckType, CheckerConfig};
    pub use crate::error::{Error, Result};
    pub use crate::status::{get_target_list, CounterBreakdown, TargetInfo};
    pub use vigil_core::{EventBus, HealthState, InProcessBus, Target, TargetEvent};
    pub use vigil_store::{InMemoryStore, SharedStore};
}
