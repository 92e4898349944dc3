//! # Vigil Core
//!
//! Shared building blocks for the vigil health-checking engine:
//! - Target endpoint identity
//! - The four-state hysteretic health verdict
//! - Health/lifecycle events and the inter-worker event bus seam
//! - An in-process bus implementation for single-process deployments and tests

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

mod bus;
mod event;
mod health;
mod inprocess;
mod target;

pub use bus::{BusError, EventBus, EventSink};
pub use event::TargetEvent;
pub use health::HealthState;
pub use inprocess::InProcessBus;
pub use target::Target;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::bus::{BusError, EventBus, EventSink};
    pub use crate::event::TargetEvent;
    pub use crate::health::HealthState;
    pub use crate::inprocess::InProcessBus;
    pub use crate::target::Target;
}
