//! Events fanned out to every worker of an engine instance

use crate::health::HealthState;
use serde::{Deserialize, Serialize};

/// An event published on the inter-worker bus.
///
/// Health events double as the propagation mechanism for `add`: a worker
/// receiving a verdict for a target it has never seen synthesizes the target
/// in its local index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TargetEvent {
    /// A target's internal health was (re)asserted
    Health {
        /// Target IP
        ip: String,
        /// Target port
        port: u16,
        /// Target hostname, when the target was registered with one
        hostname: Option<String>,
        /// The asserted internal health
        health: HealthState,
    },

    /// A target was removed from the registry
    Remove {
        /// Target IP
        ip: String,
        /// Target port
        port: u16,
        /// Target hostname, when the target was registered with one
        hostname: Option<String>,
    },

    /// The whole registry was cleared
    Clear,
}
