//! Observability helpers
//!
//! Free-standing read-only access to an engine's persisted state, usable by
//! tooling that has the shared store but no `Checker` handle.

use crate::codec::{self, Counter, KeySpace};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use vigil_core::{HealthState, Target};
use vigil_store::SharedStore;

/// Per-category counter values unpacked from a target's counter word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterBreakdown {
    /// Consecutive successes
    pub success: u8,
    /// Consecutive HTTP-status failures
    pub http_failure: u8,
    /// Consecutive TCP-layer failures
    pub tcp_failure: u8,
    /// Consecutive timeout failures
    pub timeout_failure: u8,
}

impl CounterBreakdown {
    /// Unpack a counter word.
    pub fn from_word(word: u32) -> Self {
        Self {
            success: codec::extract(word, Counter::Success),
            http_failure: codec::extract(word, Counter::HttpFailure),
            tcp_failure: codec::extract(word, Counter::TcpFailure),
            timeout_failure: codec::extract(word, Counter::TimeoutFailure),
        }
    }
}

/// One registered target decorated with its persisted state.
#[derive(Debug, Clone, Serialize)]
pub struct TargetInfo {
    /// The registered target
    pub target: Target,
    /// Stored internal health; `None` when the state key is missing
    pub health: Option<HealthState>,
    /// Counter breakdown
    pub counters: CounterBreakdown,
}

/// Read the target list of engine `name`, each target decorated with its
/// stored health state and counter breakdown.
pub async fn get_target_list(
    name: &str,
    store: &Arc<dyn SharedStore>,
) -> Result<Vec<TargetInfo>> {
    let keys = KeySpace::new(name);
    let list = codec::decode_target_list(store.get(&keys.target_list()).await?)?;

    let mut infos = Vec::with_capacity(list.len());
    for target in list {
        let health = codec::decode_state(store.get(&keys.state(&target)).await?)?;
        let word = codec::decode_counter_word(store.get(&keys.counter(&target)).await?)?;
        infos.push(TargetInfo {
            health,
            counters: CounterBreakdown::from_word(word),
            target,
        });
    }

    Ok(infos)
}
