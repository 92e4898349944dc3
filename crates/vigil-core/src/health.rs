//! Internal health states and their boolean projection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal health of a target.
///
/// The two "mostly" states are hysteretic intermediates: the verdict has not
/// flipped yet, but opposite-signal observations have started to arrive. The
/// boolean verdict exposed to callers is [`HealthState::is_healthy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// Fully healthy
    Healthy,
    /// Still healthy, but failures have started to accumulate
    MostlyHealthy,
    /// Still unhealthy, but successes have started to accumulate
    MostlyUnhealthy,
    /// Fully unhealthy
    Unhealthy,
}

impl HealthState {
    /// Boolean verdict: `true` for [`Healthy`](Self::Healthy) and
    /// [`MostlyHealthy`](Self::MostlyHealthy).
    pub fn is_healthy(self) -> bool {
        matches!(self, HealthState::Healthy | HealthState::MostlyHealthy)
    }

    /// Small-integer encoding used in the shared store.
    pub fn as_u8(self) -> u8 {
        match self {
            HealthState::Healthy => 1,
            HealthState::MostlyHealthy => 2,
            HealthState::MostlyUnhealthy => 3,
            HealthState::Unhealthy => 4,
        }
    }

    /// Decode the shared-store encoding.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(HealthState::Healthy),
            2 => Some(HealthState::MostlyHealthy),
            3 => Some(HealthState::MostlyUnhealthy),
            4 => Some(HealthState::Unhealthy),
            _ => None,
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::MostlyHealthy => write!(f, "mostly_healthy"),
            HealthState::MostlyUnhealthy => write!(f, "mostly_unhealthy"),
            HealthState::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_projection() {
        assert!(HealthState::Healthy.is_healthy());
        assert!(HealthState::MostlyHealthy.is_healthy());
        assert!(!HealthState::MostlyUnhealthy.is_healthy());
        assert!(!HealthState::Unhealthy.is_healthy());
    }

    #[test]
    fn test_store_encoding_round_trip() {
        for state in [
            HealthState::Healthy,
            HealthState::MostlyHealthy,
            HealthState::MostlyUnhealthy,
            HealthState::Unhealthy,
        ] {
            assert_eq!(HealthState::from_u8(state.as_u8()), Some(state));
        }
        assert_eq!(HealthState::from_u8(0), None);
        assert_eq!(HealthState::from_u8(5), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(HealthState::Healthy.to_string(), "healthy");
        assert_eq!(HealthState::MostlyHealthy.to_string(), "mostly_healthy");
        assert_eq!(HealthState::MostlyUnhealthy.to_string(), "mostly_unhealthy");
        assert_eq!(HealthState::Unhealthy.to_string(), "unhealthy");
    }
}
