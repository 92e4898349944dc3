//! Shared-store codec: key namespace, counter word, persisted blobs
//!
//! Per target the store holds one 32-bit word packing four 8-bit counters,
//! one small integer for the internal health state, and the engine-wide
//! serialized target list. Store values are byte strings; integers are kept
//! in ASCII so the backend's atomic increment can operate on them.

use crate::{Error, Result};
use vigil_core::{HealthState, Target};

/// Global prefix of every key the engine writes.
const PREFIX: &str = "vigil";

/// One of the four 8-bit lanes of the packed counter word (LSB to MSB).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Consecutive successes
    Success,
    /// Consecutive HTTP-status failures
    HttpFailure,
    /// Consecutive TCP-layer failures
    TcpFailure,
    /// Consecutive timeout failures
    TimeoutFailure,
}

impl Counter {
    /// Bit offset of this counter's byte within the word.
    pub fn shift(self) -> u32 {
        match self {
            Counter::Success => 0,
            Counter::HttpFailure => 8,
            Counter::TcpFailure => 16,
            Counter::TimeoutFailure => 24,
        }
    }
}

/// Mask applied when a success is recorded: only the success byte survives.
/// Doubles as the selector for the success byte.
pub(crate) const SUCCESS_MASK: u32 = 0x0000_00ff;

/// Mask applied when any failure is recorded: the success byte is zeroed.
/// Doubles as the selector for the three failure bytes.
pub(crate) const FAILURE_MASK: u32 = 0xffff_ff00;

/// Extract one 8-bit counter from the packed word.
pub fn extract(word: u32, counter: Counter) -> u8 {
    ((word >> counter.shift()) & 0xff) as u8
}

/// Pack four counters into a word (success, http, tcp, timeout).
pub fn pack(success: u8, http: u8, tcp: u8, timeout: u8) -> u32 {
    u32::from(success)
        | (u32::from(http) << 8)
        | (u32::from(tcp) << 16)
        | (u32::from(timeout) << 24)
}

/// Pin a counter back to 255 after a shared increment wrapped its byte.
///
/// A wrap leaves the byte at 0 and leaks a carry into the next lane; both
/// are undone here. Unreachable with validated thresholds (at most 254),
/// which flip the verdict before a byte can reach the ceiling.
pub(crate) fn saturate(word: u32, counter: Counter) -> u32 {
    if extract(word, counter) != 0 {
        return word;
    }

    let shift = counter.shift();
    let mut fixed = word;
    if shift < 24 {
        // The topmost lane's carry already fell off the word
        fixed = fixed.wrapping_sub(1 << (shift + 8));
    }
    fixed | (0xff << shift)
}

/// Builder for the `vigil:<name>:<role>` key namespace.
///
/// Instances sharing a store cannot collide as long as `name` is unique.
#[derive(Debug, Clone)]
pub(crate) struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            prefix: format!("{PREFIX}:{name}"),
        }
    }

    /// Event-bus source for this engine instance.
    pub(crate) fn source(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn target_list(&self) -> String {
        format!("{}:target_list", self.prefix)
    }

    pub(crate) fn target_list_lock(&self) -> String {
        format!("{}:target_list_lock", self.prefix)
    }

    pub(crate) fn state(&self, target: &Target) -> String {
        format!("{}:state:{}", self.prefix, target_key(target))
    }

    pub(crate) fn counter(&self, target: &Target) -> String {
        format!("{}:counter:{}", self.prefix, target_key(target))
    }

    pub(crate) fn target_lock(&self, target: &Target) -> String {
        format!("{}:target_lock:{}", self.prefix, target_key(target))
    }

    pub(crate) fn period_lock(&self, mode: &str) -> String {
        format!("{}:period_lock:{}", self.prefix, mode)
    }
}

fn target_key(target: &Target) -> String {
    format!(
        "{}:{}:{}",
        target.ip,
        target.port,
        target.hostname_or_ip()
    )
}

/// Serialize the ordered target list for the store.
pub(crate) fn encode_target_list(list: &[Target]) -> Result<Vec<u8>> {
    serde_json::to_vec(list).map_err(|e| Error::Codec(format!("target list encode: {e}")))
}

/// Deserialize the stored target list; a missing blob is an empty list.
pub(crate) fn decode_target_list(blob: Option<Vec<u8>>) -> Result<Vec<Target>> {
    match blob {
        Some(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
            .map_err(|e| Error::Codec(format!("target list decode: {e}"))),
        _ => Ok(Vec::new()),
    }
}

/// Encode a health state as its small-integer store form.
pub(crate) fn encode_state(state: HealthState) -> Vec<u8> {
    state.as_u8().to_string().into_bytes()
}

/// Decode a stored health state; a missing value decodes to `None`.
pub(crate) fn decode_state(value: Option<Vec<u8>>) -> Result<Option<HealthState>> {
    let Some(bytes) = value else {
        return Ok(None);
    };

    let text = std::str::from_utf8(&bytes)
        .map_err(|e| Error::Codec(format!("state decode: {e}")))?;
    let raw: u8 = text
        .trim()
        .parse()
        .map_err(|e| Error::Codec(format!("state decode: {e}")))?;

    HealthState::from_u8(raw)
        .map(Some)
        .ok_or_else(|| Error::Codec(format!("state decode: {raw} is not a health state")))
}

/// Decode a stored counter word; a missing value decodes to zero.
pub(crate) fn decode_counter_word(value: Option<Vec<u8>>) -> Result<u32> {
    let Some(bytes) = value else {
        return Ok(0);
    };

    let text = std::str::from_utf8(&bytes)
        .map_err(|e| Error::Codec(format!("counter decode: {e}")))?;
    let raw: i64 = text
        .trim()
        .parse()
        .map_err(|e| Error::Codec(format!("counter decode: {e}")))?;

    Ok(truncate_word(raw))
}

/// Encode a counter word for the store.
pub(crate) fn encode_counter_word(word: u32) -> Vec<u8> {
    word.to_string().into_bytes()
}

/// Clamp the store's integer down to the 32-bit word.
pub(crate) fn truncate_word(raw: i64) -> u32 {
    (raw as u64 & 0xffff_ffff) as u32
}
