//! Error types for the health-checking engine

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the health-checking engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration; fatal at construction
    #[error("configuration error: {0}")]
    Config(String),

    /// Shared store failure; the operation made no state change
    #[error("shared store error: {0}")]
    Store(#[from] vigil_store::Error),

    /// Event bus failure
    #[error("event bus error: {0}")]
    Bus(#[from] vigil_core::BusError),

    /// A stored blob could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),

    /// The operation referenced a target this worker does not know
    #[error("target {ip}:{port} not found")]
    TargetNotFound {
        /// Target IP
        ip: String,
        /// Target port
        port: u16,
    },

    /// `start` was called while the periodic checks are already running
    #[error("active health checks already running")]
    AlreadyRunning,

    /// TLS material could not be parsed or assembled
    #[error("TLS error: {0}")]
    Tls(String),

    /// Aggregated failures from a bulk status override
    #[error("bulk status update failed: {0}")]
    Bulk(String),
}
