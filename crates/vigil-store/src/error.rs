//! Error types for shared-store operations

/// Result type for store operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend read/write/incr error
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored value did not have the expected shape
    #[error("invalid stored value: {0}")]
    Value(String),
}
