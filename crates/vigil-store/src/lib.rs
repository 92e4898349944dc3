//! # Vigil Store
//!
//! The shared key-value segment peer workers coordinate through:
//! - The [`SharedStore`] seam (get/set/incr/delete/add)
//! - An in-memory backend for single-process deployments and tests
//! - Named locks with acquire timeout and self-releasing expiry
//!
//! ## Example
//!
//! ```rust
//! use vigil_store::{InMemoryStore, SharedStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> vigil_store::Result<()> {
//!     let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
//!
//!     store.set("state", b"1".to_vec(), None).await?;
//!     let count = store.incr("counter", 1).await?;
//!     assert_eq!(count, 1);
//!
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

mod backend;
mod error;
mod inmemory;
pub mod lock;

pub use backend::SharedStore;
pub use error::{Error, Result};
pub use inmemory::InMemoryStore;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::SharedStore;
    pub use crate::error::{Error, Result};
    pub use crate::inmemory::InMemoryStore;
    pub use crate::lock::{self, LockGuard};
}
