//! Async Key-Value storage layer for TurboCommerce.
//!
//! Provides the small string-in, string-out storage contract that session
//! state is persisted through, together with two backends:
//!
//! - [`MemoryStore`] - process-local map, for development and testing
//! - [`FileStore`] - one file per key under a data directory, survives restarts
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_cache::{FileStore, KeyValueStore};
//!
//! let store = FileStore::open(".turbo-cart").await?;
//!
//! // Store a value
//! store.set("turbo:cart", "[]".to_string()).await?;
//!
//! // Retrieve a value
//! let raw: Option<String> = store.get("turbo:cart").await?;
//! ```

mod error;
mod file;
mod kv;
mod session;

pub use error::CacheError;
pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use session::SessionId;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{CacheError, FileStore, KeyValueStore, MemoryStore, SessionId};
}
