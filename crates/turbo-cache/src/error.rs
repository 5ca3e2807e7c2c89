//! Cache error types.

use thiserror::Error;

/// Errors that can occur when using a Key-Value store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    OpenError(String),

    /// Failed to perform store operation.
    #[error("Store operation failed: {0}")]
    StoreError(String),
}
