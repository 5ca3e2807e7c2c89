//! Cart error types.

use thiserror::Error;
use turbo_cache::CacheError;

/// Errors that can occur in cart operations.
#[derive(Error, Debug)]
pub enum CartError {
    /// No line item with this product id is in the cart.
    #[error("Item not in cart: {0}")]
    ItemNotFound(String),

    /// The cart was requested outside of a `CartProvider` scope.
    #[error("current_cart() must be called within a CartProvider scope")]
    ProviderMissing,

    /// Price is NaN or infinite.
    #[error("Invalid price for {id}: {price}")]
    InvalidPrice { id: String, price: f64 },

    /// Quantity would exceed the representable range.
    #[error("Quantity overflow for {0}")]
    QuantityOverflow(String),

    /// Decoded cart violates a cart invariant.
    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error.
    #[error("Storage error: {0}")]
    Store(#[from] CacheError),
}
