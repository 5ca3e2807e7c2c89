//! Session-scoped shopping cart for TurboCommerce.
//!
//! This crate keeps the cart of one session in memory and mirrors it into a
//! Key-Value store:
//!
//! - **Cart**: line items unique by product id, in insertion order
//! - **CartStore**: mutations, one-time hydration, write-behind persistence
//! - **Provider**: scoped access to the session's cart via [`current_cart`]
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_cache::FileStore;
//! use turbo_cart::prelude::*;
//!
//! let store = Arc::new(FileStore::open(".turbo-cart").await?);
//! let cart = CartStore::open(store, CartConfig::default()).await?;
//!
//! cart.add_to_cart(NewCartItem::new("sku-1", "Mug", "https://img/mug.png", 12.0))?;
//! cart.decrement("sku-1")?;
//! assert!(cart.read().is_empty());
//!
//! // Wait for the write-behind before the process exits.
//! cart.flush().await;
//! ```

pub mod cart;
pub mod config;
pub mod error;
pub mod ids;
mod persist;
pub mod provider;
pub mod store;

pub use cart::{Cart, CartItem, NewCartItem};
pub use config::{CartConfig, WriteMode, DEFAULT_STORAGE_KEY};
pub use error::CartError;
pub use ids::ProductId;
pub use persist::WriteStats;
pub use provider::{current_cart, CartHandle, CartProvider};
pub use store::{CartStore, Hydration};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::cart::{Cart, CartItem, NewCartItem};
    pub use crate::config::{CartConfig, WriteMode};
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::provider::{current_cart, CartHandle, CartProvider};
    pub use crate::store::{CartStore, Hydration};
}
