//! Scoped access to the session's cart.
//!
//! A [`CartProvider`] makes one cart reachable through [`current_cart`] for
//! the duration of a future or closure. The scope is task-local: it is
//! visible to the code running inside it and to nothing else, so two
//! sessions running side by side never see each other's cart.

use std::future::Future;
use std::sync::Arc;

use crate::error::CartError;
use crate::store::CartStore;

/// Shared handle to a session's cart.
pub type CartHandle = Arc<CartStore>;

tokio::task_local! {
    static CURRENT_CART: CartHandle;
}

/// Provides a cart to the code run inside its scopes.
///
/// # Example
///
/// ```rust,ignore
/// let provider = CartProvider::new(CartStore::open(store, config).await?);
///
/// provider
///     .scope(async {
///         let cart = current_cart()?;
///         cart.add_to_cart(item)?;
///         Ok::<_, CartError>(())
///     })
///     .await?;
/// ```
#[derive(Clone)]
pub struct CartProvider {
    handle: CartHandle,
}

impl CartProvider {
    /// Create a provider owning `store`.
    pub fn new(store: CartStore) -> Self {
        Self::from_handle(Arc::new(store))
    }

    /// Create a provider for an existing handle.
    pub fn from_handle(handle: CartHandle) -> Self {
        Self { handle }
    }

    /// The provided cart.
    pub fn handle(&self) -> CartHandle {
        Arc::clone(&self.handle)
    }

    /// Run `fut` with this provider's cart in scope.
    pub async fn scope<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        CURRENT_CART.scope(self.handle(), fut).await
    }

    /// Run `f` with this provider's cart in scope.
    pub fn sync_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CURRENT_CART.sync_scope(self.handle(), f)
    }
}

/// The cart of the enclosing [`CartProvider`] scope.
///
/// Fails with [`CartError::ProviderMissing`] outside of any scope.
pub fn current_cart() -> Result<CartHandle, CartError> {
    CURRENT_CART
        .try_with(Arc::clone)
        .map_err(|_| CartError::ProviderMissing)
}
