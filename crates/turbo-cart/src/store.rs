//! Session-owned cart with write-behind persistence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::{debug, info, info_span, warn};
use turbo_cache::{KeyValueStore, SessionId};

use crate::cart::{Cart, NewCartItem};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::persist::{Persister, WriteStats};

/// Outcome of loading the persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// A persisted cart replaced the in-memory one.
    Restored {
        /// Number of line items restored.
        items: usize,
    },
    /// Nothing was persisted; the cart is unchanged.
    Empty,
    /// The persisted value could not be decoded and was ignored.
    Discarded,
    /// This session was already hydrated.
    Skipped,
}

/// The authoritative cart for one session.
///
/// Mutations apply synchronously and in call order; each successful one
/// schedules a write of the resulting snapshot without waiting for it.
/// A failed write never affects in-memory state.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use turbo_cache::MemoryStore;
/// use turbo_cart::prelude::*;
///
/// let cart = CartStore::open(Arc::new(MemoryStore::new()), CartConfig::default()).await?;
/// cart.add_to_cart(NewCartItem::new("sku-1", "Mug", "https://img/mug.png", 12.0))?;
/// cart.increment("sku-1")?;
/// assert_eq!(cart.read().get("sku-1").map(|i| i.quantity), Some(2));
/// cart.flush().await;
/// ```
pub struct CartStore {
    session: SessionId,
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    cart: Mutex<Cart>,
    changes: watch::Sender<Cart>,
    hydrated: AtomicBool,
    hydration: AsyncMutex<()>,
    persister: Persister,
}

impl CartStore {
    /// Create an empty, not yet hydrated cart session.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, config: CartConfig) -> Self {
        Self::with_session(store, config, SessionId::generate())
    }

    /// Create an empty cart session with a known session id.
    pub fn with_session(
        store: Arc<dyn KeyValueStore>,
        config: CartConfig,
        session: SessionId,
    ) -> Self {
        let span = info_span!("cart", session = %session);
        let persister = Persister::spawn(
            Arc::clone(&store),
            &config.storage_key,
            config.write_mode,
            span,
        );
        let (changes, _) = watch::channel(Cart::new());

        debug!(
            session = %session,
            key = %config.storage_key,
            mode = ?config.write_mode,
            "CartStore::new"
        );

        Self {
            session,
            store,
            storage_key: config.storage_key,
            cart: Mutex::new(Cart::new()),
            changes,
            hydrated: AtomicBool::new(false),
            hydration: AsyncMutex::new(()),
            persister,
        }
    }

    /// Create a cart session and hydrate it from the store.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        config: CartConfig,
    ) -> Result<Self, CartError> {
        let cart = Self::new(store, config);
        cart.hydrate().await?;
        Ok(cart)
    }

    /// Session this cart belongs to.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Key of the cart's storage slot.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Whether hydration has completed for this session.
    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::SeqCst)
    }

    /// Load the persisted cart, once per session.
    ///
    /// A persisted cart replaces the in-memory one wholesale. Missing or
    /// undecodable data leaves the cart as it is. A storage failure is
    /// returned and hydration may be retried.
    ///
    /// Concurrent callers wait for the hydration in progress; only the first
    /// one loads, and the others see [`Hydration::Skipped`] once the loaded
    /// cart is in place.
    pub async fn hydrate(&self) -> Result<Hydration, CartError> {
        let _running = self.hydration.lock().await;
        if self.is_hydrated() {
            return Ok(Hydration::Skipped);
        }

        let outcome = self.load().await?;
        self.hydrated.store(true, Ordering::SeqCst);
        Ok(outcome)
    }

    async fn load(&self) -> Result<Hydration, CartError> {
        let Some(raw) = self.store.get(&self.storage_key).await? else {
            info!(session = %self.session, key = %self.storage_key, "no persisted cart");
            return Ok(Hydration::Empty);
        };

        match Cart::from_json(&raw) {
            Ok(restored) => {
                let items = restored.len();
                {
                    let mut cart = self.lock();
                    *cart = restored;
                    self.changes.send_replace(cart.clone());
                }
                info!(session = %self.session, key = %self.storage_key, items, "cart restored");
                Ok(Hydration::Restored { items })
            }
            Err(e) => {
                warn!(
                    session = %self.session,
                    key = %self.storage_key,
                    error = %e,
                    "persisted cart discarded"
                );
                Ok(Hydration::Discarded)
            }
        }
    }

    /// Snapshot of the current cart.
    pub fn read(&self) -> Cart {
        self.lock().clone()
    }

    /// Receive a new snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.changes.subscribe()
    }

    /// Add one unit of a product; see [`Cart::add_item`].
    pub fn add_to_cart(&self, item: NewCartItem) -> Result<u32, CartError> {
        self.commit("add_to_cart", |cart| cart.add_item(item))
    }

    /// Increase a product's quantity by one.
    pub fn increment(&self, id: &str) -> Result<u32, CartError> {
        self.commit("increment", |cart| cart.increment(id))
    }

    /// Decrease a product's quantity by one, removing it at zero.
    pub fn decrement(&self, id: &str) -> Result<Option<u32>, CartError> {
        self.commit("decrement", |cart| cart.decrement(id))
    }

    /// Wait for every write scheduled so far to settle.
    pub async fn flush(&self) {
        self.persister.flush().await;
    }

    /// Persistence counters for this session.
    pub fn write_stats(&self) -> WriteStats {
        self.persister.stats()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `op` and, if it succeeds, persist and publish the new state.
    ///
    /// The snapshot is scheduled while the lock is held, so writes are
    /// scheduled in mutation order.
    fn commit<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Cart) -> Result<T, CartError>,
    ) -> Result<T, CartError> {
        let mut cart = self.lock();

        let value = f(&mut *cart).map_err(|e| {
            debug!(session = %self.session, op, error = %e, "cart mutation rejected");
            e
        })?;

        match cart.to_json() {
            Ok(payload) => self.persister.schedule(payload),
            Err(e) => {
                warn!(session = %self.session, op, error = %e, "cart snapshot not serialized")
            }
        }
        self.changes.send_replace(cart.clone());

        debug!(session = %self.session, op, items = cart.len(), "cart updated");
        Ok(value)
    }
}
