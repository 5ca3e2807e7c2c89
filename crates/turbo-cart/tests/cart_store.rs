//! End-to-end behaviour of a cart session against a Key-Value store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use turbo_cache::{CacheError, KeyValueStore, MemoryStore};
use turbo_cart::prelude::*;
use turbo_cart::DEFAULT_STORAGE_KEY;

/// Store that records every `set` and can be told to fail.
#[derive(Default)]
struct RecordingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<String>>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    get_delay: Option<Duration>,
    set_delay: Option<Duration>,
}

impl RecordingStore {
    fn slow(delay: Duration) -> Self {
        Self {
            set_delay: Some(delay),
            ..Self::default()
        }
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(delay) = self.get_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::StoreError("get unavailable".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        if let Some(delay) = self.set_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::StoreError("set unavailable".to_string()));
        }
        self.writes.lock().unwrap().push(value.clone());
        self.inner.set(key, value).await
    }
}

fn item(id: &str) -> NewCartItem {
    NewCartItem::new(id, "T", "u", 10.0)
}

fn quantities(cart: &Cart) -> Vec<(String, u32)> {
    cart.items()
        .iter()
        .map(|i| (i.id.to_string(), i.quantity))
        .collect()
}

async fn persisted(store: &dyn KeyValueStore) -> Option<Cart> {
    let raw = store.get(DEFAULT_STORAGE_KEY).await.unwrap()?;
    Some(Cart::from_json(&raw).unwrap())
}

#[tokio::test]
async fn test_lifecycle_scenario_is_persisted() {
    let store = Arc::new(MemoryStore::new());
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();

    cart.add_to_cart(NewCartItem::new("a", "T", "u", 10.0)).unwrap();
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 1)]);
    cart.add_to_cart(NewCartItem::new("a", "T", "u", 10.0)).unwrap();
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 2)]);
    cart.increment("a").unwrap();
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 3)]);
    cart.decrement("a").unwrap();
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 2)]);
    cart.decrement("a").unwrap();
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 1)]);
    cart.decrement("a").unwrap();
    assert!(cart.read().is_empty());

    cart.flush().await;
    assert_eq!(persisted(&*store).await, Some(Cart::new()));
}

#[tokio::test]
async fn test_hydrate_without_persisted_value() {
    let store = Arc::new(MemoryStore::new());
    let cart = CartStore::new(store, CartConfig::default());

    assert_eq!(cart.hydrate().await.unwrap(), Hydration::Empty);
    assert!(cart.read().is_empty());
    assert!(cart.is_hydrated());
}

#[tokio::test]
async fn test_hydrate_restores_order_and_fields() {
    let raw = r#"[
        {"id":"b","title":"Bee","image_url":"b.png","price":2.5,"quantity":3},
        {"id":"a","title":"Ay","image_url":"a.png","price":10,"quantity":1}
    ]"#;
    let store = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, raw));
    let cart = CartStore::new(store, CartConfig::default());

    assert_eq!(cart.hydrate().await.unwrap(), Hydration::Restored { items: 2 });

    let snapshot = cart.read();
    assert_eq!(
        quantities(&snapshot),
        vec![("b".to_string(), 3), ("a".to_string(), 1)]
    );
    let b = snapshot.get("b").unwrap();
    assert_eq!(b.title, "Bee");
    assert_eq!(b.image_url, "b.png");
    assert_eq!(b.price, 2.5);
}

#[tokio::test]
async fn test_hydrate_discards_malformed_value() {
    let zero_quantity = r#"[{"id":"a","title":"T","image_url":"u","price":1,"quantity":0}]"#;
    for raw in ["{not json", r#"{"id":"a"}"#, zero_quantity] {
        let store = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, raw));
        let cart = CartStore::new(store, CartConfig::default());

        assert_eq!(cart.hydrate().await.unwrap(), Hydration::Discarded, "{}", raw);
        assert!(cart.read().is_empty());
    }
}

#[tokio::test]
async fn test_hydrate_runs_once() {
    let store = Arc::new(MemoryStore::new());
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();

    store
        .set(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"x","title":"T","image_url":"u","price":1,"quantity":1}]"#.to_string(),
        )
        .await
        .unwrap();

    assert_eq!(cart.hydrate().await.unwrap(), Hydration::Skipped);
    assert!(cart.read().is_empty());
}

#[tokio::test]
async fn test_concurrent_hydrate_waits_for_restore() {
    let raw = r#"[{"id":"saved","title":"T","image_url":"u","price":1,"quantity":2}]"#;
    let store = Arc::new(RecordingStore {
        inner: MemoryStore::with_entry(DEFAULT_STORAGE_KEY, raw),
        get_delay: Some(Duration::from_millis(20)),
        ..RecordingStore::default()
    });
    let cart = CartStore::new(store, CartConfig::default());

    let (first, (second, seen_by_second)) = tokio::join!(cart.hydrate(), async {
        tokio::task::yield_now().await;
        let outcome = cart.hydrate().await;
        (outcome, quantities(&cart.read()))
    });

    assert_eq!(first.unwrap(), Hydration::Restored { items: 1 });
    assert_eq!(second.unwrap(), Hydration::Skipped);
    assert_eq!(seen_by_second, vec![("saved".to_string(), 2)]);

    cart.increment("saved").unwrap();
    assert_eq!(quantities(&cart.read()), vec![("saved".to_string(), 3)]);
}

#[tokio::test]
async fn test_hydrate_store_failure_can_retry() {
    let store = Arc::new(RecordingStore::default());
    store.fail_get.store(true, Ordering::SeqCst);
    let cart = CartStore::new(store.clone(), CartConfig::default());

    assert!(matches!(cart.hydrate().await, Err(CartError::Store(_))));
    assert!(!cart.is_hydrated());

    store.fail_get.store(false, Ordering::SeqCst);
    assert_eq!(cart.hydrate().await.unwrap(), Hydration::Empty);
}

#[tokio::test]
async fn test_write_is_post_mutation_snapshot() {
    let store = Arc::new(RecordingStore::default());
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();

    cart.add_to_cart(item("a")).unwrap();
    cart.flush().await;

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0],
        r#"[{"id":"a","title":"T","image_url":"u","price":10.0,"quantity":1}]"#
    );
}

#[tokio::test]
async fn test_failed_writes_keep_memory_state() {
    let store = Arc::new(RecordingStore::default());
    store.fail_set.store(true, Ordering::SeqCst);
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();

    cart.add_to_cart(item("a")).unwrap();
    cart.add_to_cart(item("b")).unwrap();
    cart.increment("a").unwrap();
    cart.flush().await;

    assert_eq!(
        quantities(&cart.read()),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
    let stats = cart.write_stats();
    assert_eq!(stats.scheduled, 3);
    assert!(stats.failed >= 1);
    assert_eq!(stats.completed, 0);
    assert_eq!(persisted(&*store).await, None);
}

#[tokio::test]
async fn test_missing_item_is_an_error_for_both_directions() {
    let store = Arc::new(RecordingStore::default());
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();
    cart.add_to_cart(item("a")).unwrap();

    assert!(matches!(cart.increment("nope"), Err(CartError::ItemNotFound(_))));
    assert!(matches!(cart.decrement("nope"), Err(CartError::ItemNotFound(_))));
    assert_eq!(quantities(&cart.read()), vec![("a".to_string(), 1)]);

    cart.flush().await;
    assert_eq!(cart.write_stats().scheduled, 1);
}

#[tokio::test]
async fn test_queued_writes_land_in_order() {
    let store = Arc::new(RecordingStore::slow(Duration::from_millis(5)));
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();

    cart.add_to_cart(item("a")).unwrap();
    for _ in 0..9 {
        cart.increment("a").unwrap();
        tokio::task::yield_now().await;
    }
    cart.flush().await;

    let seen: Vec<u32> = store
        .writes()
        .iter()
        .map(|raw| Cart::from_json(raw).unwrap().get("a").unwrap().quantity)
        .collect();

    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{:?}", seen);
    assert_eq!(seen.last(), Some(&10));
    assert_eq!(persisted(&*store).await, Some(cart.read()));

    let stats = cart.write_stats();
    assert_eq!(stats.scheduled, 10);
    assert_eq!(stats.completed + stats.coalesced, 10);
    assert_eq!(stats.completed as usize, seen.len());
}

#[tokio::test]
async fn test_detached_writes_complete_after_flush() {
    let store = Arc::new(MemoryStore::new());
    let config = CartConfig::new().with_write_mode(WriteMode::Detached);
    let cart = CartStore::open(store.clone(), config).await.unwrap();

    cart.add_to_cart(item("a")).unwrap();
    cart.add_to_cart(item("b")).unwrap();
    cart.flush().await;

    let stats = cart.write_stats();
    assert_eq!(stats.scheduled, 2);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.coalesced, 0);

    // Either snapshot may have landed last; both are valid states.
    let stored = persisted(&*store).await.unwrap();
    assert!(stored.contains("a"));
}

#[tokio::test]
async fn test_cart_survives_new_session() {
    let store = Arc::new(MemoryStore::new());

    {
        let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();
        cart.add_to_cart(item("a")).unwrap();
        cart.add_to_cart(item("b")).unwrap();
        cart.add_to_cart(item("a")).unwrap();
        cart.flush().await;
    }

    let cart = CartStore::open(store, CartConfig::default()).await.unwrap();
    assert_eq!(
        quantities(&cart.read()),
        vec![("a".to_string(), 2), ("b".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_custom_storage_key() {
    let store = Arc::new(MemoryStore::new());
    let config = CartConfig::new().with_storage_key("shop:cart");
    let cart = CartStore::open(store.clone(), config).await.unwrap();

    cart.add_to_cart(item("a")).unwrap();
    cart.flush().await;

    assert!(store.get("shop:cart").await.unwrap().is_some());
    assert!(store.get(DEFAULT_STORAGE_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_hydration_replaces_early_mutations() {
    let raw = r#"[{"id":"saved","title":"T","image_url":"u","price":1,"quantity":4}]"#;
    let store = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, raw));
    let cart = CartStore::new(store, CartConfig::default());

    cart.add_to_cart(item("early")).unwrap();
    cart.hydrate().await.unwrap();

    assert_eq!(quantities(&cart.read()), vec![("saved".to_string(), 4)]);
}

#[tokio::test]
async fn test_provider_exposes_store() {
    let store = Arc::new(MemoryStore::new());
    let cart = CartStore::open(store.clone(), CartConfig::default()).await.unwrap();
    let provider = CartProvider::new(cart);

    provider
        .scope(async {
            let cart = current_cart()?;
            cart.add_to_cart(item("a"))?;
            cart.flush().await;
            Ok::<_, CartError>(())
        })
        .await
        .unwrap();

    assert!(persisted(&*store).await.unwrap().contains("a"));
    assert!(matches!(current_cart(), Err(CartError::ProviderMissing)));
}
