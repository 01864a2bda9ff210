//! Item service: read-through cache over the item store
//!
//! Reads consult the cache first and repopulate it from storage on a miss.
//! Writes always hit storage first and only then touch the cache, so a failure
//! between the two steps can leave the cache stale or empty but never ahead
//! of storage.
//!
//! Cache faults are never surfaced to callers. A failed cache read is treated
//! as a miss and a failed cache write or delete is logged and skipped.
//!
//! No lock spans a storage call and the cache call that follows it. A read
//! repopulating the cache can land after a concurrent delete's eviction and
//! leave a stale entry until the next write to that item or TTL expiry.

use catalog_core::keys::{item_key, ITEMS_ALL_KEY};
use catalog_core::{CacheStore, CatalogError, Item, ItemDraft, ItemId, ItemStore, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ItemService {
    store: Arc<dyn ItemStore>,
    cache: Arc<dyn CacheStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub async fn get_item(&self, id: ItemId) -> Result<Item> {
        let key = item_key(id);
        if let Some(item) = self.cached::<Item>(&key).await {
            debug!("Cache hit: {}", key);
            return Ok(item);
        }
        debug!("Cache miss: {}", key);

        let item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        self.cache_put(&key, &item).await?;
        Ok(item)
    }

    pub async fn list_items(&self) -> Result<Vec<Item>> {
        if let Some(items) = self.cached::<Vec<Item>>(ITEMS_ALL_KEY).await {
            debug!("Cache hit: {}", ITEMS_ALL_KEY);
            return Ok(items);
        }
        debug!("Cache miss: {}", ITEMS_ALL_KEY);

        let items = self.store.get_all().await?;
        self.cache_put(ITEMS_ALL_KEY, &items).await?;
        Ok(items)
    }

    pub async fn create_item(&self, draft: ItemDraft) -> Result<Item> {
        let item = self.store.create(&draft).await?;
        info!("Created item {}", item.id);

        self.cache_delete(ITEMS_ALL_KEY).await;
        Ok(item)
    }

    /// Overwrite an item in storage, then overwrite its cache entry with the
    /// new value rather than just dropping it.
    pub async fn update_item(&self, id: ItemId, draft: ItemDraft) -> Result<Item> {
        let mut item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        item.apply(draft);
        self.store.save(&item).await?;
        info!("Updated item {}", id);

        self.cache_put(&item_key(id), &item).await?;
        self.cache_delete(ITEMS_ALL_KEY).await;
        Ok(item)
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<()> {
        let item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(id))?;

        self.store.delete(&item).await?;
        info!("Deleted item {}", id);

        self.cache_delete(&item_key(id)).await;
        self.cache_delete(ITEMS_ALL_KEY).await;
        Ok(())
    }

    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {}, falling back to storage: {}", key, e);
                None
            }
        }
    }

    async fn cache_put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        if let Err(e) = self.cache.set(key, &json).await {
            warn!("Cache write failed for {}: {}", key, e);
        }
        Ok(())
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!("Cache delete failed for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::{MemoryCache, SqliteItemStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Item store wrapper counting lookups by id
    pub(crate) struct CountingStore {
        inner: SqliteItemStore,
        lookups: AtomicUsize,
    }

    impl CountingStore {
        pub(crate) async fn new() -> Self {
            Self {
                inner: SqliteItemStore::in_memory().await.unwrap(),
                lookups: AtomicUsize::new(0),
            }
        }

        pub(crate) fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItemStore for CountingStore {
        async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_by_id(id).await
        }

        async fn get_all(&self) -> Result<Vec<Item>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_all().await
        }

        async fn create(&self, draft: &ItemDraft) -> Result<Item> {
            self.inner.create(draft).await
        }

        async fn save(&self, item: &Item) -> Result<()> {
            self.inner.save(item).await
        }

        async fn delete(&self, item: &Item) -> Result<()> {
            self.inner.delete(item).await
        }

        async fn ensure_schema(&self) -> Result<()> {
            self.inner.ensure_schema().await
        }

        async fn ping(&self) -> Result<()> {
            self.inner.ping().await
        }

        async fn close(&self) {
            self.inner.close().await
        }
    }

    /// Cache whose every call fails, as if the cache engine were down
    pub(crate) struct DownCache;

    #[async_trait]
    impl CacheStore for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CatalogError::Cache("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CatalogError::Cache("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(CatalogError::Cache("connection refused".to_string()))
        }

        async fn ping(&self) -> Result<()> {
            Err(CatalogError::Cache("connection refused".to_string()))
        }
    }

    fn draft(name: &str, description: &str) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    async fn setup() -> (ItemService, Arc<CountingStore>, Arc<MemoryCache>) {
        let store = Arc::new(CountingStore::new().await);
        let cache = Arc::new(MemoryCache::new(None));
        let service = ItemService::new(store.clone(), cache.clone());
        (service, store, cache)
    }

    #[tokio::test]
    async fn test_get_populates_cache_then_hits() {
        let (service, store, cache) = setup().await;
        let created = service.create_item(draft("A", "B")).await.unwrap();

        let first = service.get_item(created.id).await.unwrap();
        assert_eq!(first, created);
        assert_eq!(store.lookups(), 1);

        let raw = cache.get(&item_key(created.id)).await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Item>(&raw).unwrap(), created);

        let second = service.get_item(created.id).await.unwrap();
        assert_eq!(second, created);
        assert_eq!(store.lookups(), 1, "cache hit must not touch storage");
    }

    #[tokio::test]
    async fn test_get_missing_leaves_cache_untouched() {
        let (service, _store, cache) = setup().await;

        let result = service.get_item(42).await;
        assert!(matches!(result, Err(CatalogError::NotFound(42))));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_create_invalidates_list() {
        let (service, _store, cache) = setup().await;

        assert!(service.list_items().await.unwrap().is_empty());
        assert!(cache.get(ITEMS_ALL_KEY).await.unwrap().is_some());

        let created = service.create_item(draft("A", "B")).await.unwrap();
        assert_eq!(cache.get(ITEMS_ALL_KEY).await.unwrap(), None);

        let items = service.list_items().await.unwrap();
        assert_eq!(items, vec![created]);
    }

    #[tokio::test]
    async fn test_list_served_from_cache() {
        let (service, store, _cache) = setup().await;
        service.create_item(draft("A", "B")).await.unwrap();

        service.list_items().await.unwrap();
        service.list_items().await.unwrap();
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_cached_item() {
        let (service, store, cache) = setup().await;
        let created = service.create_item(draft("A", "B")).await.unwrap();
        service.get_item(created.id).await.unwrap();
        service.list_items().await.unwrap();

        let updated = service
            .update_item(created.id, draft("C", "D"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(cache.get(ITEMS_ALL_KEY).await.unwrap(), None);

        // Remove the row behind the service's back; the cache must still
        // answer with the updated value.
        store.inner.delete(&updated).await.unwrap();
        let lookups = store.lookups();
        assert_eq!(service.get_item(created.id).await.unwrap(), updated);
        assert_eq!(store.lookups(), lookups);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (service, _store, cache) = setup().await;
        cache.set(ITEMS_ALL_KEY, "[]").await.unwrap();

        let result = service.update_item(9, draft("C", "D")).await;
        assert!(matches!(result, Err(CatalogError::NotFound(9))));
        assert_eq!(cache.get(ITEMS_ALL_KEY).await.unwrap(), Some("[]".to_string()));
        assert_eq!(cache.get(&item_key(9)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_evicts_item_and_list() {
        let (service, _store, cache) = setup().await;
        let keep = service.create_item(draft("keep", "")).await.unwrap();
        let gone = service.create_item(draft("gone", "")).await.unwrap();
        service.get_item(gone.id).await.unwrap();
        service.list_items().await.unwrap();

        service.delete_item(gone.id).await.unwrap();
        assert_eq!(cache.get(&item_key(gone.id)).await.unwrap(), None);
        assert_eq!(cache.get(ITEMS_ALL_KEY).await.unwrap(), None);

        assert!(matches!(
            service.get_item(gone.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(service.list_items().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (service, _store, cache) = setup().await;
        cache.set(ITEMS_ALL_KEY, "[]").await.unwrap();

        assert!(matches!(
            service.delete_item(3).await,
            Err(CatalogError::NotFound(3))
        ));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_cache_entry_treated_as_miss() {
        let (service, store, cache) = setup().await;
        let created = service.create_item(draft("A", "B")).await.unwrap();
        cache.set(&item_key(created.id), "{not json").await.unwrap();

        assert_eq!(service.get_item(created.id).await.unwrap(), created);
        assert_eq!(store.lookups(), 1);

        let raw = cache.get(&item_key(created.id)).await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<Item>(&raw).unwrap(), created);
    }

    #[tokio::test]
    async fn test_cache_outage_falls_back_to_storage() {
        let store = Arc::new(CountingStore::new().await);
        let service = ItemService::new(store.clone(), Arc::new(DownCache));

        let created = service.create_item(draft("A", "B")).await.unwrap();
        assert_eq!(service.get_item(created.id).await.unwrap(), created);
        assert_eq!(service.list_items().await.unwrap(), vec![created.clone()]);

        let updated = service
            .update_item(created.id, draft("C", "D"))
            .await
            .unwrap();
        assert_eq!(service.get_item(created.id).await.unwrap(), updated);

        service.delete_item(created.id).await.unwrap();
        assert!(matches!(
            service.get_item(created.id).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let (service, store, _cache) = setup().await;
        store.close().await;

        assert!(matches!(
            service.create_item(draft("A", "B")).await,
            Err(CatalogError::Storage(_))
        ));
        assert!(matches!(
            service.list_items().await,
            Err(CatalogError::Storage(_))
        ));
    }
}
