//! In-process collection cache.
//!
//! Holds at most one loaded collection per [`CollectionKey`]. Entries live
//! until a mutation invalidates them; there is no expiry. Each worker process
//! owns its own copy, so a write on one process does not evict another's
//! entry until that process mutates the same collection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::CollectionCaches;
use crate::domain::ports::{CacheLookup, CollectionCache, CollectionCacheError, CollectionKey};

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    items: Option<Arc<Vec<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            items: None,
        }
    }
}

/// [`CollectionCache`] backed by a `RwLock<HashMap>` of generation-stamped
/// slots.
#[derive(Debug)]
pub struct InMemoryCollectionCache<T> {
    slots: RwLock<HashMap<CollectionKey, Slot<T>>>,
}

impl<T> Default for InMemoryCollectionCache<T> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<T> CollectionCache<T> for InMemoryCollectionCache<T>
where
    T: Send + Sync + 'static,
{
    async fn get(&self, key: CollectionKey) -> Result<CacheLookup<T>, CollectionCacheError> {
        let slots = self.slots.read().await;
        Ok(match slots.get(&key) {
            Some(Slot {
                items: Some(items), ..
            }) => CacheLookup::Hit(Arc::clone(items)),
            Some(slot) => CacheLookup::Miss {
                generation: slot.generation,
            },
            None => CacheLookup::Miss { generation: 0 },
        })
    }

    async fn put_if_generation(
        &self,
        key: CollectionKey,
        generation: u64,
        items: Arc<Vec<T>>,
    ) -> Result<bool, CollectionCacheError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key).or_default();
        if slot.generation != generation {
            debug!(%key, generation, current = slot.generation, "stale collection fill skipped");
            return Ok(false);
        }
        debug!(%key, size = items.len(), "caching collection");
        slot.items = Some(items);
        Ok(true)
    }

    async fn invalidate(&self, key: CollectionKey) -> Result<(), CollectionCacheError> {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key).or_default();
        slot.generation = slot.generation.wrapping_add(1);
        if slot.items.take().is_some() {
            debug!(%key, "collection invalidated");
        }
        Ok(())
    }
}

/// One in-memory cache per collection.
pub fn in_memory_caches() -> CollectionCaches {
    CollectionCaches {
        applications: Arc::new(InMemoryCollectionCache::default()),
        campaigns: Arc::new(InMemoryCollectionCache::default()),
        donations: Arc::new(InMemoryCollectionCache::default()),
        donors: Arc::new(InMemoryCollectionCache::default()),
        events: Arc::new(InMemoryCollectionCache::default()),
        news_posts: Arc::new(InMemoryCollectionCache::default()),
    }
}
