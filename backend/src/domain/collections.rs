//! Read-through access to whole collections behind the collection cache.
//!
//! Every list view loads its entire collection through [`read_through`] and
//! filters in memory. Mutations call [`invalidate`] so the next read refetches.
//! Cache failures never fail a request; they are logged and the repository is
//! used directly.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{CacheLookup, CollectionCache, CollectionKey, NoopCollectionCache};
use crate::domain::{
    ApplicationRecord, CampaignRecord, DonationRecord, DonorRecord, Error, EventRecord,
    NewsPostRecord,
};

/// One cache handle per cached collection.
#[derive(Clone)]
pub struct CollectionCaches {
    pub applications: Arc<dyn CollectionCache<ApplicationRecord>>,
    pub campaigns: Arc<dyn CollectionCache<CampaignRecord>>,
    pub donations: Arc<dyn CollectionCache<DonationRecord>>,
    pub donors: Arc<dyn CollectionCache<DonorRecord>>,
    pub events: Arc<dyn CollectionCache<EventRecord>>,
    pub news_posts: Arc<dyn CollectionCache<NewsPostRecord>>,
}

impl CollectionCaches {
    /// Caches that hold nothing.
    pub fn noop() -> Self {
        let noop = Arc::new(NoopCollectionCache);
        Self {
            applications: noop.clone(),
            campaigns: noop.clone(),
            donations: noop.clone(),
            donors: noop.clone(),
            events: noop.clone(),
            news_posts: noop,
        }
    }
}

impl Default for CollectionCaches {
    fn default() -> Self {
        Self::noop()
    }
}

/// Return the cached collection for `key`, loading and caching it on a miss.
///
/// The fill is dropped when `key` was invalidated while `load` ran, so a
/// write that lands mid-load is seen by the next read.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &dyn CollectionCache<T>,
    key: CollectionKey,
    load: F,
) -> Result<Arc<Vec<T>>, Error>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, Error>>,
{
    let generation = match cache.get(key).await {
        Ok(CacheLookup::Hit(items)) => return Ok(items),
        Ok(CacheLookup::Miss { generation }) => Some(generation),
        Err(err) => {
            warn!(%key, kind = err.kind(), error = %err, "collection cache read failed");
            None
        }
    };

    let items = Arc::new(load().await?);
    let Some(generation) = generation else {
        return Ok(items);
    };
    match cache
        .put_if_generation(key, generation, Arc::clone(&items))
        .await
    {
        Ok(true) => {}
        Ok(false) => debug!(%key, generation, "collection changed during load; not cached"),
        Err(err) => warn!(%key, kind = err.kind(), error = %err, "collection cache write failed"),
    }
    Ok(items)
}

/// Drop the cached collection for `key`.
pub(crate) async fn invalidate<T>(cache: &dyn CollectionCache<T>, key: CollectionKey)
where
    T: Send + Sync + 'static,
{
    if let Err(err) = cache.invalidate(key).await {
        warn!(%key, kind = err.kind(), error = %err, "collection cache invalidation failed");
    }
}
