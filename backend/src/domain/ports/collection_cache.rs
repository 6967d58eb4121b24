//! Port for whole-collection read caching.
//!
//! List views load an entire collection and filter it in memory. The cache
//! keeps the last loaded collection per [`CollectionKey`]; any successful
//! mutation of that collection invalidates the key so the next read refetches
//! everything. There is no per-record patching.
//!
//! Invalidation also advances a per-key generation. A miss hands out the
//! current generation and the fill must present it back: a load that
//! overlapped a mutation is discarded instead of caching pre-write rows.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::define_port_error;

/// Named shared collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Applications,
    Campaigns,
    Donations,
    Donors,
    Events,
    NewsPosts,
}

impl CollectionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applications => "applications",
            Self::Campaigns => "campaigns",
            Self::Donations => "donations",
            Self::Donors => "donors",
            Self::Events => "events",
            Self::NewsPosts => "news_posts",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Errors surfaced by collection cache adapters.
    pub enum CollectionCacheError {
        /// Cache backend is unavailable.
        Backend { message: String } => "collection cache backend failure: {message}",
    }
}

/// Result of [`CollectionCache::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(Arc<Vec<T>>),
    /// Nothing cached; fill with [`CollectionCache::put_if_generation`].
    Miss { generation: u64 },
}

/// Cache of fully loaded collections of `T`.
#[async_trait]
pub trait CollectionCache<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Cached collection for `key`, or the generation a fill must match.
    async fn get(&self, key: CollectionKey) -> Result<CacheLookup<T>, CollectionCacheError>;

    /// Store `items` unless `key` was invalidated after `generation` was
    /// handed out. Returns whether the collection was stored.
    async fn put_if_generation(
        &self,
        key: CollectionKey,
        generation: u64,
        items: Arc<Vec<T>>,
    ) -> Result<bool, CollectionCacheError>;

    /// Drop the cached collection for `key` and advance its generation.
    async fn invalidate(&self, key: CollectionKey) -> Result<(), CollectionCacheError>;
}

/// Cache that never holds anything; every read goes to the repository.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCollectionCache;

#[async_trait]
impl<T> CollectionCache<T> for NoopCollectionCache
where
    T: Send + Sync + 'static,
{
    async fn get(&self, _key: CollectionKey) -> Result<CacheLookup<T>, CollectionCacheError> {
        Ok(CacheLookup::Miss { generation: 0 })
    }

    async fn put_if_generation(
        &self,
        _key: CollectionKey,
        _generation: u64,
        _items: Arc<Vec<T>>,
    ) -> Result<bool, CollectionCacheError> {
        Ok(false)
    }

    async fn invalidate(&self, _key: CollectionKey) -> Result<(), CollectionCacheError> {
        Ok(())
    }
}
