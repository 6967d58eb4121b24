//! Ports for event and news post persistence.

use async_trait::async_trait;

use crate::domain::{EventId, EventRecord, NewsPostId, NewsPostRecord, Slug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by content repository adapters.
    pub enum ContentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "content repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "content repository query failed: {message}",
        /// Another record of the same kind already uses the slug.
        DuplicateSlug { slug: String } => "slug {slug} is already in use",
        /// No record has the given id.
        NotFound { id: String } => "content {id} not found",
    }
}

/// Port for events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert(&self, record: &EventRecord) -> Result<(), ContentRepositoryError>;
    async fn update(&self, record: &EventRecord) -> Result<(), ContentRepositoryError>;
    async fn find_by_id(&self, id: &EventId) -> Result<Option<EventRecord>, ContentRepositoryError>;
    async fn find_by_slug(&self, slug: &Slug)
    -> Result<Option<EventRecord>, ContentRepositoryError>;
    /// Every event, soonest first.
    async fn list_all(&self) -> Result<Vec<EventRecord>, ContentRepositoryError>;
}

/// Port for news posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsPostRepository: Send + Sync {
    async fn insert(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError>;
    async fn update(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError>;
    async fn find_by_id(
        &self,
        id: &NewsPostId,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError>;
    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError>;
    /// Every post, newest first.
    async fn list_all(&self) -> Result<Vec<NewsPostRecord>, ContentRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContentRepository;

#[async_trait]
impl EventRepository for FixtureContentRepository {
    async fn insert(&self, _record: &EventRecord) -> Result<(), ContentRepositoryError> {
        Ok(())
    }

    async fn update(&self, _record: &EventRecord) -> Result<(), ContentRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &EventId) -> Result<Option<EventRecord>, ContentRepositoryError> {
        Ok(None)
    }

    async fn find_by_slug(
        &self,
        _slug: &Slug,
    ) -> Result<Option<EventRecord>, ContentRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<EventRecord>, ContentRepositoryError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl NewsPostRepository for FixtureContentRepository {
    async fn insert(&self, _record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        Ok(())
    }

    async fn update(&self, _record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &NewsPostId,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        Ok(None)
    }

    async fn find_by_slug(
        &self,
        _slug: &Slug,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<NewsPostRecord>, ContentRepositoryError> {
        Ok(Vec::new())
    }
}
