//! Driving ports for events and news posts.

use async_trait::async_trait;

use crate::domain::{
    Error, EventForm, EventId, EventRecord, NewsPostForm, NewsPostId, NewsPostRecord, Slug,
};

/// Administrative content mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentCommand: Send + Sync {
    async fn create_event(&self, form: EventForm) -> Result<EventRecord, Error>;
    async fn update_event(&self, id: &EventId, form: EventForm) -> Result<EventRecord, Error>;
    async fn create_news_post(&self, form: NewsPostForm) -> Result<NewsPostRecord, Error>;
    async fn update_news_post(
        &self,
        id: &NewsPostId,
        form: NewsPostForm,
    ) -> Result<NewsPostRecord, Error>;
}

/// Public content reads. Unpublished records are never returned.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentQuery: Send + Sync {
    async fn public_events(&self) -> Result<Vec<EventRecord>, Error>;
    async fn event_by_slug(&self, slug: &Slug) -> Result<EventRecord, Error>;
    async fn public_news(&self) -> Result<Vec<NewsPostRecord>, Error>;
    async fn news_post_by_slug(&self, slug: &Slug) -> Result<NewsPostRecord, Error>;
}

/// Fixture over an empty content store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureContentService;

#[async_trait]
impl ContentCommand for FixtureContentService {
    async fn create_event(&self, form: EventForm) -> Result<EventRecord, Error> {
        form.validate()?;
        Err(Error::service_unavailable("content store is not configured"))
    }

    async fn update_event(&self, id: &EventId, _form: EventForm) -> Result<EventRecord, Error> {
        Err(Error::not_found(format!("event {id} not found")))
    }

    async fn create_news_post(&self, form: NewsPostForm) -> Result<NewsPostRecord, Error> {
        form.validate()?;
        Err(Error::service_unavailable("content store is not configured"))
    }

    async fn update_news_post(
        &self,
        id: &NewsPostId,
        _form: NewsPostForm,
    ) -> Result<NewsPostRecord, Error> {
        Err(Error::not_found(format!("news post {id} not found")))
    }
}

#[async_trait]
impl ContentQuery for FixtureContentService {
    async fn public_events(&self) -> Result<Vec<EventRecord>, Error> {
        Ok(Vec::new())
    }

    async fn event_by_slug(&self, slug: &Slug) -> Result<EventRecord, Error> {
        Err(Error::not_found(format!("event {slug} not found")))
    }

    async fn public_news(&self) -> Result<Vec<NewsPostRecord>, Error> {
        Ok(Vec::new())
    }

    async fn news_post_by_slug(&self, slug: &Slug) -> Result<NewsPostRecord, Error> {
        Err(Error::not_found(format!("news post {slug} not found")))
    }
}
