//! Event and news post services.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::application_service::stored_now;
use crate::domain::collections::{invalidate, read_through};
use crate::domain::ports::{
    CollectionCache, CollectionKey, ContentCommand, ContentQuery, ContentRepositoryError,
    EventRepository, NewsPostRepository,
};
use crate::domain::{
    Error, EventForm, EventId, EventRecord, NewsPostForm, NewsPostId, NewsPostRecord, Slug,
    public_events, public_news,
};

fn map_content_error(error: ContentRepositoryError) -> Error {
    match error {
        ContentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("content repository unavailable: {message}"))
        }
        ContentRepositoryError::Query { message } => {
            Error::internal(format!("content repository error: {message}"))
        }
        ContentRepositoryError::DuplicateSlug { slug } => duplicate_slug(&slug),
        ContentRepositoryError::NotFound { id } => Error::not_found(format!("{id} not found")),
    }
}

fn duplicate_slug(slug: &str) -> Error {
    Error::conflict(format!("slug {slug} is already in use"))
        .with_details(json!({ "field": "slug", "reason": "duplicate" }))
}

/// Service implementing [`ContentCommand`] and [`ContentQuery`].
#[derive(Clone)]
pub struct ContentService<E, N> {
    events: Arc<E>,
    news: Arc<N>,
    event_cache: Arc<dyn CollectionCache<EventRecord>>,
    news_cache: Arc<dyn CollectionCache<NewsPostRecord>>,
    clock: Arc<dyn Clock>,
}

impl<E, N> ContentService<E, N> {
    pub fn new(
        events: Arc<E>,
        news: Arc<N>,
        event_cache: Arc<dyn CollectionCache<EventRecord>>,
        news_cache: Arc<dyn CollectionCache<NewsPostRecord>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events,
            news,
            event_cache,
            news_cache,
            clock,
        }
    }
}

impl<E, N> ContentService<E, N>
where
    E: EventRepository,
    N: NewsPostRepository,
{
    async fn event_slug_free(&self, slug: &Slug, owner: Option<EventId>) -> Result<(), Error> {
        match self.events.find_by_slug(slug).await.map_err(map_content_error)? {
            Some(other) if Some(other.id) != owner => Err(duplicate_slug(slug.as_str())),
            _ => Ok(()),
        }
    }

    async fn news_slug_free(&self, slug: &Slug, owner: Option<NewsPostId>) -> Result<(), Error> {
        match self.news.find_by_slug(slug).await.map_err(map_content_error)? {
            Some(other) if Some(other.id) != owner => Err(duplicate_slug(slug.as_str())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<E, N> ContentCommand for ContentService<E, N>
where
    E: EventRepository,
    N: NewsPostRepository,
{
    async fn create_event(&self, form: EventForm) -> Result<EventRecord, Error> {
        let draft = form.validate()?;
        self.event_slug_free(&draft.slug, None).await?;
        let record = EventRecord::create(EventId::random(), draft, stored_now(&*self.clock));
        self.events.insert(&record).await.map_err(map_content_error)?;
        invalidate(&*self.event_cache, CollectionKey::Events).await;
        info!(event_id = %record.id, slug = %record.slug, "event created");
        Ok(record)
    }

    async fn update_event(&self, id: &EventId, form: EventForm) -> Result<EventRecord, Error> {
        let draft = form.validate()?;
        let current = self
            .events
            .find_by_id(id)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| Error::not_found(format!("event {id} not found")))?;
        self.event_slug_free(&draft.slug, Some(current.id)).await?;
        let record = current.revise(draft, stored_now(&*self.clock));
        self.events.update(&record).await.map_err(map_content_error)?;
        invalidate(&*self.event_cache, CollectionKey::Events).await;
        info!(event_id = %record.id, "event updated");
        Ok(record)
    }

    async fn create_news_post(&self, form: NewsPostForm) -> Result<NewsPostRecord, Error> {
        let draft = form.validate()?;
        self.news_slug_free(&draft.slug, None).await?;
        let record = NewsPostRecord::create(NewsPostId::random(), draft, stored_now(&*self.clock));
        self.news.insert(&record).await.map_err(map_content_error)?;
        invalidate(&*self.news_cache, CollectionKey::NewsPosts).await;
        info!(news_post_id = %record.id, slug = %record.slug, "news post created");
        Ok(record)
    }

    async fn update_news_post(
        &self,
        id: &NewsPostId,
        form: NewsPostForm,
    ) -> Result<NewsPostRecord, Error> {
        let draft = form.validate()?;
        let current = self
            .news
            .find_by_id(id)
            .await
            .map_err(map_content_error)?
            .ok_or_else(|| Error::not_found(format!("news post {id} not found")))?;
        self.news_slug_free(&draft.slug, Some(current.id)).await?;
        let record = current.revise(draft, stored_now(&*self.clock));
        self.news.update(&record).await.map_err(map_content_error)?;
        invalidate(&*self.news_cache, CollectionKey::NewsPosts).await;
        info!(news_post_id = %record.id, "news post updated");
        Ok(record)
    }
}

#[async_trait]
impl<E, N> ContentQuery for ContentService<E, N>
where
    E: EventRepository,
    N: NewsPostRepository,
{
    async fn public_events(&self) -> Result<Vec<EventRecord>, Error> {
        let all = read_through(&*self.event_cache, CollectionKey::Events, || async {
            self.events.list_all().await.map_err(map_content_error)
        })
        .await?;
        Ok(public_events(all.as_ref().clone()))
    }

    async fn event_by_slug(&self, slug: &Slug) -> Result<EventRecord, Error> {
        self.events
            .find_by_slug(slug)
            .await
            .map_err(map_content_error)?
            .filter(|event| event.published)
            .ok_or_else(|| Error::not_found(format!("event {slug} not found")))
    }

    async fn public_news(&self) -> Result<Vec<NewsPostRecord>, Error> {
        let all = read_through(&*self.news_cache, CollectionKey::NewsPosts, || async {
            self.news.list_all().await.map_err(map_content_error)
        })
        .await?;
        Ok(public_news(all.as_ref().clone(), self.clock.utc()))
    }

    async fn news_post_by_slug(&self, slug: &Slug) -> Result<NewsPostRecord, Error> {
        let now = self.clock.utc();
        self.news
            .find_by_slug(slug)
            .await
            .map_err(map_content_error)?
            .filter(|post| post.is_published(now))
            .ok_or_else(|| Error::not_found(format!("news post {slug} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockEventRepository, MockNewsPostRepository, NoopCollectionCache};
    use crate::domain::ErrorCode;
    use crate::test_support::{MutableClock, fixture_time};
    use chrono::Duration;
    use rstest::rstest;

    fn make_service(
        events: MockEventRepository,
        news: MockNewsPostRepository,
    ) -> ContentService<MockEventRepository, MockNewsPostRepository> {
        ContentService::new(
            Arc::new(events),
            Arc::new(news),
            Arc::new(NoopCollectionCache),
            Arc::new(NoopCollectionCache),
            Arc::new(MutableClock::at_fixture_time()),
        )
    }

    fn post(slug: &str, published_at: Option<chrono::DateTime<chrono::Utc>>) -> NewsPostRecord {
        let draft = NewsPostForm {
            title: Some(slug.to_owned()),
            slug: Some(slug.to_owned()),
            body: Some("Body".into()),
            published_at,
            ..NewsPostForm::default()
        }
        .validate()
        .expect("valid post");
        NewsPostRecord::create(NewsPostId::random(), draft, fixture_time())
    }

    #[rstest]
    #[tokio::test]
    async fn create_event_rejects_duplicate_slug() {
        let existing = EventRecord::create(
            EventId::random(),
            EventForm {
                title: Some("Gala".into()),
                slug: Some("gala".into()),
                starts_at: Some(fixture_time()),
                ..EventForm::default()
            }
            .validate()
            .expect("valid event"),
            fixture_time(),
        );
        let mut events = MockEventRepository::new();
        events
            .expect_find_by_slug()
            .return_once(move |_| Ok(Some(existing)));
        events.expect_insert().never();

        let form = EventForm {
            title: Some("Another gala".into()),
            slug: Some("gala".into()),
            starts_at: Some(fixture_time()),
            ..EventForm::default()
        };
        let err = make_service(events, MockNewsPostRepository::new())
            .create_event(form)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn public_news_hides_drafts_and_scheduled_posts() {
        let posts = vec![
            post("draft", None),
            post("scheduled", Some(fixture_time() + Duration::days(3))),
            post("older", Some(fixture_time() - Duration::days(5))),
            post("newer", Some(fixture_time() - Duration::days(1))),
        ];
        let mut news = MockNewsPostRepository::new();
        news.expect_list_all().return_once(move || Ok(posts));

        let public = make_service(MockEventRepository::new(), news)
            .public_news()
            .await
            .expect("news");
        let slugs: Vec<_> = public.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);
    }

    #[rstest]
    #[tokio::test]
    async fn unpublished_post_is_not_found_by_slug() {
        let draft = post("draft", None);
        let mut news = MockNewsPostRepository::new();
        news.expect_find_by_slug()
            .return_once(move |_| Ok(Some(draft)));

        let slug = Slug::new("draft").expect("slug");
        let err = make_service(MockEventRepository::new(), news)
            .news_post_by_slug(&slug)
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
