//! In-memory event and news post stores.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{ContentRepositoryError, EventRepository, NewsPostRepository};
use crate::domain::{EventId, EventRecord, NewsPostId, NewsPostRecord, Slug};

/// Events and news posts, each with its own slug namespace.
#[derive(Debug, Default)]
pub struct MemoryContentRepository {
    events: RwLock<Vec<EventRecord>>,
    news: RwLock<Vec<NewsPostRecord>>,
}

impl MemoryContentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryContentRepository {
    async fn insert(&self, record: &EventRecord) -> Result<(), ContentRepositoryError> {
        let mut rows = self.events.write().await;
        if rows.iter().any(|row| row.slug == record.slug) {
            return Err(ContentRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &EventRecord) -> Result<(), ContentRepositoryError> {
        let mut rows = self.events.write().await;
        if rows
            .iter()
            .any(|row| row.slug == record.slug && row.id != record.id)
        {
            return Err(ContentRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        match rows.iter_mut().find(|row| row.id == record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(ContentRepositoryError::not_found(record.id.to_string())),
        }
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<EventRecord>, ContentRepositoryError> {
        Ok(self.events.read().await.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<EventRecord>, ContentRepositoryError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .find(|row| row.slug == *slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<EventRecord>, ContentRepositoryError> {
        let mut all = self.events.read().await.clone();
        all.sort_by_key(|row| row.starts_at);
        Ok(all)
    }
}

#[async_trait]
impl NewsPostRepository for MemoryContentRepository {
    async fn insert(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        let mut rows = self.news.write().await;
        if rows.iter().any(|row| row.slug == record.slug) {
            return Err(ContentRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &NewsPostRecord) -> Result<(), ContentRepositoryError> {
        let mut rows = self.news.write().await;
        if rows
            .iter()
            .any(|row| row.slug == record.slug && row.id != record.id)
        {
            return Err(ContentRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        match rows.iter_mut().find(|row| row.id == record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(ContentRepositoryError::not_found(record.id.to_string())),
        }
    }

    async fn find_by_id(
        &self,
        id: &NewsPostId,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        Ok(self.news.read().await.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<NewsPostRecord>, ContentRepositoryError> {
        Ok(self
            .news
            .read()
            .await
            .iter()
            .find(|row| row.slug == *slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<NewsPostRecord>, ContentRepositoryError> {
        let mut all = self.news.read().await.clone();
        all.sort_by_key(|row| std::cmp::Reverse(row.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventForm;
    use crate::test_support::fixture_time;
    use rstest::rstest;

    fn event(slug: &str) -> EventRecord {
        let draft = EventForm {
            title: Some("Gala".into()),
            slug: Some(slug.into()),
            starts_at: Some(fixture_time()),
            ..EventForm::default()
        }
        .validate()
        .expect("valid event");
        EventRecord::create(EventId::random(), draft, fixture_time())
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_onto_a_taken_slug_is_refused() {
        let repo = MemoryContentRepository::new();
        let gala = event("gala");
        let picnic = event("picnic");
        EventRepository::insert(&repo, &gala).await.expect("gala");
        EventRepository::insert(&repo, &picnic).await.expect("picnic");

        let clash = EventRecord {
            slug: gala.slug.clone(),
            ..picnic
        };
        let err = EventRepository::update(&repo, &clash)
            .await
            .expect_err("clash");
        assert!(matches!(err, ContentRepositoryError::DuplicateSlug { .. }));
    }
}
