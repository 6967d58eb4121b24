//! Campaign services: administrative edits and public progress reads.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::application_service::stored_now;
use crate::domain::collections::{invalidate, read_through};
use crate::domain::ports::{
    CampaignCommand, CampaignQuery, CampaignRepository, CampaignRepositoryError, CollectionCache,
    CollectionKey,
};
use crate::domain::{
    CampaignForm, CampaignId, CampaignRecord, Error, Slug, public_campaigns,
};

pub(crate) fn map_campaign_error(error: CampaignRepositoryError) -> Error {
    match error {
        CampaignRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("campaign repository unavailable: {message}"))
        }
        CampaignRepositoryError::Query { message } => {
            Error::internal(format!("campaign repository error: {message}"))
        }
        CampaignRepositoryError::DuplicateSlug { slug } => duplicate_slug(&slug),
        CampaignRepositoryError::NotFound { id } => {
            Error::not_found(format!("campaign {id} not found"))
        }
    }
}

fn duplicate_slug(slug: &str) -> Error {
    Error::conflict(format!("campaign slug {slug} is already in use"))
        .with_details(json!({ "field": "slug", "reason": "duplicate" }))
}

/// Service implementing [`CampaignCommand`] and [`CampaignQuery`].
#[derive(Clone)]
pub struct CampaignService<R> {
    repo: Arc<R>,
    cache: Arc<dyn CollectionCache<CampaignRecord>>,
    clock: Arc<dyn Clock>,
}

impl<R> CampaignService<R> {
    pub fn new(
        repo: Arc<R>,
        cache: Arc<dyn CollectionCache<CampaignRecord>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, cache, clock }
    }
}

impl<R> CampaignService<R>
where
    R: CampaignRepository,
{
    async fn ensure_slug_free(&self, slug: &Slug, owner: Option<CampaignId>) -> Result<(), Error> {
        let existing = self
            .repo
            .find_by_slug(slug)
            .await
            .map_err(map_campaign_error)?;
        match existing {
            Some(other) if Some(other.id) != owner => Err(duplicate_slug(slug.as_str())),
            _ => Ok(()),
        }
    }

    async fn all(&self) -> Result<Arc<Vec<CampaignRecord>>, Error> {
        read_through(&*self.cache, CollectionKey::Campaigns, || async {
            self.repo.list_all().await.map_err(map_campaign_error)
        })
        .await
    }
}

#[async_trait]
impl<R> CampaignCommand for CampaignService<R>
where
    R: CampaignRepository,
{
    async fn create(&self, form: CampaignForm) -> Result<CampaignRecord, Error> {
        let draft = form.validate()?;
        self.ensure_slug_free(&draft.slug, None).await?;

        let record = CampaignRecord::create(CampaignId::random(), draft, stored_now(&*self.clock));
        self.repo.insert(&record).await.map_err(map_campaign_error)?;
        invalidate(&*self.cache, CollectionKey::Campaigns).await;

        info!(campaign_id = %record.id, slug = %record.slug, "campaign created");
        Ok(record)
    }

    async fn update(&self, id: &CampaignId, form: CampaignForm) -> Result<CampaignRecord, Error> {
        let draft = form.validate()?;
        let current = self
            .repo
            .find_by_id(id)
            .await
            .map_err(map_campaign_error)?
            .ok_or_else(|| Error::not_found(format!("campaign {id} not found")))?;
        self.ensure_slug_free(&draft.slug, Some(current.id)).await?;

        let record = current.revise(draft, stored_now(&*self.clock));
        self.repo.update(&record).await.map_err(map_campaign_error)?;
        invalidate(&*self.cache, CollectionKey::Campaigns).await;

        info!(campaign_id = %record.id, "campaign updated");
        Ok(record)
    }
}

#[async_trait]
impl<R> CampaignQuery for CampaignService<R>
where
    R: CampaignRepository,
{
    async fn list_public(&self) -> Result<Vec<CampaignRecord>, Error> {
        let all = self.all().await?;
        Ok(public_campaigns(all.as_ref().clone()))
    }

    async fn get_public(&self, slug: &Slug) -> Result<CampaignRecord, Error> {
        self.repo
            .find_by_slug(slug)
            .await
            .map_err(map_campaign_error)?
            .filter(CampaignRecord::is_active)
            .ok_or_else(|| Error::not_found(format!("campaign {slug} not found")))
    }

    async fn list_all(&self) -> Result<Vec<CampaignRecord>, Error> {
        Ok(self.all().await?.as_ref().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCampaignRepository, NoopCollectionCache};
    use crate::domain::{CampaignParts, CampaignStatus, ErrorCode, MinorUnits};
    use crate::test_support::{MutableClock, fixture_time};
    use rstest::{fixture, rstest};

    #[fixture]
    fn form() -> CampaignForm {
        CampaignForm {
            title: Some("Warm Winter Drive".into()),
            slug: Some("warm-winter".into()),
            goal_amount: Some(500_000),
            status: Some("active".into()),
            ..CampaignForm::default()
        }
    }

    fn campaign(slug: &str, status: CampaignStatus, current: i64) -> CampaignRecord {
        CampaignRecord::from_parts(CampaignParts {
            id: CampaignId::random(),
            title: slug.to_owned(),
            slug: Slug::new(slug).expect("valid slug"),
            description: None,
            goal_amount: MinorUnits::new(10_000).expect("goal"),
            current_amount: MinorUnits::new(current).expect("total"),
            starts_on: None,
            ends_on: None,
            status,
            featured: false,
            created_at: fixture_time(),
            updated_at: fixture_time(),
        })
    }

    fn make_service(repo: MockCampaignRepository) -> CampaignService<MockCampaignRepository> {
        CampaignService::new(
            Arc::new(repo),
            Arc::new(NoopCollectionCache),
            Arc::new(MutableClock::at_fixture_time()),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn create_starts_with_an_empty_total(form: CampaignForm) {
        let mut repo = MockCampaignRepository::new();
        repo.expect_find_by_slug().times(1).return_once(|_| Ok(None));
        repo.expect_insert()
            .withf(|record| record.current_amount() == MinorUnits::ZERO)
            .times(1)
            .return_once(|_| Ok(()));

        let record = make_service(repo).create(form).await.expect("created");
        assert_eq!(record.slug.as_str(), "warm-winter");
        assert_eq!(record.created_at, fixture_time());
        assert!((record.progress_percent() - 0.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_a_taken_slug(form: CampaignForm) {
        let taken = campaign("warm-winter", CampaignStatus::Draft, 0);
        let mut repo = MockCampaignRepository::new();
        repo.expect_find_by_slug()
            .return_once(move |_| Ok(Some(taken)));
        repo.expect_insert().never();

        let err = make_service(repo).create(form).await.expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_own_slug_and_running_total(form: CampaignForm) {
        let existing = campaign("warm-winter", CampaignStatus::Active, 2_500);
        let id = existing.id;
        let same = existing.clone();
        let mut repo = MockCampaignRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_find_by_slug()
            .return_once(move |_| Ok(Some(same)));
        repo.expect_update()
            .withf(|record| record.current_amount().get() == 2_500)
            .times(1)
            .return_once(|_| Ok(()));

        let updated = make_service(repo).update(&id, form).await.expect("updated");
        assert_eq!(updated.goal_amount.get(), 500_000);
        assert_eq!(updated.current_amount().get(), 2_500);
    }

    #[rstest]
    #[tokio::test]
    async fn public_lookup_hides_drafts() {
        let draft = campaign("spring-gala", CampaignStatus::Draft, 0);
        let mut repo = MockCampaignRepository::new();
        repo.expect_find_by_slug()
            .return_once(move |_| Ok(Some(draft)));

        let slug = Slug::new("spring-gala").expect("slug");
        let err = make_service(repo).get_public(&slug).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn public_list_only_shows_active_campaigns() {
        let records = vec![
            campaign("draft-one", CampaignStatus::Draft, 0),
            campaign("live-one", CampaignStatus::Active, 15_000),
            campaign("done-one", CampaignStatus::Completed, 10_000),
        ];
        let mut repo = MockCampaignRepository::new();
        repo.expect_list_all().return_once(move || Ok(records));

        let public = make_service(repo).list_public().await.expect("list");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].slug.as_str(), "live-one");
        assert!((public[0].progress_percent() - 100.0).abs() < f64::EPSILON);
    }
}
