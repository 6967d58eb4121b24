//! In-memory campaign, donation and donor stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    CampaignRepository, CampaignRepositoryError, DonationRepository, DonationRepositoryError,
    DonorRepository,
};
use crate::domain::{
    CampaignId, CampaignParts, CampaignRecord, DonationId, DonationRecord, DonationStatus,
    DonorRecord, EmailAddress, MinorUnits, Slug,
};

fn newest_first<T, F>(mut items: Vec<T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

/// Campaigns with a unique slug index.
#[derive(Debug, Default)]
pub struct MemoryCampaignRepository {
    rows: RwLock<Vec<CampaignRecord>>,
}

impl MemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignRepository for MemoryCampaignRepository {
    async fn insert(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.slug == record.slug) {
            return Err(CampaignRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn update(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|row| row.slug == record.slug && row.id != record.id)
        {
            return Err(CampaignRepositoryError::duplicate_slug(record.slug.as_str()));
        }
        let Some(stored) = rows.iter_mut().find(|row| row.id == record.id) else {
            return Err(CampaignRepositoryError::not_found(record.id.to_string()));
        };
        // Keep the stored total; only settlements move it.
        *stored = CampaignRecord::from_parts(CampaignParts {
            id: record.id,
            title: record.title.clone(),
            slug: record.slug.clone(),
            description: record.description.clone(),
            goal_amount: record.goal_amount,
            current_amount: stored.current_amount(),
            starts_on: record.starts_on,
            ends_on: record.ends_on,
            status: record.status,
            featured: record.featured,
            created_at: stored.created_at,
            updated_at: record.updated_at,
        });
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CampaignId,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        Ok(self.rows.read().await.iter().find(|row| row.id == *id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.slug == *slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<CampaignRecord>, CampaignRepositoryError> {
        let all = self.rows.read().await.clone();
        Ok(newest_first(all, |row| row.created_at))
    }

    async fn add_contribution(
        &self,
        id: &CampaignId,
        amount: MinorUnits,
        at: DateTime<Utc>,
    ) -> Result<(), CampaignRepositoryError> {
        let mut rows = self.rows.write().await;
        let Some(stored) = rows.iter_mut().find(|row| row.id == *id) else {
            return Err(CampaignRepositoryError::not_found(id.to_string()));
        };
        stored.record_contribution(amount, at);
        Ok(())
    }
}

/// Donations and donors. One value serves both ports, mirroring the
/// Postgres adapter.
#[derive(Debug, Default)]
pub struct MemoryDonationRepository {
    donations: RwLock<Vec<DonationRecord>>,
    donors: RwLock<Vec<DonorRecord>>,
}

impl MemoryDonationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DonationRepository for MemoryDonationRepository {
    async fn insert(&self, record: &DonationRecord) -> Result<(), DonationRepositoryError> {
        self.donations.write().await.push(record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<DonationRecord>, DonationRepositoryError> {
        Ok(self
            .donations
            .read()
            .await
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<DonationRecord>, DonationRepositoryError> {
        let all = self.donations.read().await.clone();
        Ok(newest_first(all, |row| row.created_at))
    }

    async fn compare_and_set_status(
        &self,
        record: &DonationRecord,
        from: DonationStatus,
    ) -> Result<bool, DonationRepositoryError> {
        let mut rows = self.donations.write().await;
        let Some(stored) = rows.iter_mut().find(|row| row.id == record.id) else {
            return Err(DonationRepositoryError::not_found(record.id.to_string()));
        };
        if stored.status != from {
            return Ok(false);
        }
        stored.status = record.status;
        stored.updated_at = record.updated_at;
        Ok(true)
    }
}

#[async_trait]
impl DonorRepository for MemoryDonationRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<DonorRecord>, DonationRepositoryError> {
        Ok(self
            .donors
            .read()
            .await
            .iter()
            .find(|donor| donor.email == *email)
            .cloned())
    }

    async fn upsert_by_email(
        &self,
        donor: &DonorRecord,
    ) -> Result<DonorRecord, DonationRepositoryError> {
        let mut donors = self.donors.write().await;
        if let Some(existing) = donors.iter().find(|known| known.email == donor.email) {
            return Ok(existing.clone());
        }
        donors.push(donor.clone());
        Ok(donor.clone())
    }

    async fn list_all(&self) -> Result<Vec<DonorRecord>, DonationRepositoryError> {
        let all = self.donors.read().await.clone();
        Ok(newest_first(all, |donor| donor.created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Cadence, CampaignForm, DonorId};
    use crate::test_support::fixture_time;
    use rstest::rstest;

    fn campaign(slug: &str) -> CampaignRecord {
        let draft = CampaignForm {
            title: Some("Warm winter".into()),
            slug: Some(slug.into()),
            goal_amount: Some(10_000),
            status: Some("active".into()),
            ..CampaignForm::default()
        }
        .validate()
        .expect("valid campaign");
        CampaignRecord::create(CampaignId::random(), draft, fixture_time())
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_slug_is_refused() {
        let repo = MemoryCampaignRepository::new();
        repo.insert(&campaign("warm-winter")).await.expect("first");
        let err = repo
            .insert(&campaign("warm-winter"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, CampaignRepositoryError::DuplicateSlug { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_running_total() {
        let repo = MemoryCampaignRepository::new();
        let original = campaign("warm-winter");
        repo.insert(&original).await.expect("insert");
        repo.add_contribution(
            &original.id,
            MinorUnits::new(2_500).expect("amount"),
            fixture_time(),
        )
        .await
        .expect("credit");

        // `original` still carries a zero total; the store must not adopt it.
        repo.update(&original).await.expect("update");
        let stored = repo
            .find_by_id(&original.id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(stored.current_amount().get(), 2_500);
    }

    #[rstest]
    #[tokio::test]
    async fn compare_and_set_only_moves_from_expected_status() {
        let repo = MemoryDonationRepository::new();
        let pending = DonationRecord {
            id: DonationId::random(),
            amount: MinorUnits::new(500).expect("amount"),
            donor_id: DonorId::random(),
            campaign_id: None,
            cadence: Cadence::OneTime,
            status: DonationStatus::Pending,
            created_at: fixture_time(),
            updated_at: fixture_time(),
        };
        DonationRepository::insert(&repo, &pending).await.expect("insert");
        let succeeded = pending
            .transition(DonationStatus::Succeeded, fixture_time())
            .expect("legal");

        assert!(
            repo.compare_and_set_status(&succeeded, DonationStatus::Pending)
                .await
                .expect("cas")
        );
        assert!(
            !repo
                .compare_and_set_status(&succeeded, DonationStatus::Pending)
                .await
                .expect("cas")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn returning_donor_keeps_first_record() {
        let repo = MemoryDonationRepository::new();
        let first = DonorRecord {
            id: DonorId::random(),
            full_name: "Pat Smith".into(),
            email: EmailAddress::parse("pat@example.com").expect("email"),
            created_at: fixture_time(),
        };
        let again = DonorRecord {
            id: DonorId::random(),
            full_name: "Patricia Smith".into(),
            ..first.clone()
        };
        repo.upsert_by_email(&first).await.expect("insert");
        let stored = repo.upsert_by_email(&again).await.expect("reuse");
        assert_eq!(stored.id, first.id);
        assert_eq!(DonorRepository::list_all(&repo).await.expect("list").len(), 1);
    }
}
