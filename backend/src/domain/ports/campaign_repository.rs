//! Port for campaign persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CampaignId, CampaignRecord, MinorUnits, Slug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by campaign repository adapters.
    pub enum CampaignRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "campaign repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "campaign repository query failed: {message}",
        /// Another campaign already uses the slug.
        DuplicateSlug { slug: String } => "campaign slug {slug} is already in use",
        /// No campaign has the given id.
        NotFound { id: String } => "campaign {id} not found",
    }
}

/// Port for reading and writing campaigns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn insert(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError>;

    /// Overwrite the editable fields. The running total is left untouched.
    async fn update(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError>;

    async fn find_by_id(
        &self,
        id: &CampaignId,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError>;

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError>;

    /// Every campaign, newest first.
    async fn list_all(&self) -> Result<Vec<CampaignRecord>, CampaignRepositoryError>;

    /// Atomically add `amount` to the running total.
    async fn add_contribution(
        &self,
        id: &CampaignId,
        amount: MinorUnits,
        at: DateTime<Utc>,
    ) -> Result<(), CampaignRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCampaignRepository;

#[async_trait]
impl CampaignRepository for FixtureCampaignRepository {
    async fn insert(&self, _record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        Ok(())
    }

    async fn update(&self, _record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &CampaignId,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        Ok(None)
    }

    async fn find_by_slug(
        &self,
        _slug: &Slug,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<CampaignRecord>, CampaignRepositoryError> {
        Ok(Vec::new())
    }

    async fn add_contribution(
        &self,
        id: &CampaignId,
        _amount: MinorUnits,
        _at: DateTime<Utc>,
    ) -> Result<(), CampaignRepositoryError> {
        Err(CampaignRepositoryError::not_found(id.to_string()))
    }
}
