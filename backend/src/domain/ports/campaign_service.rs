//! Driving ports for campaigns.

use async_trait::async_trait;

use crate::domain::{CampaignForm, CampaignId, CampaignRecord, Error, Slug};

/// Administrative campaign mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignCommand: Send + Sync {
    async fn create(&self, form: CampaignForm) -> Result<CampaignRecord, Error>;
    async fn update(&self, id: &CampaignId, form: CampaignForm) -> Result<CampaignRecord, Error>;
}

/// Campaign reads for both the public site and the back office.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignQuery: Send + Sync {
    /// Active campaigns, featured first then newest.
    async fn list_public(&self) -> Result<Vec<CampaignRecord>, Error>;

    /// One active campaign by slug.
    async fn get_public(&self, slug: &Slug) -> Result<CampaignRecord, Error>;

    /// Every campaign regardless of status, newest first.
    async fn list_all(&self) -> Result<Vec<CampaignRecord>, Error>;
}

/// Fixture over an empty campaign store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCampaignService;

#[async_trait]
impl CampaignCommand for FixtureCampaignService {
    async fn create(&self, form: CampaignForm) -> Result<CampaignRecord, Error> {
        form.validate()?;
        Err(Error::service_unavailable("campaign store is not configured"))
    }

    async fn update(&self, id: &CampaignId, _form: CampaignForm) -> Result<CampaignRecord, Error> {
        Err(Error::not_found(format!("campaign {id} not found")))
    }
}

#[async_trait]
impl CampaignQuery for FixtureCampaignService {
    async fn list_public(&self) -> Result<Vec<CampaignRecord>, Error> {
        Ok(Vec::new())
    }

    async fn get_public(&self, slug: &Slug) -> Result<CampaignRecord, Error> {
        Err(Error::not_found(format!("campaign {slug} not found")))
    }

    async fn list_all(&self) -> Result<Vec<CampaignRecord>, Error> {
        Ok(Vec::new())
    }
}
