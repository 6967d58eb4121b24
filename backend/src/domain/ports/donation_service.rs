//! Driving ports for donation checkout and the donation back office.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::domain::{
    CheckoutForm, DonationFilter, DonationId, DonationListing, DonationRecord, DonationStatus,
    DonorFilter, DonorRecord, Error, Listing,
};

/// Where to send the browser after a pending donation is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub donation_id: DonationId,
    pub checkout_url: Url,
}

/// Donation mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationCommand: Send + Sync {
    /// Record a pending donation and pick the hosted checkout page.
    async fn start_checkout(&self, form: CheckoutForm) -> Result<CheckoutSession, Error>;

    /// Apply a donation state machine transition.
    async fn update_status(
        &self,
        id: &DonationId,
        to: DonationStatus,
    ) -> Result<DonationRecord, Error>;
}

/// Back-office donation and donor reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationQuery: Send + Sync {
    async fn list_donations(
        &self,
        filter: &DonationFilter,
    ) -> Result<Listing<DonationListing>, Error>;

    async fn list_donors(&self, filter: &DonorFilter) -> Result<Listing<DonorRecord>, Error>;
}

/// Fixture with no checkout links and no stored donations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationService;

#[async_trait]
impl DonationCommand for FixtureDonationService {
    async fn start_checkout(&self, form: CheckoutForm) -> Result<CheckoutSession, Error> {
        form.validate()?;
        Err(Error::service_unavailable("checkout is not configured"))
    }

    async fn update_status(
        &self,
        id: &DonationId,
        _to: DonationStatus,
    ) -> Result<DonationRecord, Error> {
        Err(Error::not_found(format!("donation {id} not found")))
    }
}

#[async_trait]
impl DonationQuery for FixtureDonationService {
    async fn list_donations(
        &self,
        _filter: &DonationFilter,
    ) -> Result<Listing<DonationListing>, Error> {
        Ok(Listing::from(Vec::new()))
    }

    async fn list_donors(&self, _filter: &DonorFilter) -> Result<Listing<DonorRecord>, Error> {
        Ok(Listing::from(Vec::new()))
    }
}
