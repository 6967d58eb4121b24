//! Donation checkout and settlement services.
//!
//! Checkout never handles card data: it records a pending donation and hands
//! back the hosted checkout link configured for the donation's cadence, with
//! the donation id attached as `client_reference_id`.
//!
//! Settlement runs through the donation state machine. Moving a pending
//! donation to `succeeded` credits its campaign exactly once; the status
//! write is a compare-and-set so a replayed settlement cannot credit twice.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};
use url::Url;

use crate::domain::application_service::stored_now;
use crate::domain::campaign_service::map_campaign_error;
use crate::domain::collections::{CollectionCaches, invalidate, read_through};
use crate::domain::ports::{
    CampaignRepository, CheckoutSession, CollectionKey, DonationCommand, DonationQuery,
    DonationRepository, DonationRepositoryError, DonorRepository,
};
use crate::domain::validation::{FieldError, FieldErrorCode, FieldErrors};
use crate::domain::{
    Cadence, CampaignId, CheckoutForm, DonationFilter, DonationId, DonationListing,
    DonationRecord, DonationStatus, DonorFilter, DonorId, DonorRecord, Error, Listing, Slug,
};

/// Query parameter carrying the donation id to the hosted checkout.
pub const CLIENT_REFERENCE_PARAM: &str = "client_reference_id";

/// Hosted checkout pages, one per cadence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutLinks {
    pub one_time: Option<Url>,
    pub monthly: Option<Url>,
}

impl CheckoutLinks {
    pub fn for_cadence(&self, cadence: Cadence) -> Option<&Url> {
        match cadence {
            Cadence::OneTime => self.one_time.as_ref(),
            Cadence::Monthly => self.monthly.as_ref(),
        }
    }
}

fn map_donation_error(error: DonationRepositoryError) -> Error {
    match error {
        DonationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("donation repository unavailable: {message}"))
        }
        DonationRepositoryError::Query { message } => {
            Error::internal(format!("donation repository error: {message}"))
        }
        DonationRepositoryError::NotFound { id } => {
            Error::not_found(format!("donation {id} not found"))
        }
    }
}

fn inactive_campaign(slug: &Slug) -> Error {
    let mut errors = FieldErrors::new();
    errors.push(FieldError::new(
        "campaignSlug",
        FieldErrorCode::InvalidChoice,
        format!("campaign {slug} is not accepting donations"),
    ));
    errors.into()
}

/// Service implementing [`DonationCommand`] and [`DonationQuery`].
#[derive(Clone)]
pub struct DonationService<D, P, C> {
    donations: Arc<D>,
    donors: Arc<P>,
    campaigns: Arc<C>,
    caches: CollectionCaches,
    clock: Arc<dyn Clock>,
    links: CheckoutLinks,
}

impl<D, P, C> DonationService<D, P, C> {
    pub fn new(
        donations: Arc<D>,
        donors: Arc<P>,
        campaigns: Arc<C>,
        caches: CollectionCaches,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            donations,
            donors,
            campaigns,
            caches,
            clock,
            links: CheckoutLinks::default(),
        }
    }

    /// Set the hosted checkout pages.
    pub fn with_checkout_links(mut self, links: CheckoutLinks) -> Self {
        self.links = links;
        self
    }
}

impl<D, P, C> DonationService<D, P, C>
where
    D: DonationRepository,
    P: DonorRepository,
    C: CampaignRepository,
{
    async fn campaign_for(&self, slug: Option<&Slug>) -> Result<Option<CampaignId>, Error> {
        let Some(slug) = slug else {
            return Ok(None);
        };
        let campaign = self
            .campaigns
            .find_by_slug(slug)
            .await
            .map_err(map_campaign_error)?;
        match campaign {
            Some(campaign) if campaign.is_active() => Ok(Some(campaign.id)),
            _ => Err(inactive_campaign(slug)),
        }
    }

    async fn all_donations(&self) -> Result<Arc<Vec<DonationRecord>>, Error> {
        read_through(&*self.caches.donations, CollectionKey::Donations, || async {
            self.donations.list_all().await.map_err(map_donation_error)
        })
        .await
    }

    async fn all_donors(&self) -> Result<Arc<Vec<DonorRecord>>, Error> {
        read_through(&*self.caches.donors, CollectionKey::Donors, || async {
            self.donors.list_all().await.map_err(map_donation_error)
        })
        .await
    }
}

#[async_trait]
impl<D, P, C> DonationCommand for DonationService<D, P, C>
where
    D: DonationRepository,
    P: DonorRepository,
    C: CampaignRepository,
{
    async fn start_checkout(&self, form: CheckoutForm) -> Result<CheckoutSession, Error> {
        let intent = form.validate()?;
        let campaign_id = self.campaign_for(intent.campaign_slug.as_ref()).await?;
        let Some(base) = self.links.for_cadence(intent.cadence) else {
            warn!(cadence = intent.cadence.as_str(), "no checkout link configured");
            return Err(Error::service_unavailable(format!(
                "{} checkout is not available",
                intent.cadence
            )));
        };

        let now = stored_now(&*self.clock);
        let candidate = DonorRecord {
            id: DonorId::random(),
            full_name: intent.donor_name.clone(),
            email: intent.donor_email.clone(),
            created_at: now,
        };
        let donor = self
            .donors
            .upsert_by_email(&candidate)
            .await
            .map_err(map_donation_error)?;

        let donation = DonationRecord::pending(DonationId::random(), donor.id, &intent, campaign_id, now);
        self.donations
            .insert(&donation)
            .await
            .map_err(map_donation_error)?;
        invalidate(&*self.caches.donations, CollectionKey::Donations).await;
        invalidate(&*self.caches.donors, CollectionKey::Donors).await;

        let mut checkout_url = base.clone();
        checkout_url
            .query_pairs_mut()
            .append_pair(CLIENT_REFERENCE_PARAM, &donation.id.to_string());

        info!(
            donation_id = %donation.id,
            amount = donation.amount.get(),
            cadence = donation.cadence.as_str(),
            "checkout started"
        );
        Ok(CheckoutSession {
            donation_id: donation.id,
            checkout_url,
        })
    }

    async fn update_status(
        &self,
        id: &DonationId,
        to: DonationStatus,
    ) -> Result<DonationRecord, Error> {
        let current = self
            .donations
            .find_by_id(id)
            .await
            .map_err(map_donation_error)?
            .ok_or_else(|| Error::not_found(format!("donation {id} not found")))?;
        let now = stored_now(&*self.clock);
        let next = current.transition(to, now)?;

        let applied = self
            .donations
            .compare_and_set_status(&next, current.status)
            .await
            .map_err(map_donation_error)?;
        if !applied {
            return Err(Error::conflict(format!(
                "donation {id} changed status concurrently"
            )));
        }
        invalidate(&*self.caches.donations, CollectionKey::Donations).await;

        if current.credits_campaign_on(to) {
            if let Some(campaign_id) = current.campaign_id {
                self.campaigns
                    .add_contribution(&campaign_id, current.amount, now)
                    .await
                    .map_err(map_campaign_error)?;
                invalidate(&*self.caches.campaigns, CollectionKey::Campaigns).await;
                info!(%campaign_id, amount = current.amount.get(), "campaign credited");
            }
        }

        info!(
            donation_id = %id,
            from = current.status.as_str(),
            to = next.status.as_str(),
            "donation status changed"
        );
        Ok(next)
    }
}

#[async_trait]
impl<D, P, C> DonationQuery for DonationService<D, P, C>
where
    D: DonationRepository,
    P: DonorRepository,
    C: CampaignRepository,
{
    async fn list_donations(
        &self,
        filter: &DonationFilter,
    ) -> Result<Listing<DonationListing>, Error> {
        let donations = self.all_donations().await?;
        let donors = self.all_donors().await?;
        let by_id: HashMap<DonorId, &DonorRecord> =
            donors.iter().map(|donor| (donor.id, donor)).collect();

        let items: Vec<_> = donations
            .iter()
            .map(|donation| DonationListing {
                donation: donation.clone(),
                donor: by_id.get(&donation.donor_id).map(|donor| (*donor).clone()),
            })
            .filter(|listing| filter.matches(listing))
            .collect();
        Ok(Listing::from(items))
    }

    async fn list_donors(&self, filter: &DonorFilter) -> Result<Listing<DonorRecord>, Error> {
        let donors = self.all_donors().await?;
        let items: Vec<_> = donors
            .iter()
            .filter(|donor| filter.matches(*donor))
            .cloned()
            .collect();
        Ok(Listing::from(items))
    }
}

#[cfg(test)]
#[path = "donation_service_tests.rs"]
mod tests;
