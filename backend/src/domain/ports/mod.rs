//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the collection cache, account lookup) are
//! implemented by outbound adapters. Driving ports (`*Command`, `*Query`,
//! [`LoginService`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod application_command;
mod application_query;
mod application_repository;
mod campaign_repository;
mod campaign_service;
mod collection_cache;
mod content_repository;
mod content_service;
mod donation_repository;
mod donation_service;
mod login_service;

#[cfg(test)]
pub use account_repository::{MockAccountRepository, MockRoleRepository};
pub use account_repository::{
    AccountRecord, AccountRepository, AccountRepositoryError, FixtureAccountRepository,
    RoleRepository,
};
#[cfg(test)]
pub use application_command::MockApplicationCommand;
pub use application_command::{
    ApplicationCommand, FixtureApplicationCommand, SubmissionReceipt, THANK_YOU_PATH,
};
#[cfg(test)]
pub use application_query::MockApplicationQuery;
pub use application_query::{ApplicationQuery, FixtureApplicationQuery};
#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{
    ApplicationRepository, ApplicationRepositoryError, FixtureApplicationRepository,
};
#[cfg(test)]
pub use campaign_repository::MockCampaignRepository;
pub use campaign_repository::{
    CampaignRepository, CampaignRepositoryError, FixtureCampaignRepository,
};
#[cfg(test)]
pub use campaign_service::{MockCampaignCommand, MockCampaignQuery};
pub use campaign_service::{CampaignCommand, CampaignQuery, FixtureCampaignService};
pub use collection_cache::{
    CacheLookup, CollectionCache, CollectionCacheError, CollectionKey, NoopCollectionCache,
};
#[cfg(test)]
pub use content_repository::{MockEventRepository, MockNewsPostRepository};
pub use content_repository::{
    ContentRepositoryError, EventRepository, FixtureContentRepository, NewsPostRepository,
};
#[cfg(test)]
pub use content_service::{MockContentCommand, MockContentQuery};
pub use content_service::{ContentCommand, ContentQuery, FixtureContentService};
#[cfg(test)]
pub use donation_repository::{MockDonationRepository, MockDonorRepository};
pub use donation_repository::{
    DonationRepository, DonationRepositoryError, DonorRepository, FixtureDonationRepository,
};
#[cfg(test)]
pub use donation_service::{MockDonationCommand, MockDonationQuery};
pub use donation_service::{
    CheckoutSession, DonationCommand, DonationQuery, FixtureDonationService,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{AuthenticatedUser, FIXTURE_ADMIN_ID, FixtureLoginService, LoginService};
