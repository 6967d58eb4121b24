//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, CampaignCommand, CampaignQuery, ContentCommand,
    ContentQuery, DonationCommand, DonationQuery, LoginService,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use vetpal::domain::ports::{
///     FixtureApplicationCommand, FixtureApplicationQuery, FixtureCampaignService,
///     FixtureContentService, FixtureDonationService, FixtureLoginService,
/// };
/// use vetpal::inbound::http::state::HttpState;
///
/// let state = HttpState {
///     applications: Arc::new(FixtureApplicationCommand),
///     applications_query: Arc::new(FixtureApplicationQuery),
///     campaigns: Arc::new(FixtureCampaignService),
///     campaigns_query: Arc::new(FixtureCampaignService),
///     donations: Arc::new(FixtureDonationService),
///     donations_query: Arc::new(FixtureDonationService),
///     content: Arc::new(FixtureContentService),
///     content_query: Arc::new(FixtureContentService),
///     login: Arc::new(FixtureLoginService),
///     clock: Arc::new(mockable::DefaultClock),
/// };
/// let _login = state.login.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub applications: Arc<dyn ApplicationCommand>,
    pub applications_query: Arc<dyn ApplicationQuery>,
    pub campaigns: Arc<dyn CampaignCommand>,
    pub campaigns_query: Arc<dyn CampaignQuery>,
    pub donations: Arc<dyn DonationCommand>,
    pub donations_query: Arc<dyn DonationQuery>,
    pub content: Arc<dyn ContentCommand>,
    pub content_query: Arc<dyn ContentQuery>,
    pub login: Arc<dyn LoginService>,
    /// Dates export file names; shared with the services.
    pub clock: Arc<dyn Clock>,
}
