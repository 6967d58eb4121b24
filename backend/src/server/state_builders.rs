//! Builders wiring repositories and services into [`HttpState`].

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::ports::{
    ApplicationRepository, CampaignRepository, DonationRepository, DonorRepository,
    EventRepository, FixtureLoginService, LoginService, NewsPostRepository,
};
use crate::domain::{
    AccountLoginService, ApplicationService, CampaignService, CheckoutLinks, CollectionCaches,
    ContentService, DonationService, TransitionPolicy,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::cache::in_memory_caches;
use crate::outbound::memory::{
    MemoryApplicationRepository, MemoryCampaignRepository, MemoryContentRepository,
    MemoryDonationRepository,
};
use crate::outbound::persistence::{
    DbPool, DieselAccountRepository, DieselApplicationRepository, DieselCampaignRepository,
    DieselContentRepository, DieselDonationRepository,
};

use super::ServerConfig;

/// Repositories behind every driving port.
pub(crate) struct Repositories<A, C, D, E> {
    pub applications: Arc<A>,
    pub campaigns: Arc<C>,
    pub donations: Arc<D>,
    pub content: Arc<E>,
    pub login: Arc<dyn LoginService>,
}

/// Cross-cutting service options.
#[derive(Clone)]
pub(crate) struct ServiceOptions {
    pub caches: CollectionCaches,
    pub clock: Arc<dyn Clock>,
    pub checkout_links: CheckoutLinks,
    pub transition_policy: TransitionPolicy,
}

impl ServiceOptions {
    fn from_config(config: &ServerConfig) -> Self {
        Self {
            caches: in_memory_caches(),
            clock: Arc::new(DefaultClock),
            checkout_links: config.checkout_links.clone(),
            transition_policy: config.transition_policy,
        }
    }
}

/// Wire domain services over `repos`.
pub(crate) fn http_state_from<A, C, D, E>(
    repos: Repositories<A, C, D, E>,
    options: ServiceOptions,
) -> HttpState
where
    A: ApplicationRepository + 'static,
    C: CampaignRepository + 'static,
    D: DonationRepository + DonorRepository + 'static,
    E: EventRepository + NewsPostRepository + 'static,
{
    let ServiceOptions {
        caches,
        clock,
        checkout_links,
        transition_policy,
    } = options;
    let applications = Arc::new(
        ApplicationService::new(repos.applications, caches.applications.clone(), clock.clone())
            .with_policy(transition_policy),
    );
    let campaigns = Arc::new(CampaignService::new(
        repos.campaigns.clone(),
        caches.campaigns.clone(),
        clock.clone(),
    ));
    let donations = Arc::new(
        DonationService::new(
            repos.donations.clone(),
            repos.donations,
            repos.campaigns,
            caches.clone(),
            clock.clone(),
        )
        .with_checkout_links(checkout_links),
    );
    let content = Arc::new(ContentService::new(
        repos.content.clone(),
        repos.content,
        caches.events.clone(),
        caches.news_posts.clone(),
        clock.clone(),
    ));
    HttpState {
        applications: applications.clone(),
        applications_query: applications,
        campaigns: campaigns.clone(),
        campaigns_query: campaigns,
        donations: donations.clone(),
        donations_query: donations,
        content: content.clone(),
        content_query: content,
        login: repos.login,
        clock,
    }
}

fn diesel_state(pool: &DbPool, options: ServiceOptions) -> HttpState {
    let accounts = Arc::new(DieselAccountRepository::new(pool.clone()));
    let login: Arc<dyn LoginService> = Arc::new(AccountLoginService::new(accounts.clone(), accounts));
    http_state_from(
        Repositories {
            applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
            campaigns: Arc::new(DieselCampaignRepository::new(pool.clone())),
            donations: Arc::new(DieselDonationRepository::new(pool.clone())),
            content: Arc::new(DieselContentRepository::new(pool.clone())),
            login,
        },
        options,
    )
}

/// Services over in-process storage. Records vanish on restart.
pub(crate) fn memory_state(options: ServiceOptions) -> HttpState {
    http_state_from(
        Repositories {
            applications: Arc::new(MemoryApplicationRepository::new()),
            campaigns: Arc::new(MemoryCampaignRepository::new()),
            donations: Arc::new(MemoryDonationRepository::new()),
            content: Arc::new(MemoryContentRepository::new()),
            login: Arc::new(FixtureLoginService),
        },
        options,
    )
}

/// In-memory services on `clock`, for integration tests driving the full app.
#[cfg(any(test, feature = "test-support"))]
pub fn memory_http_state(clock: Arc<dyn Clock>) -> HttpState {
    memory_state(ServiceOptions {
        caches: in_memory_caches(),
        clock,
        checkout_links: CheckoutLinks::default(),
        transition_policy: TransitionPolicy::default(),
    })
}

/// Build the HTTP state for `config`.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let options = ServiceOptions::from_config(config);
    match &config.db_pool {
        Some(pool) => diesel_state(pool, options),
        None => {
            warn!("no database configured; records are kept in memory and the fixture login is active");
            memory_state(options)
        }
    }
}
