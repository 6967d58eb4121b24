//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};

#[cfg(feature = "legacy-admin-token")]
use crate::domain::LegacyAdminToken;
use crate::domain::{CheckoutLinks, TransitionPolicy};
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) checkout_links: CheckoutLinks,
    pub(crate) transition_policy: TransitionPolicy,
    #[cfg(feature = "legacy-admin-token")]
    pub(crate) legacy_token: Option<LegacyAdminToken>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            checkout_links: CheckoutLinks::default(),
            transition_policy: TransitionPolicy::default(),
            #[cfg(feature = "legacy-admin-token")]
            legacy_token: None,
        }
    }

    /// Use PostgreSQL repositories instead of the in-memory ones.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_checkout_links(mut self, links: CheckoutLinks) -> Self {
        self.checkout_links = links;
        self
    }

    #[must_use]
    pub fn with_transition_policy(mut self, policy: TransitionPolicy) -> Self {
        self.transition_policy = policy;
        self
    }

    /// Accept the shared admin token header.
    #[cfg(feature = "legacy-admin-token")]
    #[must_use]
    pub fn with_legacy_token(mut self, token: Option<LegacyAdminToken>) -> Self {
        self.legacy_token = token;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
