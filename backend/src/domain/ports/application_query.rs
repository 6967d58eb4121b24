//! Driving port for the administrative application list.

use async_trait::async_trait;

use crate::domain::{ApplicationFilter, ApplicationId, ApplicationRecord, Error, Listing};

/// Domain use-case port for reading applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationQuery: Send + Sync {
    /// Applications matching `filter`, newest first.
    async fn list(&self, filter: &ApplicationFilter) -> Result<Listing<ApplicationRecord>, Error>;

    /// One application by id.
    async fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, Error>;
}

/// Fixture query over an empty store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureApplicationQuery;

#[async_trait]
impl ApplicationQuery for FixtureApplicationQuery {
    async fn list(&self, _filter: &ApplicationFilter) -> Result<Listing<ApplicationRecord>, Error> {
        Ok(Listing::from(Vec::new()))
    }

    async fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, Error> {
        Err(Error::not_found(format!("application {id} not found")))
    }
}
