//! Application intake and workflow services.
//!
//! [`ApplicationService`] implements both application driving ports: the
//! public submission pipeline and the administrative status workflow, plus the
//! filtered list view over the cached collection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::collections::{invalidate, read_through};
use crate::domain::ports::{
    ApplicationCommand, ApplicationQuery, ApplicationRepository, ApplicationRepositoryError,
    CollectionCache, CollectionKey, SubmissionReceipt,
};
use crate::domain::{
    ApplicationFilter, ApplicationId, ApplicationRecord, ApplicationSubmission, Error, Listing,
    StatusTransition, TransitionPolicy,
};

fn map_repository_error(error: ApplicationRepositoryError) -> Error {
    match error {
        ApplicationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("application repository unavailable: {message}"))
        }
        ApplicationRepositoryError::Query { message } => {
            Error::internal(format!("application repository error: {message}"))
        }
        ApplicationRepositoryError::NotFound { id } => {
            Error::not_found(format!("application {id} not found"))
        }
        ApplicationRepositoryError::Stale { id } => {
            Error::conflict(format!("application {id} was modified concurrently"))
                .with_details(json!({ "reason": "stale" }))
        }
    }
}

/// Timestamps are stored with microsecond precision; trimming here keeps the
/// value handed back to clients equal to the one they will read later.
pub(crate) fn stored_now(clock: &dyn Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}

/// Service implementing [`ApplicationCommand`] and [`ApplicationQuery`].
#[derive(Clone)]
pub struct ApplicationService<R> {
    repo: Arc<R>,
    cache: Arc<dyn CollectionCache<ApplicationRecord>>,
    clock: Arc<dyn Clock>,
    policy: TransitionPolicy,
}

impl<R> ApplicationService<R> {
    /// Create a service with the permissive transition policy.
    pub fn new(
        repo: Arc<R>,
        cache: Arc<dyn CollectionCache<ApplicationRecord>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repo,
            cache,
            clock,
            policy: TransitionPolicy::default(),
        }
    }

    /// Replace the transition policy.
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository,
{
    /// Compare-and-set guard for the workflow write.
    ///
    /// The client's `expectedUpdatedAt` wins when given. Under
    /// [`TransitionPolicy::LockTerminal`] the write is otherwise pinned to the
    /// record the policy was checked against, so a concurrent move into a
    /// terminal status turns this write into a conflict.
    fn write_guard(
        &self,
        current: &ApplicationRecord,
        transition: &StatusTransition,
    ) -> Option<DateTime<Utc>> {
        match (transition.expected_updated_at, self.policy) {
            (Some(expected), _) => Some(expected),
            (None, TransitionPolicy::LockTerminal) => Some(current.updated_at()),
            (None, TransitionPolicy::Permissive) => None,
        }
    }

    async fn find(&self, id: &ApplicationId) -> Result<ApplicationRecord, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("application {id} not found")))
    }
}

#[async_trait]
impl<R> ApplicationCommand for ApplicationService<R>
where
    R: ApplicationRepository,
{
    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<SubmissionReceipt, Error> {
        let details = submission.validate()?;
        let record =
            ApplicationRecord::submit(ApplicationId::random(), details, stored_now(&*self.clock));

        self.repo
            .insert(&record)
            .await
            .map_err(map_repository_error)?;
        invalidate(&*self.cache, CollectionKey::Applications).await;

        info!(
            application_id = %record.id(),
            role = record.details().role.as_str(),
            "application submitted"
        );
        Ok(SubmissionReceipt::for_new(record.id()))
    }

    async fn transition(
        &self,
        id: &ApplicationId,
        transition: StatusTransition,
    ) -> Result<ApplicationRecord, Error> {
        let current = self.find(id).await?;
        let next = current.transition(&transition, self.policy, stored_now(&*self.clock))?;

        self.repo
            .update_workflow(&next, self.write_guard(&current, &transition))
            .await
            .map_err(map_repository_error)?;
        invalidate(&*self.cache, CollectionKey::Applications).await;

        info!(
            application_id = %id,
            from = current.status().as_str(),
            to = next.status().as_str(),
            "application status changed"
        );
        Ok(next)
    }
}

#[async_trait]
impl<R> ApplicationQuery for ApplicationService<R>
where
    R: ApplicationRepository,
{
    async fn list(&self, filter: &ApplicationFilter) -> Result<Listing<ApplicationRecord>, Error> {
        let all = read_through(&*self.cache, CollectionKey::Applications, || async {
            self.repo.list_all().await.map_err(map_repository_error)
        })
        .await?;

        let items: Vec<_> = all
            .iter()
            .filter(|record| filter.matches(*record))
            .cloned()
            .collect();
        Ok(Listing::from(items))
    }

    async fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, Error> {
        self.find(id).await
    }
}

#[cfg(test)]
#[path = "application_service_tests.rs"]
mod tests;
