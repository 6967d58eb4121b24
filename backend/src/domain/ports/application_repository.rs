//! Port for application record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ApplicationId, ApplicationRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "application repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "application repository query failed: {message}",
        /// No application has the given id.
        NotFound { id: String } => "application {id} not found",
        /// The stored record changed since the caller last read it.
        Stale { id: String } => "application {id} was modified concurrently",
    }
}

/// Port for reading and writing applications. Applications are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a freshly submitted application.
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), ApplicationRepositoryError>;

    /// Find an application by id.
    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, ApplicationRepositoryError>;

    /// Every application, newest first.
    async fn list_all(&self) -> Result<Vec<ApplicationRecord>, ApplicationRepositoryError>;

    /// Overwrite the workflow fields of `record`.
    ///
    /// When `expected_updated_at` is set, the write only applies if the stored
    /// `updated_at` still equals it; otherwise [`ApplicationRepositoryError::Stale`].
    async fn update_workflow(
        &self,
        record: &ApplicationRecord,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApplicationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureApplicationRepository;

#[async_trait]
impl ApplicationRepository for FixtureApplicationRepository {
    async fn insert(&self, _record: &ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, ApplicationRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>, ApplicationRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_workflow(
        &self,
        record: &ApplicationRecord,
        _expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApplicationRepositoryError> {
        Err(ApplicationRepositoryError::not_found(record.id().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_lists_nothing() {
        let repo = FixtureApplicationRepository;
        assert!(repo.list_all().await.expect("fixture list").is_empty());
        assert!(
            repo.find_by_id(&ApplicationId::random())
                .await
                .expect("fixture lookup")
                .is_none()
        );
    }

    #[rstest]
    fn stale_error_names_the_record() {
        let err = ApplicationRepositoryError::stale("abc");
        assert_eq!(err.to_string(), "application abc was modified concurrently");
    }
}
