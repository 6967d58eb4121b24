//! Ports for donation and donor persistence.

use async_trait::async_trait;

use crate::domain::{
    DonationId, DonationRecord, DonationStatus, DonorRecord, EmailAddress,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by donation and donor repository adapters.
    pub enum DonationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "donation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "donation repository query failed: {message}",
        /// No donation has the given id.
        NotFound { id: String } => "donation {id} not found",
    }
}

/// Port for reading and writing donations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn insert(&self, record: &DonationRecord) -> Result<(), DonationRepositoryError>;

    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<DonationRecord>, DonationRepositoryError>;

    /// Every donation, newest first.
    async fn list_all(&self) -> Result<Vec<DonationRecord>, DonationRepositoryError>;

    /// Write `record`'s status only if the stored status is still `from`.
    ///
    /// Returns `false` when another writer got there first, which keeps
    /// campaign crediting exactly-once.
    async fn compare_and_set_status(
        &self,
        record: &DonationRecord,
        from: DonationStatus,
    ) -> Result<bool, DonationRepositoryError>;
}

/// Port for reading and writing donors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DonorRepository: Send + Sync {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<DonorRecord>, DonationRepositoryError>;

    /// Insert `donor` unless the email is already known; returns the stored donor.
    async fn upsert_by_email(
        &self,
        donor: &DonorRecord,
    ) -> Result<DonorRecord, DonationRepositoryError>;

    /// Every donor, newest first.
    async fn list_all(&self) -> Result<Vec<DonorRecord>, DonationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDonationRepository;

#[async_trait]
impl DonationRepository for FixtureDonationRepository {
    async fn insert(&self, _record: &DonationRecord) -> Result<(), DonationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: &DonationId,
    ) -> Result<Option<DonationRecord>, DonationRepositoryError> {
        Ok(None)
    }

    async fn list_all(&self) -> Result<Vec<DonationRecord>, DonationRepositoryError> {
        Ok(Vec::new())
    }

    async fn compare_and_set_status(
        &self,
        _record: &DonationRecord,
        _from: DonationStatus,
    ) -> Result<bool, DonationRepositoryError> {
        Ok(false)
    }
}

#[async_trait]
impl DonorRepository for FixtureDonationRepository {
    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<DonorRecord>, DonationRepositoryError> {
        Ok(None)
    }

    async fn upsert_by_email(
        &self,
        donor: &DonorRecord,
    ) -> Result<DonorRecord, DonationRepositoryError> {
        Ok(donor.clone())
    }

    async fn list_all(&self) -> Result<Vec<DonorRecord>, DonationRepositoryError> {
        Ok(Vec::new())
    }
}
