//! PostgreSQL-backed `DonationRepository` and `DonorRepository`.
//!
//! Donors are keyed by their lowercased email. The status write is a
//! compare-and-set on the previous status so only one webhook delivery can
//! settle a donation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DonationRepository, DonationRepositoryError, DonorRepository};
use crate::domain::{DonationId, DonationRecord, DonationStatus, DonorRecord, EmailAddress};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DonationRow, DonorRow, NewDonationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{donations, donors};

/// Diesel implementation of both donation-side ports.
#[derive(Clone)]
pub struct DieselDonationRepository {
    pool: DbPool,
}

impl DieselDonationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DonationRepositoryError {
    map_basic_pool_error(error, DonationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DonationRepositoryError {
    map_basic_diesel_error(
        error,
        DonationRepositoryError::query,
        DonationRepositoryError::connection,
    )
}

fn decode(row: DonationRow) -> Result<DonationRecord, DonationRepositoryError> {
    DonationRecord::try_from(row).map_err(|err| DonationRepositoryError::query(err.to_string()))
}

#[async_trait]
impl DonationRepository for DieselDonationRepository {
    async fn insert(&self, record: &DonationRecord) -> Result<(), DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(donations::table)
            .values(NewDonationRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &DonationId,
    ) -> Result<Option<DonationRecord>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DonationRow> = donations::table
            .filter(donations::id.eq(id.as_uuid()))
            .select(DonationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn list_all(&self) -> Result<Vec<DonationRecord>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DonationRow> = donations::table
            .order((donations::created_at.desc(), donations::id.asc()))
            .select(DonationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn compare_and_set_status(
        &self,
        record: &DonationRecord,
        from: DonationStatus,
    ) -> Result<bool, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(
            donations::table
                .filter(donations::id.eq(record.id.as_uuid()))
                .filter(donations::status.eq(from.as_str())),
        )
        .set((
            donations::status.eq(record.status.as_str()),
            donations::updated_at.eq(record.updated_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected == 1)
    }
}

#[async_trait]
impl DonorRepository for DieselDonationRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<DonorRecord>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DonorRow> = donors::table
            .filter(donors::email.eq(email.as_str()))
            .select(DonorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(DonorRecord::from))
    }

    async fn upsert_by_email(
        &self,
        donor: &DonorRecord,
    ) -> Result<DonorRecord, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(donors::table)
            .values(DonorRow::from(donor))
            .on_conflict(donors::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        // Re-read so a returning donor keeps their original id and name.
        let row: DonorRow = donors::table
            .filter(donors::email.eq(donor.email.as_str()))
            .select(DonorRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<DonorRecord>, DonationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DonorRow> = donors::table
            .order((donors::created_at.desc(), donors::id.asc()))
            .select(DonorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(DonorRecord::from).collect())
    }
}
