//! PostgreSQL-backed `CampaignRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CampaignRepository, CampaignRepositoryError};
use crate::domain::{CampaignId, CampaignRecord, MinorUnits, Slug};

use super::diesel_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{CampaignRow, CampaignUpdate, NewCampaignRow, RowDecodeError};
use super::pool::{DbPool, PoolError};
use super::schema::campaigns;

/// Diesel implementation of [`CampaignRepository`].
#[derive(Clone)]
pub struct DieselCampaignRepository {
    pool: DbPool,
}

impl DieselCampaignRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CampaignRepositoryError {
    map_basic_pool_error(error, CampaignRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CampaignRepositoryError {
    map_basic_diesel_error(
        error,
        CampaignRepositoryError::query,
        CampaignRepositoryError::connection,
    )
}

/// Writes that touch `slug` turn a unique violation into `DuplicateSlug`.
fn map_write_error(error: diesel::result::Error, slug: &Slug) -> CampaignRepositoryError {
    if is_unique_violation(&error) {
        return CampaignRepositoryError::duplicate_slug(slug.as_str());
    }
    map_diesel_error(error)
}

fn decode(row: CampaignRow) -> Result<CampaignRecord, CampaignRepositoryError> {
    CampaignRecord::try_from(row)
        .map_err(|err: RowDecodeError| CampaignRepositoryError::query(err.to_string()))
}

#[async_trait]
impl CampaignRepository for DieselCampaignRepository {
    async fn insert(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(campaigns::table)
            .values(NewCampaignRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, &record.slug))
    }

    async fn update(&self, record: &CampaignRecord) -> Result<(), CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(campaigns::table.filter(campaigns::id.eq(record.id.as_uuid())))
            .set(CampaignUpdate::from(record))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, &record.slug))?;
        if affected == 0 {
            return Err(CampaignRepositoryError::not_found(record.id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &CampaignId,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CampaignRow> = campaigns::table
            .filter(campaigns::id.eq(id.as_uuid()))
            .select(CampaignRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn find_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<CampaignRecord>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CampaignRow> = campaigns::table
            .filter(campaigns::slug.eq(slug.as_str()))
            .select(CampaignRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(decode).transpose()
    }

    async fn list_all(&self) -> Result<Vec<CampaignRecord>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CampaignRow> = campaigns::table
            .order((campaigns::created_at.desc(), campaigns::id.asc()))
            .select(CampaignRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(decode).collect()
    }

    async fn add_contribution(
        &self,
        id: &CampaignId,
        amount: MinorUnits,
        at: DateTime<Utc>,
    ) -> Result<(), CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // A single UPDATE so concurrent settlements never lose an increment.
        let affected = diesel::update(campaigns::table.filter(campaigns::id.eq(id.as_uuid())))
            .set((
                campaigns::current_amount.eq(campaigns::current_amount + amount.get()),
                campaigns::updated_at.eq(at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(CampaignRepositoryError::not_found(id.to_string()));
        }
        Ok(())
    }
}
