//! PostgreSQL-backed `ApplicationRepository`.
//!
//! Workflow writes are optimistic: when the caller supplies the `updated_at`
//! it last saw, the `UPDATE` is filtered on it and zero affected rows means
//! another operator got there first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{ApplicationId, ApplicationRecord};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ApplicationRow, ApplicationWorkflowUpdate, NewApplicationRow, RowDecodeError};
use super::pool::{DbPool, PoolError};
use super::schema::applications;

/// Diesel implementation of [`ApplicationRepository`].
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_basic_pool_error(error, ApplicationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    map_basic_diesel_error(
        error,
        ApplicationRepositoryError::query,
        ApplicationRepositoryError::connection,
    )
}

fn map_decode_error(error: RowDecodeError) -> ApplicationRepositoryError {
    ApplicationRepositoryError::query(error.to_string())
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(applications::table)
            .values(NewApplicationRow::from(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ApplicationRow> = applications::table
            .filter(applications::id.eq(id.as_uuid()))
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ApplicationRecord::try_from)
            .transpose()
            .map_err(map_decode_error)
    }

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ApplicationRow> = applications::table
            .order((applications::created_at.desc(), applications::id.asc()))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(ApplicationRecord::try_from)
            .collect::<Result<_, _>>()
            .map_err(map_decode_error)
    }

    async fn update_workflow(
        &self,
        record: &ApplicationRecord,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id: Uuid = *record.id().as_uuid();
        let changes = ApplicationWorkflowUpdate::from(record);

        let affected = match expected_updated_at {
            Some(expected) => {
                diesel::update(
                    applications::table
                        .filter(applications::id.eq(id))
                        .filter(applications::updated_at.eq(expected)),
                )
                .set(&changes)
                .execute(&mut conn)
                .await
            }
            None => {
                diesel::update(applications::table.filter(applications::id.eq(id)))
                    .set(&changes)
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        if affected > 0 {
            return Ok(());
        }

        let exists: bool = diesel::select(diesel::dsl::exists(
            applications::table.filter(applications::id.eq(id)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Err(if exists {
            ApplicationRepositoryError::stale(id.to_string())
        } else {
            ApplicationRepositoryError::not_found(id.to_string())
        })
    }
}
