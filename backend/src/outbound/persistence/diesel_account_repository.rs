//! PostgreSQL-backed account and role lookups for login.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    AccountRecord, AccountRepository, AccountRepositoryError, RoleRepository,
};
use crate::domain::{EmailAddress, Role, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AccountRow;
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, role_assignments};

/// Diesel implementation of [`AccountRepository`] and [`RoleRepository`].
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountRepositoryError {
    map_basic_pool_error(error, AccountRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountRepositoryError {
    map_basic_diesel_error(
        error,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AccountRow> = accounts::table
            .filter(accounts::email.eq(email.to_lowercase()))
            .select(AccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| AccountRecord {
            user_id: UserId::from_uuid(row.user_id),
            email: EmailAddress::from_trusted(row.email),
            password_hash: row.password_hash,
        }))
    }
}

#[async_trait]
impl RoleRepository for DieselAccountRepository {
    async fn roles_for(&self, user_id: &UserId) -> Result<Vec<Role>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let names: Vec<String> = role_assignments::table
            .filter(role_assignments::user_id.eq(user_id.as_uuid()))
            .select(role_assignments::role)
            .order(role_assignments::role.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        // The table CHECK keeps this exhaustive; skip anything newer than us.
        Ok(names
            .iter()
            .filter_map(|name| match name.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    warn!(user_id = %user_id, role = %name, "ignoring unknown role assignment");
                    None
                }
            })
            .collect())
    }
}
