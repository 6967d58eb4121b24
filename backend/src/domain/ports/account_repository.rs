//! Ports for back-office accounts and role assignments.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by account and role adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "account repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "account repository query failed: {message}",
    }
}

/// Stored credentials for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub user_id: UserId,
    pub email: EmailAddress,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Port for looking up accounts during login.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, AccountRepositoryError>;
}

/// Port for reading a user's role assignments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn roles_for(&self, user_id: &UserId) -> Result<Vec<Role>, AccountRepositoryError>;
}

/// Fixture that knows no accounts and grants no roles.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountRepository;

#[async_trait]
impl AccountRepository for FixtureAccountRepository {
    async fn find_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<AccountRecord>, AccountRepositoryError> {
        Ok(None)
    }
}

#[async_trait]
impl RoleRepository for FixtureAccountRepository {
    async fn roles_for(&self, _user_id: &UserId) -> Result<Vec<Role>, AccountRepositoryError> {
        Ok(Vec::new())
    }
}
