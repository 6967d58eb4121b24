//! Password login against stored back-office accounts.
//!
//! Unknown emails and wrong passwords produce the same `unauthorized` error so
//! the endpoint does not reveal which accounts exist.

use std::sync::Arc;

use argon2::password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier};
use argon2::Argon2;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, AuthenticatedUser, LoginService, RoleRepository,
};
use crate::domain::{Error, LoginCredentials, Role, UserId};

fn map_account_error(error: AccountRepositoryError) -> Error {
    match error {
        AccountRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("account repository unavailable: {message}"))
        }
        AccountRepositoryError::Query { message } => {
            Error::internal(format!("account repository error: {message}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// [`LoginService`] backed by argon2 password hashes.
#[derive(Clone)]
pub struct AccountLoginService<A, R> {
    accounts: Arc<A>,
    roles: Arc<R>,
}

impl<A, R> AccountLoginService<A, R> {
    pub fn new(accounts: Arc<A>, roles: Arc<R>) -> Self {
        Self { accounts, roles }
    }
}

fn verify_password(candidate: &str, stored_hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| Error::internal(format!("stored password hash is malformed: {err}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(err) => Err(Error::internal(format!("password verification failed: {err}"))),
    }
}

#[async_trait]
impl<A, R> LoginService for AccountLoginService<A, R>
where
    A: AccountRepository,
    R: RoleRepository,
{
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        let Some(account) = self
            .accounts
            .find_by_email(credentials.email())
            .await
            .map_err(map_account_error)?
        else {
            info!("login refused: unknown account");
            return Err(invalid_credentials());
        };

        if !verify_password(credentials.password(), &account.password_hash)? {
            warn!(user_id = %account.user_id, "login refused: wrong password");
            return Err(invalid_credentials());
        }

        let roles = self
            .roles
            .roles_for(&account.user_id)
            .await
            .map_err(map_account_error)?;
        info!(user_id = %account.user_id, role_count = roles.len(), "login succeeded");
        Ok(AuthenticatedUser {
            user_id: account.user_id,
            roles,
        })
    }
    async fn current_roles(&self, user_id: &UserId) -> Result<Vec<Role>, Error> {
        self.roles.roles_for(user_id).await.map_err(map_account_error)
    }
}
