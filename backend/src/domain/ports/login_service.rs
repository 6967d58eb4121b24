//! Driving port for back-office login.
//!
//! Inbound adapters call this port to exchange credentials for a user id and
//! the roles the access guard checks. Handler tests substitute a double
//! instead of wiring account storage.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Role, UserId};

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub roles: Vec<Role>,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated identity.
    async fn authenticate(&self, credentials: &LoginCredentials)
    -> Result<AuthenticatedUser, Error>;

    /// Roles `user_id` holds now. The admin guard checks these rather than
    /// the copy taken at login, so revocations apply to live sessions.
    async fn current_roles(&self, user_id: &UserId) -> Result<Vec<Role>, Error>;
}

/// Development authenticator used when no account store is configured.
///
/// `admin@vetpal.org` / `password` signs in as an administrator.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

/// User id issued by [`FixtureLoginService`].
pub const FIXTURE_ADMIN_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthenticatedUser, Error> {
        if credentials.email() == "admin@vetpal.org" && credentials.password() == "password" {
            let user_id = UserId::new(FIXTURE_ADMIN_ID)
                .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
            Ok(AuthenticatedUser {
                user_id,
                roles: vec![Role::Admin],
            })
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }

    async fn current_roles(&self, user_id: &UserId) -> Result<Vec<Role>, Error> {
        if user_id.as_ref() == FIXTURE_ADMIN_ID {
            Ok(vec![Role::Admin])
        } else {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("admin@vetpal.org", "password", true)]
    #[case("ADMIN@vetpal.org", "password", true)]
    #[case("admin@vetpal.org", "wrong", false)]
    #[case("other@vetpal.org", "password", false)]
    #[tokio::test]
    async fn fixture_login_service_accepts_only_the_dev_admin(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = FixtureLoginService.authenticate(&creds).await;
        match (should_succeed, result) {
            (true, Ok(user)) => {
                assert_eq!(user.user_id.as_ref(), FIXTURE_ADMIN_ID);
                assert_eq!(user.roles, vec![Role::Admin]);
            }
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(user)) => panic!("expected failure, got success: {user:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_roles_belong_to_the_dev_admin_only() {
        let admin = UserId::new(FIXTURE_ADMIN_ID).expect("fixture id");
        assert_eq!(
            FixtureLoginService.current_roles(&admin).await.expect("roles"),
            vec![Role::Admin]
        );
        let stranger = UserId::random();
        assert!(
            FixtureLoginService
                .current_roles(&stranger)
                .await
                .expect("roles")
                .is_empty()
        );
    }
}
