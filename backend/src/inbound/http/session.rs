//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie session is the only per-user state the back office keeps. It
//! is written by login and cleared by logout; every other handler reads it
//! through [`SessionContext::subject`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::AuthenticatedUser;
use crate::domain::{Error, Role, Subject, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ROLES_KEY: &str = "roles";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated user and their roles.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// replayed after authentication.
    pub fn persist_login(&self, user: &AuthenticatedUser) -> Result<(), Error> {
        self.0.renew();
        let roles: Vec<&str> = user.roles.iter().map(|role| role.as_str()).collect();
        self.0
            .insert(USER_ID_KEY, user.user_id.as_ref())
            .and_then(|()| self.0.insert(ROLES_KEY, roles))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop everything and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }

    /// Current subject. Unreadable or tampered values degrade to anonymous.
    pub fn subject(&self) -> Result<Subject, Error> {
        let raw_id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw_id) = raw_id else {
            return Ok(Subject::Anonymous);
        };
        let user_id = match UserId::new(&raw_id) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(Subject::Anonymous);
            }
        };
        let raw_roles = self
            .0
            .get::<Vec<String>>(ROLES_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?
            .unwrap_or_default();
        let roles = raw_roles
            .iter()
            .filter_map(|raw| match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(error) => {
                    warn!(%error, "ignoring unknown role in session cookie");
                    None
                }
            })
            .collect::<Vec<_>>();
        Ok(Subject::authenticated(user_id, roles))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
