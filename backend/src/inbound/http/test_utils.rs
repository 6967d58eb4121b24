//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use crate::domain::ports::{
    AuthenticatedUser, FIXTURE_ADMIN_ID, FixtureApplicationCommand, FixtureApplicationQuery,
    FixtureCampaignService, FixtureContentService, FixtureDonationService, FixtureLoginService,
};
use crate::domain::{Error, Role, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, path_config, query_config};
use crate::test_support::MutableClock;

pub const SESSION_COOKIE: &str = "session";
/// Route that signs the caller in as the fixture admin.
pub const TEST_LOGIN_PATH: &str = "/test/login";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// State wired entirely to fixture ports.
pub fn fixture_state() -> HttpState {
    HttpState {
        applications: Arc::new(FixtureApplicationCommand),
        applications_query: Arc::new(FixtureApplicationQuery),
        campaigns: Arc::new(FixtureCampaignService),
        campaigns_query: Arc::new(FixtureCampaignService),
        donations: Arc::new(FixtureDonationService),
        donations_query: Arc::new(FixtureDonationService),
        content: Arc::new(FixtureContentService),
        content_query: Arc::new(FixtureContentService),
        login: Arc::new(FixtureLoginService),
        clock: Arc::new(MutableClock::at_fixture_time()),
    }
}

async fn sign_in_admin(session: SessionContext) -> Result<HttpResponse, Error> {
    let user = AuthenticatedUser {
        user_id: UserId::new(FIXTURE_ADMIN_ID)
            .map_err(|err| Error::internal(err.to_string()))?,
        roles: vec![Role::Admin],
    };
    session.persist_login(&user)?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with sessions, extractor error handlers, `state` and the test login
/// route. Callers add the services under test.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .route(TEST_LOGIN_PATH, web::post().to(sign_in_admin))
}

/// Sign in through [`TEST_LOGIN_PATH`] and return the admin session cookie.
pub async fn admin_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let res =
        test::call_service(app, test::TestRequest::post().uri(TEST_LOGIN_PATH).to_request()).await;
    session_cookie(&res)
}
