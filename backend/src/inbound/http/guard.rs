//! Admin-area guard.
//!
//! Handlers under `/admin` take an [`AdminSession`] argument. Extraction
//! evaluates [`RoleAccessPolicy`] for the request path and refuses with
//! `401 unauthorized` carrying `details.redirectTo`, the login location that
//! preserves the path. Anonymous callers and signed-in users without the
//! admin role get byte-identical refusals.
//!
//! Roles come from [`LoginService::current_roles`] on every request, not from
//! the session cookie, so a revoked role locks the user out immediately.

use std::sync::Arc;

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::debug;

use crate::domain::{
    AccessDecision, Error, Resource, RoleAccessPolicy, Subject, UserId, decide,
};
use crate::domain::ports::LoginService;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Header carrying the shared legacy token.
#[cfg(feature = "legacy-admin-token")]
pub const LEGACY_TOKEN_HEADER: &str = "x-admin-token";

/// Proof that the caller may use the admin area.
#[derive(Debug, Clone)]
pub struct AdminSession {
    subject: Subject,
}

impl AdminSession {
    /// Acting user; `None` for legacy token holders.
    pub fn user_id(&self) -> Option<&UserId> {
        self.subject.user_id()
    }
}

fn requested_path(req: &HttpRequest) -> String {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned())
}

fn authorise(subject: Subject, requested_path: String) -> Result<AdminSession, Error> {
    let resource = Resource::AdminArea { requested_path };
    match decide(&RoleAccessPolicy, &subject, &resource) {
        AccessDecision::Allow => Ok(AdminSession { subject }),
        AccessDecision::RedirectToLogin { location } => {
            debug!(%location, "admin request refused");
            Err(Error::unauthorized("login required").with_details(json!({
                "redirectTo": location,
            })))
        }
    }
}

/// Swap the roles remembered in the cookie for the ones held now.
async fn refresh_roles(
    subject: Subject,
    login: Option<Arc<dyn LoginService>>,
) -> Result<Subject, Error> {
    match subject {
        Subject::Authenticated { user_id, roles } => {
            let login =
                login.ok_or_else(|| Error::internal("login service is not configured"))?;
            let current = login.current_roles(&user_id).await?;
            if current.len() < roles.len() {
                debug!(%user_id, "session roles narrowed since login");
            }
            Ok(Subject::authenticated(user_id, current))
        }
        other => Ok(other),
    }
}

#[cfg(feature = "legacy-admin-token")]
fn legacy_subject(req: &HttpRequest) -> Option<Subject> {
    use crate::domain::LegacyAdminToken;

    let presented = req.headers().get(LEGACY_TOKEN_HEADER)?.to_str().ok()?;
    let token = req.app_data::<web::Data<LegacyAdminToken>>()?;
    if token.matches(presented) {
        tracing::warn!(
            fingerprint = %token.fingerprint(),
            path = %req.path(),
            "legacy admin token used"
        );
        Some(Subject::LegacyToken)
    } else {
        tracing::warn!(path = %req.path(), "legacy admin token rejected");
        None
    }
}

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let path = requested_path(req);
        #[cfg(feature = "legacy-admin-token")]
        let legacy = legacy_subject(req);
        let login = req
            .app_data::<web::Data<HttpState>>()
            .map(|state| state.login.clone());
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            #[cfg(feature = "legacy-admin-token")]
            if let Some(subject) = legacy {
                return authorise(subject, path).map_err(Into::into);
            }
            let subject = refresh_roles(session.await?.subject()?, login).await?;
            authorise(subject, path).map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AuthenticatedUser, FIXTURE_ADMIN_ID, MockLoginService};
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{
        fixture_state, session_cookie, test_session_middleware,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use serde_json::Value;

    fn login_as(roles: Vec<Role>) -> impl Fn(SessionContext) -> std::future::Ready<Result<HttpResponse, Error>> + Clone {
        move |session: SessionContext| {
            let user = AuthenticatedUser {
                user_id: UserId::new(FIXTURE_ADMIN_ID).expect("fixture id"),
                roles: roles.clone(),
            };
            std::future::ready(
                session
                    .persist_login(&user)
                    .map(|()| HttpResponse::Ok().finish()),
            )
        }
    }

    /// State whose login port reports `roles` as the caller's current roles.
    fn state_granting(roles: Vec<Role>) -> web::Data<HttpState> {
        let mut login = MockLoginService::new();
        login
            .expect_current_roles()
            .returning(move |_| Ok(roles.clone()));
        web::Data::new(HttpState {
            login: Arc::new(login),
            ..fixture_state()
        })
    }

    async fn refusal_body(roles: Option<Vec<Role>>) -> Value {
        let granted = roles.clone().unwrap_or_default();
        let login = login_as(granted.clone());
        let app = test::init_service(
            App::new()
                .app_data(state_granting(granted))
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login))
                .route(
                    "/admin/applications",
                    web::get().to(|_admin: AdminSession| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/admin/applications?status=new");
        if roles.is_some() {
            let res =
                test::call_service(&app, test::TestRequest::post().uri("/login").to_request())
                    .await;
            req = req.cookie(session_cookie(&res));
        }
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        test::read_body_json(res).await
    }

    #[rstest]
    #[case::anonymous(None)]
    #[case::volunteer(Some(vec![Role::Volunteer]))]
    #[case::no_roles(Some(Vec::new()))]
    #[actix_web::test]
    async fn refusal_redirects_to_login_with_preserved_path(#[case] roles: Option<Vec<Role>>) {
        let body = refusal_body(roles).await;
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(
            body["details"]["redirectTo"],
            "/login?returnTo=%2Fadmin%2Fapplications%3Fstatus%3Dnew"
        );
    }

    #[actix_web::test]
    async fn admin_role_passes() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fixture_state()))
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login_as(vec![Role::Admin])))
                .route(
                    "/admin",
                    web::get().to(|admin: AdminSession| async move {
                        HttpResponse::Ok().body(
                            admin
                                .user_id()
                                .map(ToString::to_string)
                                .unwrap_or_default(),
                        )
                    }),
                ),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, FIXTURE_ADMIN_ID);
    }

    #[actix_web::test]
    async fn revoked_admin_is_refused_despite_the_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(state_granting(Vec::new()))
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login_as(vec![Role::Admin])))
                .route(
                    "/admin",
                    web::get().to(|_admin: AdminSession| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["redirectTo"], "/login?returnTo=%2Fadmin");
    }

    #[actix_web::test]
    async fn missing_login_port_fails_closed() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route("/login", web::post().to(login_as(vec![Role::Admin])))
                .route(
                    "/admin",
                    web::get().to(|_admin: AdminSession| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::post().uri("/login").to_request()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .cookie(session_cookie(&login))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[cfg(feature = "legacy-admin-token")]
    #[actix_web::test]
    async fn legacy_token_header_opens_admin_area() {
        use crate::domain::LegacyAdminToken;

        let token = LegacyAdminToken::new("s3cret").expect("token");
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .app_data(web::Data::new(token))
                .route(
                    "/admin",
                    web::get().to(|_admin: AdminSession| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;

        let ok = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .insert_header((LEGACY_TOKEN_HEADER, "s3cret"))
                .to_request(),
        )
        .await;
        assert_eq!(ok.status(), StatusCode::OK);

        let wrong = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/admin")
                .insert_header((LEGACY_TOKEN_HEADER, "guess"))
                .to_request(),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }
}
