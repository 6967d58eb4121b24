//! Server construction and middleware wiring.

mod config;
pub mod session_key;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use session_key::{BuildMode, SessionConfigError, SessionSettings, key_fingerprint};
pub use settings::{ServerSettings, SettingsError};
#[cfg(any(test, feature = "test-support"))]
pub use state_builders::memory_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
#[cfg(feature = "legacy-admin-token")]
use crate::domain::LegacyAdminToken;
use crate::domain::{CheckoutLinks, Error, TransitionPolicy};
use crate::inbound::http::applications::{
    change_application_status, export_applications, get_application, list_applications,
    submit_application,
};
use crate::inbound::http::campaigns::{
    create_campaign, get_campaign, list_all_campaigns, list_campaigns, update_campaign,
};
use crate::inbound::http::content::{
    create_event, create_news_post, get_event, get_news_post, list_events, list_news,
    update_event, update_news_post,
};
use crate::inbound::http::donations::{
    change_donation_status, export_donations, export_donors, list_donations, list_donors,
    start_checkout,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{current_session, login, logout};
use crate::inbound::http::validation::{json_config, path_config, query_config};
use crate::outbound::persistence::{
    DbPool, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};

use state_builders::build_http_state;

/// Session cookie name shared by every `/api/v1` route.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Failure preparing the server before it binds.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Session(#[from] SessionConfigError),
    #[error("database pool: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Everything one app instance needs.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    #[cfg(feature = "legacy-admin-token")]
    pub legacy_token: Option<web::Data<LegacyAdminToken>>,
}

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal segments are registered before `{id}` captures on the same
/// prefix so `export` is never parsed as an id.
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(current_session)
        .service(submit_application)
        .service(list_applications)
        .service(export_applications)
        .service(get_application)
        .service(change_application_status)
        .service(list_campaigns)
        .service(get_campaign)
        .service(list_all_campaigns)
        .service(create_campaign)
        .service(update_campaign)
        .service(start_checkout)
        .service(list_donations)
        .service(export_donations)
        .service(change_donation_status)
        .service(list_donors)
        .service(export_donors)
        .service(list_events)
        .service(get_event)
        .service(list_news)
        .service(get_news_post)
        .service(create_event)
        .service(update_event)
        .service(create_news_post)
        .service(update_news_post);
}

async fn unknown_route() -> Result<HttpResponse, Error> {
    Err(Error::not_found("no such route"))
}

/// Build the actix application for one worker.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        #[cfg(feature = "legacy-admin-token")]
        legacy_token,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE_NAME.into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(api_services);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());

    #[cfg(feature = "legacy-admin-token")]
    let app = match legacy_token {
        Some(token) => app.app_data(token),
        None => app,
    };

    let app = app
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(unknown_route))
}

/// Turn loaded settings into a server configuration, connecting to the
/// database and applying migrations when a URL is configured.
///
/// # Errors
///
/// [`StartupError`] when a setting is invalid, the session key cannot be
/// loaded, the pool cannot be built or migrations fail.
pub async fn prepare_config(
    settings: &ServerSettings,
    mode: BuildMode,
) -> Result<ServerConfig, StartupError> {
    let session = session_key::session_settings(settings, mode)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );
    let links = CheckoutLinks {
        one_time: settings.checkout_one_time_url()?,
        monthly: settings.checkout_monthly_url()?,
    };
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
    )
    .with_checkout_links(links)
    .with_transition_policy(TransitionPolicy::from_lock_flag(
        settings.lock_terminal_statuses,
    ));

    #[cfg(feature = "legacy-admin-token")]
    let config = config.with_legacy_token(
        settings
            .legacy_admin_token
            .as_deref()
            .and_then(LegacyAdminToken::new),
    );

    let Some(url) = settings.database_url() else {
        return Ok(config);
    };
    run_pending_migrations(url).await?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size())).await?;
    Ok(config.with_db_pool(pool))
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config));
    #[cfg(feature = "legacy-admin-token")]
    let legacy_token = config.legacy_token.clone().map(web::Data::new);
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        key: config.key.clone(),
        cookie_secure: config.cookie_secure,
        same_site: config.same_site,
        #[cfg(feature = "legacy-admin-token")]
        legacy_token,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr)?
        .run();

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use crate::inbound::http::test_utils::fixture_state;

    fn deps() -> AppDependencies {
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(fixture_state()),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            #[cfg(feature = "legacy-admin-token")]
            legacy_token: None,
        }
    }

    #[actix_web::test]
    async fn unknown_routes_use_the_error_shape() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/nowhere").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("trace-id"));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn export_is_not_mistaken_for_an_id() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/applications/export")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn session_cookie_is_http_only() {
        let app = test::init_service(build_app(deps())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(serde_json::json!({
                    "email": "admin@vetpal.org",
                    "password": "password",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
            .expect("session cookie");
        assert_eq!(cookie.http_only(), Some(true));
    }
}
