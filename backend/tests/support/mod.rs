//! Shared harness for the VETPAL behaviour suites.
//!
//! Each request builds a fresh app over the same [`AppDependencies`], so the
//! in-memory stores and the session key persist across steps while every
//! step stays synchronous.

use std::cell::RefCell;
use std::future::Future;
use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::test;
use actix_web::web;
use serde_json::{Value, json};
use vetpal::inbound::http::health::HealthState;
use vetpal::server::{AppDependencies, SESSION_COOKIE_NAME, build_app, memory_http_state};
use vetpal::test_support::MutableClock;

pub const ADMIN_EMAIL: &str = "admin@vetpal.org";
pub const ADMIN_PASSWORD: &str = "password";

/// Outcome of one request.
#[derive(Debug)]
pub struct Snapshot {
    pub status: u16,
    pub body: Option<Value>,
    pub cookie: Option<Cookie<'static>>,
}

impl Snapshot {
    pub fn json(&self) -> &Value {
        self.body.as_ref().expect("json body")
    }
}

pub struct VetpalWorld {
    pub deps: AppDependencies,
    pub clock: Arc<MutableClock>,
    pub session: RefCell<Option<Cookie<'static>>>,
    pub last: RefCell<Option<Snapshot>>,
}

impl VetpalWorld {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::at_fixture_time());
        let deps = AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(memory_http_state(clock.clone())),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            #[cfg(feature = "legacy-admin-token")]
            legacy_token: None,
        };
        Self {
            deps,
            clock,
            session: RefCell::new(None),
            last: RefCell::new(None),
        }
    }

    /// Send `request`, attaching the stored session cookie when `with_session`.
    pub fn send(&self, request: test::TestRequest, with_session: bool) -> Snapshot {
        let request = match self.session.borrow().clone() {
            Some(cookie) if with_session => request.cookie(cookie),
            _ => request,
        };
        let deps = self.deps.clone();
        run_async(async move {
            let app = test::init_service(build_app(deps)).await;
            let res = test::call_service(&app, request.to_request()).await;
            let status = res.status().as_u16();
            let cookie = res
                .response()
                .cookies()
                .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
                .map(Cookie::into_owned);
            let bytes = test::read_body(res).await;
            let body = if bytes.is_empty() {
                None
            } else {
                Some(serde_json::from_slice(&bytes).expect("json body"))
            };
            Snapshot {
                status,
                body,
                cookie,
            }
        })
    }

    /// Sign in as the fixture administrator and keep the session cookie.
    pub fn sign_in(&self, return_to: Option<&str>) -> Snapshot {
        let snapshot = self.send(
            test::TestRequest::post().uri("/api/v1/login").set_json(json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD,
                "returnTo": return_to,
            })),
            false,
        );
        assert_eq!(snapshot.status, 200, "login failed: {:?}", snapshot.body);
        *self.session.borrow_mut() = snapshot.cookie.clone();
        snapshot
    }

    pub fn record(&self, snapshot: Snapshot) {
        *self.last.borrow_mut() = Some(snapshot);
    }

    pub fn with_last<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        let last = self.last.borrow();
        f(last.as_ref().expect("a request was sent"))
    }
}

pub fn run_async<T>(future: impl Future<Output = T>) -> T {
    tokio::runtime::Runtime::new()
        .expect("runtime")
        .block_on(future)
}
