//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every HTTP endpoint from the inbound layer together
//! with the request and response DTOs they exchange. Domain types stay free
//! of utoipa; [`ErrorSchema`] and friends describe them instead.
//!
//! Swagger UI serves the document in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::applications::{
    ApplicationListResponse, ApplicationRequest, ApplicationResponse, StatusChangeRequest,
    SubmissionResponse,
};
use crate::inbound::http::campaigns::{CampaignRequest, CampaignResponse};
use crate::inbound::http::content::{
    EventRequest, EventResponse, NewsPostRequest, NewsPostResponse,
};
use crate::inbound::http::donations::{
    CheckoutRequest, CheckoutResponse, DonationListResponse, DonationResponse,
    DonationStatusRequest, DonorListResponse, DonorResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, FieldErrorSchema};
use crate::inbound::http::users::{LoginRequest, LoginResponse, SessionResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "VETPAL backend API",
        description = "Applications intake and review, fundraising, public content and back-office access."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_session,
        crate::inbound::http::applications::submit_application,
        crate::inbound::http::applications::list_applications,
        crate::inbound::http::applications::export_applications,
        crate::inbound::http::applications::get_application,
        crate::inbound::http::applications::change_application_status,
        crate::inbound::http::campaigns::list_campaigns,
        crate::inbound::http::campaigns::get_campaign,
        crate::inbound::http::campaigns::list_all_campaigns,
        crate::inbound::http::campaigns::create_campaign,
        crate::inbound::http::campaigns::update_campaign,
        crate::inbound::http::donations::start_checkout,
        crate::inbound::http::donations::list_donations,
        crate::inbound::http::donations::export_donations,
        crate::inbound::http::donations::change_donation_status,
        crate::inbound::http::donations::list_donors,
        crate::inbound::http::donations::export_donors,
        crate::inbound::http::content::list_events,
        crate::inbound::http::content::get_event,
        crate::inbound::http::content::list_news,
        crate::inbound::http::content::get_news_post,
        crate::inbound::http::content::create_event,
        crate::inbound::http::content::update_event,
        crate::inbound::http::content::create_news_post,
        crate::inbound::http::content::update_news_post,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FieldErrorSchema,
        LoginRequest,
        LoginResponse,
        SessionResponse,
        ApplicationRequest,
        SubmissionResponse,
        ApplicationResponse,
        ApplicationListResponse,
        StatusChangeRequest,
        CampaignRequest,
        CampaignResponse,
        CheckoutRequest,
        CheckoutResponse,
        DonationResponse,
        DonationListResponse,
        DonationStatusRequest,
        DonorResponse,
        DonorListResponse,
        EventRequest,
        EventResponse,
        NewsPostRequest,
        NewsPostResponse,
    )),
    tags(
        (name = "users", description = "Back-office login and session"),
        (name = "applications", description = "Public application intake"),
        (name = "campaigns", description = "Public fundraising campaigns"),
        (name = "donations", description = "Donation checkout"),
        (name = "content", description = "Public events and news"),
        (name = "admin", description = "Back-office operations behind the access guard"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
