//! Donation checkout and back-office donation endpoints.
//!
//! ```text
//! POST  /api/v1/donations/checkout
//! GET   /api/v1/admin/donations?status=succeeded&search=jane
//! GET   /api/v1/admin/donations/export
//! PATCH /api/v1/admin/donations/{id}/status
//! GET   /api/v1/admin/donors?search=jane
//! GET   /api/v1/admin/donors/export
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::csv_export::{donations_csv, donors_csv};
use crate::domain::ports::CheckoutSession;
use crate::domain::{
    CheckoutForm, DonationId, DonationListing, DonationRecord, DonationStatus, DonorFilter,
    DonorRecord, Error, ExportKind, FieldError, FieldErrorCode, ListFilter, Listing, StatusFilter,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csv_response::csv_attachment;
use crate::inbound::http::guard::AdminSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, ListQuery, parse_id};

const DONATION_ID: FieldName = FieldName::new("id");

/// Public donation form. Amounts are in minor units.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[schema(example = 2_500)]
    pub amount: Option<i64>,
    /// `one_time` or `monthly`; defaults to `one_time`.
    pub cadence: Option<String>,
    #[schema(example = "Jane Doe")]
    pub donor_name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub donor_email: Option<String>,
    /// Credit an active campaign once the donation succeeds.
    pub campaign_slug: Option<String>,
}

impl From<CheckoutRequest> for CheckoutForm {
    fn from(value: CheckoutRequest) -> Self {
        Self {
            amount: value.amount,
            cadence: value.cadence,
            donor_name: value.donor_name,
            donor_email: value.donor_email,
            campaign_slug: value.campaign_slug,
        }
    }
}

/// Where to send the donor to complete payment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub donation_id: String,
    #[schema(example = "https://pay.example.org/one-time?client_reference_id=…")]
    pub checkout_url: String,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(value: CheckoutSession) -> Self {
        Self {
            donation_id: value.donation_id.to_string(),
            checkout_url: value.checkout_url.into(),
        }
    }
}

/// Donor as shown in the back office.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&DonorRecord> for DonorResponse {
    fn from(donor: &DonorRecord) -> Self {
        Self {
            id: donor.id.to_string(),
            full_name: donor.full_name.clone(),
            email: donor.email.as_str().to_owned(),
            created_at: donor.created_at,
        }
    }
}

/// Donation with its donor, when the donor is still on file.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub id: String,
    pub amount: i64,
    #[schema(example = "one_time")]
    pub cadence: String,
    #[schema(example = "pending")]
    pub status: String,
    pub campaign_id: Option<String>,
    pub donor: Option<DonorResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationResponse {
    fn new(donation: &DonationRecord, donor: Option<&DonorRecord>) -> Self {
        Self {
            id: donation.id.to_string(),
            amount: donation.amount.get(),
            cadence: donation.cadence.as_str().to_owned(),
            status: donation.status.as_str().to_owned(),
            campaign_id: donation.campaign_id.map(|id| id.to_string()),
            donor: donor.map(DonorResponse::from),
            created_at: donation.created_at,
            updated_at: donation.updated_at,
        }
    }
}

impl From<&DonationListing> for DonationResponse {
    fn from(listing: &DonationListing) -> Self {
        Self::new(&listing.donation, listing.donor.as_ref())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationListResponse {
    pub items: Vec<DonationResponse>,
    pub total: usize,
    pub empty: bool,
}

impl From<Listing<DonationListing>> for DonationListResponse {
    fn from(listing: Listing<DonationListing>) -> Self {
        Self {
            total: listing.total(),
            empty: listing.is_empty(),
            items: listing.items.iter().map(DonationResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonorListResponse {
    pub items: Vec<DonorResponse>,
    pub total: usize,
    pub empty: bool,
}

impl From<Listing<DonorRecord>> for DonorListResponse {
    fn from(listing: Listing<DonorRecord>) -> Self {
        Self {
            total: listing.total(),
            empty: listing.is_empty(),
            items: listing.items.iter().map(DonorResponse::from).collect(),
        }
    }
}

/// Requested settlement or refund.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DonationStatusRequest {
    #[schema(example = "succeeded")]
    pub status: String,
}

impl TryFrom<DonationStatusRequest> for DonationStatus {
    type Error = Error;

    fn try_from(value: DonationStatusRequest) -> Result<Self, Self::Error> {
        value.status.parse::<DonationStatus>().map_err(|_| {
            FieldError::new(
                "status",
                FieldErrorCode::InvalidChoice,
                format!("status must be one of: {}", DonationStatus::NAMES.join(", ")),
            )
            .into()
        })
    }
}

fn donor_filter(query: &ListQuery) -> DonorFilter {
    ListFilter::new(StatusFilter::All, query.search_text())
}

/// Record a pending donation and return the hosted checkout link.
#[utoipa::path(
    post,
    path = "/api/v1/donations/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Checkout started", body = CheckoutResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 404, description = "Unknown or inactive campaign", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "startCheckout",
    security([])
)]
#[post("/donations/checkout")]
pub async fn start_checkout(
    state: web::Data<HttpState>,
    payload: web::Json<CheckoutRequest>,
) -> ApiResult<HttpResponse> {
    let session = state
        .donations
        .start_checkout(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(CheckoutResponse::from(session)))
}

/// Donations matching a status and donor search.
#[utoipa::path(
    get,
    path = "/api/v1/admin/donations",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching donations", body = DonationListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listDonations"
)]
#[get("/admin/donations")]
pub async fn list_donations(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<DonationListResponse>> {
    let filter = query.filter::<DonationStatus>(DonationStatus::NAMES)?;
    let listing = state.donations_query.list_donations(&filter).await?;
    Ok(web::Json(listing.into()))
}

/// Download the filtered donations as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/admin/donations/export",
    params(ListQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "exportDonations"
)]
#[get("/admin/donations/export")]
pub async fn export_donations(
    admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.filter::<DonationStatus>(DonationStatus::NAMES)?;
    let listing = state.donations_query.list_donations(&filter).await?;
    let body = donations_csv(&listing.items)?;
    info!(
        rows = listing.total(),
        user_id = ?admin.user_id().map(ToString::to_string),
        "donations exported"
    );
    Ok(csv_attachment(
        ExportKind::Donations,
        state.clock.utc().date_naive(),
        body,
    ))
}

/// Settle, fail or refund a donation.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/donations/{id}/status",
    params(("id" = String, Path, description = "Donation id")),
    request_body = DonationStatusRequest,
    responses(
        (status = 200, description = "Updated donation", body = DonationResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown donation", body = ErrorSchema),
        (status = 409, description = "Move not allowed from the current status", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "changeDonationStatus"
)]
#[patch("/admin/donations/{id}/status")]
pub async fn change_donation_status(
    admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DonationStatusRequest>,
) -> ApiResult<web::Json<DonationResponse>> {
    let id: DonationId = parse_id(&path, DONATION_ID)?;
    let to = DonationStatus::try_from(payload.into_inner())?;
    let donation = state.donations.update_status(&id, to).await?;
    info!(
        donation_id = %id,
        status = %donation.status,
        user_id = ?admin.user_id().map(ToString::to_string),
        "donation status changed"
    );
    Ok(web::Json(DonationResponse::new(&donation, None)))
}

/// Donors matching a name or email search.
#[utoipa::path(
    get,
    path = "/api/v1/admin/donors",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching donors", body = DonorListResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listDonors"
)]
#[get("/admin/donors")]
pub async fn list_donors(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<DonorListResponse>> {
    let listing = state
        .donations_query
        .list_donors(&donor_filter(&query))
        .await?;
    Ok(web::Json(listing.into()))
}

/// Download the matching donors as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/admin/donors/export",
    params(ListQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "exportDonors"
)]
#[get("/admin/donors/export")]
pub async fn export_donors(
    admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let listing = state
        .donations_query
        .list_donors(&donor_filter(&query))
        .await?;
    let body = donors_csv(&listing.items)?;
    info!(
        rows = listing.total(),
        user_id = ?admin.user_id().map(ToString::to_string),
        "donors exported"
    );
    Ok(csv_attachment(ExportKind::Donors, state.clock.utc().date_naive(), body))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use url::Url;

    use super::*;
    use crate::domain::ports::{MockDonationCommand, MockDonationQuery};
    use crate::domain::{Cadence, DonorId, EmailAddress, MinorUnits};
    use crate::inbound::http::test_utils::{admin_cookie, fixture_state, test_app};
    use crate::test_support::fixture_time;

    #[fixture]
    fn jane() -> DonorRecord {
        DonorRecord {
            id: DonorId::random(),
            full_name: "Jane Doe".into(),
            email: EmailAddress::parse("jane@example.com").expect("email"),
            created_at: fixture_time(),
        }
    }

    fn donation(donor: &DonorRecord, status: DonationStatus) -> DonationRecord {
        DonationRecord {
            id: DonationId::random(),
            amount: MinorUnits::new(2_500).expect("amount"),
            donor_id: donor.id,
            campaign_id: None,
            cadence: Cadence::OneTime,
            status,
            created_at: fixture_time(),
            updated_at: fixture_time(),
        }
    }

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api/v1")
                .service(start_checkout)
                .service(export_donations)
                .service(list_donations)
                .service(change_donation_status)
                .service(export_donors)
                .service(list_donors),
        );
    }

    #[actix_web::test]
    async fn checkout_returns_the_hosted_link() {
        let id = DonationId::random();
        let mut command = MockDonationCommand::new();
        command
            .expect_start_checkout()
            .withf(|form| form.amount == Some(2_500) && form.cadence.as_deref() == Some("monthly"))
            .return_once(move |_| {
                Ok(CheckoutSession {
                    donation_id: id,
                    checkout_url: Url::parse("https://pay.example.org/monthly?client_reference_id=x")
                        .expect("url"),
                })
            });
        let state = HttpState {
            donations: Arc::new(command),
            ..fixture_state()
        };
        let app = test::init_service(test_app(state).configure(routes)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/donations/checkout")
                .set_json(json!({
                    "amount": 2_500,
                    "cadence": "monthly",
                    "donorName": "Jane Doe",
                    "donorEmail": "jane@example.com",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["donationId"], id.to_string());
        assert!(
            body["checkoutUrl"]
                .as_str()
                .is_some_and(|url| url.starts_with("https://pay.example.org/monthly"))
        );
    }

    #[actix_web::test]
    async fn checkout_below_minimum_reports_amount() {
        let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/donations/checkout")
                .set_json(json!({
                    "amount": 50,
                    "donorName": "Jane Doe",
                    "donorEmail": "jane@example.com",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["fields"][0]["field"], "amount");
    }

    #[rstest]
    #[actix_web::test]
    async fn list_joins_donor_and_honours_status(jane: DonorRecord) {
        let row = DonationListing {
            donation: donation(&jane, DonationStatus::Succeeded),
            donor: Some(jane),
        };
        let mut query = MockDonationQuery::new();
        query
            .expect_list_donations()
            .withf(|filter| filter.status == StatusFilter::Only(DonationStatus::Succeeded))
            .return_once(move |_| Ok(Listing::from(vec![row])));
        let state = HttpState {
            donations_query: Arc::new(query),
            ..fixture_state()
        };
        let app = test::init_service(test_app(state).configure(routes)).await;
        let cookie = admin_cookie(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/donations?status=succeeded")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["status"], "succeeded");
        assert_eq!(body["items"][0]["donor"]["fullName"], "Jane Doe");
    }

    #[actix_web::test]
    async fn refunding_a_pending_donation_conflicts() {
        let mut command = MockDonationCommand::new();
        command.expect_update_status().return_once(|_, to| {
            Err(crate::domain::DonationTransitionError {
                from: DonationStatus::Pending,
                to,
            }
            .into())
        });
        let state = HttpState {
            donations: Arc::new(command),
            ..fixture_state()
        };
        let app = test::init_service(test_app(state).configure(routes)).await;
        let cookie = admin_cookie(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!(
                    "/api/v1/admin/donations/{}/status",
                    DonationId::random()
                ))
                .cookie(cookie)
                .set_json(json!({ "status": "refunded" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["from"], "pending");
    }

    #[actix_web::test]
    async fn unknown_donation_status_is_a_field_error() {
        let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
        let cookie = admin_cookie(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!(
                    "/api/v1/admin/donations/{}/status",
                    DonationId::random()
                ))
                .cookie(cookie)
                .set_json(json!({ "status": "paid" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["fields"][0]["code"], "invalid_choice");
    }

    #[rstest]
    #[actix_web::test]
    async fn donor_export_ignores_status_and_searches(jane: DonorRecord) {
        let mut query = MockDonationQuery::new();
        query
            .expect_list_donors()
            .withf(|filter| filter.search.as_str() == "jane")
            .return_once(move |_| Ok(Listing::from(vec![jane])));
        let state = HttpState {
            donations_query: Arc::new(query),
            ..fixture_state()
        };
        let app = test::init_service(test_app(state).configure(routes)).await;
        let cookie = admin_cookie(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/donors/export?search=Jane")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(
            res.headers()
                .get(header::CONTENT_DISPOSITION)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.contains("donors-"))
        );
        let body = test::read_body(res).await;
        let text = std::str::from_utf8(&body).expect("utf8");
        assert!(text.contains("jane@example.com"));
    }
}
