//! Application intake and back-office review endpoints.
//!
//! ```text
//! POST  /api/v1/applications
//! GET   /api/v1/admin/applications?status=new&search=jo
//! GET   /api/v1/admin/applications/export
//! GET   /api/v1/admin/applications/{id}
//! PATCH /api/v1/admin/applications/{id}/status
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::csv_export::applications_csv;
use crate::domain::ports::SubmissionReceipt;
use crate::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationSubmission, CmsStatus, Error,
    ExportKind, FieldError, FieldErrorCode, Listing, PublicStatus, StatusTransition,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::csv_response::csv_attachment;
use crate::inbound::http::guard::AdminSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, ListQuery, parse_id};

const APPLICATION_ID: FieldName = FieldName::new("id");

/// Public application form. Every field is optional on the wire so that
/// missing values are reported alongside invalid ones.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    #[schema(example = "Jane Doe")]
    pub full_name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[schema(example = "(512) 555-0100")]
    pub phone: Option<String>,
    #[schema(example = "Austin, TX")]
    pub location: Option<String>,
    pub profile_url: Option<String>,
    pub cover_note: Option<String>,
    /// `volunteer`, `veteran` or `careers`; defaults to `volunteer`.
    pub role: Option<String>,
    pub position: Option<String>,
    pub veteran_status: Option<String>,
    pub willing_to_relocate: Option<bool>,
    /// `YYYY-MM-DD`.
    pub desired_start_date: Option<String>,
}

impl From<ApplicationRequest> for ApplicationSubmission {
    fn from(value: ApplicationRequest) -> Self {
        Self {
            full_name: value.full_name,
            email: value.email,
            phone: value.phone,
            location: value.location,
            profile_url: value.profile_url,
            cover_note: value.cover_note,
            role: value.role,
            position: value.position,
            veteran_status: value.veteran_status,
            willing_to_relocate: value.willing_to_relocate,
            desired_start_date: value.desired_start_date,
        }
    }
}

/// Acknowledgement for a stored application.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: String,
    #[schema(example = "new")]
    pub status: String,
    #[schema(example = "/apply/thank-you")]
    pub redirect_to: String,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(value: SubmissionReceipt) -> Self {
        Self {
            id: value.id.to_string(),
            status: value.status.as_str().to_owned(),
            redirect_to: value.redirect_to,
        }
    }
}

/// Back-office view of one application.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub profile_url: Option<String>,
    pub cover_note: Option<String>,
    pub role: String,
    pub position: Option<String>,
    pub veteran_status: Option<String>,
    pub willing_to_relocate: Option<bool>,
    pub desired_start_date: Option<NaiveDate>,
    /// Canonical workflow status.
    #[schema(example = "contacted")]
    pub status: String,
    /// Applicant-facing spelling of `status`.
    #[schema(example = "contacted")]
    pub public_status: String,
    /// Old CMS spelling of `status`.
    #[schema(example = "reviewing")]
    pub cms_status: String,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// `mailto:` link for contacting the applicant.
    pub contact_link: String,
}

fn wire_name<T: Serialize>(value: T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|json| json.as_str().map(str::to_owned))
        .unwrap_or_default()
}

impl From<&ApplicationRecord> for ApplicationResponse {
    fn from(record: &ApplicationRecord) -> Self {
        let details = record.details();
        Self {
            id: record.id().to_string(),
            full_name: details.full_name.clone(),
            email: details.email.as_str().to_owned(),
            phone: details.phone.clone(),
            location: details.location.clone(),
            profile_url: details.profile_url.as_ref().map(ToString::to_string),
            cover_note: details.cover_note.clone(),
            role: details.role.as_str().to_owned(),
            position: details.position.clone(),
            veteran_status: details.veteran_status.map(|status| status.as_str().to_owned()),
            willing_to_relocate: details.willing_to_relocate,
            desired_start_date: details.desired_start_date,
            status: record.status().as_str().to_owned(),
            public_status: wire_name(PublicStatus::from(record.status())),
            cms_status: wire_name(CmsStatus::from(record.status())),
            internal_notes: record.internal_notes().map(str::to_owned),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
            reviewed_at: record.reviewed_at(),
            contact_link: record.mailto_link(),
        }
    }
}

/// Filtered back-office list. `empty` lets clients render a "no records"
/// state without inspecting `items`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: usize,
    pub empty: bool,
}

impl From<Listing<ApplicationRecord>> for ApplicationListResponse {
    fn from(listing: Listing<ApplicationRecord>) -> Self {
        Self {
            total: listing.total(),
            empty: listing.is_empty(),
            items: listing.items.iter().map(ApplicationResponse::from).collect(),
        }
    }
}

/// Requested workflow move.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    /// Canonical name; `review` is accepted for `reviewing`.
    #[schema(example = "contacted")]
    pub status: String,
    /// Replaces the internal notes when present; an empty string clears them.
    pub notes: Option<String>,
    /// Reject the change with 409 unless the stored `updatedAt` still matches.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<StatusChangeRequest> for StatusTransition {
    type Error = Error;

    fn try_from(value: StatusChangeRequest) -> Result<Self, Self::Error> {
        let status = value.status.parse::<ApplicationStatus>().map_err(|_| {
            FieldError::new(
                "status",
                FieldErrorCode::InvalidChoice,
                format!("status must be one of: {}", status_names().join(", ")),
            )
        })?;
        let mut transition = Self::to(status);
        if let Some(notes) = value.notes.as_deref() {
            transition = transition.with_notes(notes)?;
        }
        if let Some(expected) = value.expected_updated_at {
            transition = transition.expecting(expected);
        }
        Ok(transition)
    }
}

fn status_names() -> Vec<&'static str> {
    ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect()
}

/// Submit a volunteer, veteran or careers application.
#[utoipa::path(
    post,
    path = "/api/v1/applications",
    request_body = ApplicationRequest,
    responses(
        (status = 201, description = "Application stored", body = SubmissionResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 503, description = "Record store unavailable", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "submitApplication",
    security([])
)]
#[post("/applications")]
pub async fn submit_application(
    state: web::Data<HttpState>,
    payload: web::Json<ApplicationRequest>,
) -> ApiResult<HttpResponse> {
    let receipt = state
        .applications
        .submit(payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(SubmissionResponse::from(receipt)))
}

/// List applications matching a status and search filter.
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications",
    params(ListQuery),
    responses(
        (status = 200, description = "Matching applications", body = ApplicationListResponse),
        (status = 400, description = "Unknown status filter", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listApplications"
)]
#[get("/admin/applications")]
pub async fn list_applications(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<ApplicationListResponse>> {
    let filter = query.filter::<ApplicationStatus>(&status_names())?;
    let listing = state.applications_query.list(&filter).await?;
    Ok(web::Json(listing.into()))
}

/// Download the filtered applications as CSV.
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications/export",
    params(ListQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "exportApplications"
)]
#[get("/admin/applications/export")]
pub async fn export_applications(
    admin: AdminSession,
    state: web::Data<HttpState>,
    query: web::Query<ListQuery>,
) -> ApiResult<HttpResponse> {
    let filter = query.filter::<ApplicationStatus>(&status_names())?;
    let listing = state.applications_query.list(&filter).await?;
    let body = applications_csv(&listing.items)?;
    info!(
        rows = listing.total(),
        user_id = ?admin.user_id().map(ToString::to_string),
        "applications exported"
    );
    Ok(csv_attachment(
        ExportKind::Applications,
        state.clock.utc().date_naive(),
        body,
    ))
}

/// Fetch one application.
#[utoipa::path(
    get,
    path = "/api/v1/admin/applications/{id}",
    params(("id" = String, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application", body = ApplicationResponse),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown application", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getApplication"
)]
#[get("/admin/applications/{id}")]
pub async fn get_application(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let id: ApplicationId = parse_id(&path, APPLICATION_ID)?;
    let record = state.applications_query.get(&id).await?;
    Ok(web::Json(ApplicationResponse::from(&record)))
}

/// Move an application through the review workflow.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/applications/{id}/status",
    params(("id" = String, Path, description = "Application id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Updated application", body = ApplicationResponse),
        (status = 400, description = "Unknown status or notes too long", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown application", body = ErrorSchema),
        (status = 409, description = "Stale write or locked terminal status", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "changeApplicationStatus"
)]
#[patch("/admin/applications/{id}/status")]
pub async fn change_application_status(
    admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StatusChangeRequest>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let id: ApplicationId = parse_id(&path, APPLICATION_ID)?;
    let transition = StatusTransition::try_from(payload.into_inner())?;
    let record = state.applications.transition(&id, transition).await?;
    info!(
        application_id = %id,
        status = %record.status(),
        user_id = ?admin.user_id().map(ToString::to_string),
        "application status changed"
    );
    Ok(web::Json(ApplicationResponse::from(&record)))
}

#[cfg(test)]
#[path = "applications_tests.rs"]
mod tests;
