//! Fundraising campaign endpoints.
//!
//! ```text
//! GET  /api/v1/campaigns
//! GET  /api/v1/campaigns/{slug}
//! GET  /api/v1/admin/campaigns
//! POST /api/v1/admin/campaigns
//! PUT  /api/v1/admin/campaigns/{id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{CampaignForm, CampaignId, CampaignRecord, Error, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::guard::AdminSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const CAMPAIGN_ID: FieldName = FieldName::new("id");

/// Create or replace a campaign. Amounts are in minor units.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRequest {
    #[schema(example = "Warm winter")]
    pub title: Option<String>,
    #[schema(example = "warm-winter")]
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(example = 500_000)]
    pub goal_amount: Option<i64>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    /// `draft`, `active` or `completed`; defaults to `draft`.
    pub status: Option<String>,
    pub featured: Option<bool>,
}

impl From<CampaignRequest> for CampaignForm {
    fn from(value: CampaignRequest) -> Self {
        Self {
            title: value.title,
            slug: value.slug,
            description: value.description,
            goal_amount: value.goal_amount,
            starts_on: value.starts_on,
            ends_on: value.ends_on,
            status: value.status,
            featured: value.featured,
        }
    }
}

/// Campaign with its progress towards the goal.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub goal_amount: i64,
    pub current_amount: i64,
    /// `min(current / goal * 100, 100)`, to two decimal places.
    #[schema(example = 42.5)]
    pub progress_percent: f64,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CampaignRecord> for CampaignResponse {
    fn from(record: &CampaignRecord) -> Self {
        Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            slug: record.slug.as_str().to_owned(),
            description: record.description.clone(),
            goal_amount: record.goal_amount.get(),
            current_amount: record.current_amount().get(),
            progress_percent: record.progress_percent(),
            starts_on: record.starts_on,
            ends_on: record.ends_on,
            status: record.status.as_str().to_owned(),
            featured: record.featured,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

fn responses(records: &[CampaignRecord]) -> Vec<CampaignResponse> {
    records.iter().map(CampaignResponse::from).collect()
}

/// Active campaigns, featured first.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    responses((status = 200, description = "Active campaigns", body = [CampaignResponse])),
    tags = ["campaigns"],
    operation_id = "listCampaigns",
    security([])
)]
#[get("/campaigns")]
pub async fn list_campaigns(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CampaignResponse>>> {
    let campaigns = state.campaigns_query.list_public().await?;
    Ok(web::Json(responses(&campaigns)))
}

/// One active campaign.
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{slug}",
    params(("slug" = String, Path, description = "Campaign slug")),
    responses(
        (status = 200, description = "Campaign", body = CampaignResponse),
        (status = 404, description = "Unknown or inactive campaign", body = ErrorSchema)
    ),
    tags = ["campaigns"],
    operation_id = "getCampaign",
    security([])
)]
#[get("/campaigns/{slug}")]
pub async fn get_campaign(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CampaignResponse>> {
    let slug = Slug::new(path.as_str())
        .map_err(|_| Error::not_found(format!("campaign {} not found", path.as_str())))?;
    let campaign = state.campaigns_query.get_public(&slug).await?;
    Ok(web::Json(CampaignResponse::from(&campaign)))
}

/// Every campaign, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/campaigns",
    responses(
        (status = 200, description = "All campaigns", body = [CampaignResponse]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listAllCampaigns"
)]
#[get("/admin/campaigns")]
pub async fn list_all_campaigns(
    _admin: AdminSession,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CampaignResponse>>> {
    let campaigns = state.campaigns_query.list_all().await?;
    Ok(web::Json(responses(&campaigns)))
}

/// Create a campaign.
#[utoipa::path(
    post,
    path = "/api/v1/admin/campaigns",
    request_body = CampaignRequest,
    responses(
        (status = 201, description = "Created", body = CampaignResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Slug already used", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createCampaign"
)]
#[post("/admin/campaigns")]
pub async fn create_campaign(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    payload: web::Json<CampaignRequest>,
) -> ApiResult<HttpResponse> {
    let campaign = state.campaigns.create(payload.into_inner().into()).await?;
    info!(campaign_id = %campaign.id, slug = %campaign.slug, "campaign created");
    Ok(HttpResponse::Created().json(CampaignResponse::from(&campaign)))
}

/// Replace a campaign's editable fields. The raised total is kept.
#[utoipa::path(
    put,
    path = "/api/v1/admin/campaigns/{id}",
    params(("id" = String, Path, description = "Campaign id")),
    request_body = CampaignRequest,
    responses(
        (status = 200, description = "Updated", body = CampaignResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown campaign", body = ErrorSchema),
        (status = 409, description = "Slug already used", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateCampaign"
)]
#[put("/admin/campaigns/{id}")]
pub async fn update_campaign(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<CampaignRequest>,
) -> ApiResult<web::Json<CampaignResponse>> {
    let id: CampaignId = parse_id(&path, CAMPAIGN_ID)?;
    let campaign = state
        .campaigns
        .update(&id, payload.into_inner().into())
        .await?;
    Ok(web::Json(CampaignResponse::from(&campaign)))
}
