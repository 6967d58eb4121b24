//! Event and news endpoints for the public site and the back office.
//!
//! ```text
//! GET  /api/v1/events
//! GET  /api/v1/events/{slug}
//! GET  /api/v1/news
//! GET  /api/v1/news/{slug}
//! POST /api/v1/admin/events
//! PUT  /api/v1/admin/events/{id}
//! POST /api/v1/admin/news
//! PUT  /api/v1/admin/news/{id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{
    Error, EventForm, EventId, EventRecord, NewsPostForm, NewsPostId, NewsPostRecord, Slug,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::guard::AdminSession;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const CONTENT_ID: FieldName = FieldName::new("id");

/// Malformed slugs can never match a record.
fn public_slug(raw: &str, kind: &str) -> Result<Slug, Error> {
    Slug::new(raw).map_err(|_| Error::not_found(format!("{kind} {raw} not found")))
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[schema(example = "Spring job fair")]
    pub title: Option<String>,
    #[schema(example = "spring-job-fair")]
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: Option<bool>,
}

impl From<EventRequest> for EventForm {
    fn from(value: EventRequest) -> Self {
        Self {
            title: value.title,
            slug: value.slug,
            summary: value.summary,
            location: value.location,
            starts_at: value.starts_at,
            ends_at: value.ends_at,
            published: value.published,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EventRecord> for EventResponse {
    fn from(event: &EventRecord) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title.clone(),
            slug: event.slug.as_str().to_owned(),
            summary: event.summary.clone(),
            location: event.location.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            published: event.published,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// News post payload. A post without `publishedAt`, or with a future one,
/// stays off the public site.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsPostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<NewsPostRequest> for NewsPostForm {
    fn from(value: NewsPostRequest) -> Self {
        Self {
            title: value.title,
            slug: value.slug,
            excerpt: value.excerpt,
            body: value.body,
            published_at: value.published_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsPostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&NewsPostRecord> for NewsPostResponse {
    fn from(post: &NewsPostRecord) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            slug: post.slug.as_str().to_owned(),
            excerpt: post.excerpt.clone(),
            body: post.body.clone(),
            published_at: post.published_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Published events, soonest first.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    responses((status = 200, description = "Published events", body = [EventResponse])),
    tags = ["content"],
    operation_id = "listEvents",
    security([])
)]
#[get("/events")]
pub async fn list_events(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<EventResponse>>> {
    let events = state.content_query.public_events().await?;
    Ok(web::Json(events.iter().map(EventResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{slug}",
    params(("slug" = String, Path, description = "Event slug")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Unknown or unpublished event", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "getEvent",
    security([])
)]
#[get("/events/{slug}")]
pub async fn get_event(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<EventResponse>> {
    let slug = public_slug(&path, "event")?;
    let event = state.content_query.event_by_slug(&slug).await?;
    Ok(web::Json(EventResponse::from(&event)))
}

/// Published news, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/news",
    responses((status = 200, description = "Published posts", body = [NewsPostResponse])),
    tags = ["content"],
    operation_id = "listNews",
    security([])
)]
#[get("/news")]
pub async fn list_news(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<NewsPostResponse>>> {
    let posts = state.content_query.public_news().await?;
    Ok(web::Json(posts.iter().map(NewsPostResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/news/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = NewsPostResponse),
        (status = 404, description = "Unknown or unpublished post", body = ErrorSchema)
    ),
    tags = ["content"],
    operation_id = "getNewsPost",
    security([])
)]
#[get("/news/{slug}")]
pub async fn get_news_post(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<NewsPostResponse>> {
    let slug = public_slug(&path, "news post")?;
    let post = state.content_query.news_post_by_slug(&slug).await?;
    Ok(web::Json(NewsPostResponse::from(&post)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Created", body = EventResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Slug already used", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createEvent"
)]
#[post("/admin/events")]
pub async fn create_event(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    payload: web::Json<EventRequest>,
) -> ApiResult<HttpResponse> {
    let event = state.content.create_event(payload.into_inner().into()).await?;
    info!(event_id = %event.id, slug = %event.slug, "event created");
    Ok(HttpResponse::Created().json(EventResponse::from(&event)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Updated", body = EventResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown event", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateEvent"
)]
#[put("/admin/events/{id}")]
pub async fn update_event(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<EventRequest>,
) -> ApiResult<web::Json<EventResponse>> {
    let id: EventId = parse_id(&path, CONTENT_ID)?;
    let event = state
        .content
        .update_event(&id, payload.into_inner().into())
        .await?;
    Ok(web::Json(EventResponse::from(&event)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/news",
    request_body = NewsPostRequest,
    responses(
        (status = 201, description = "Created", body = NewsPostResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Slug already used", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createNewsPost"
)]
#[post("/admin/news")]
pub async fn create_news_post(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    payload: web::Json<NewsPostRequest>,
) -> ApiResult<HttpResponse> {
    let post = state
        .content
        .create_news_post(payload.into_inner().into())
        .await?;
    info!(news_post_id = %post.id, slug = %post.slug, "news post created");
    Ok(HttpResponse::Created().json(NewsPostResponse::from(&post)))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/news/{id}",
    params(("id" = String, Path, description = "News post id")),
    request_body = NewsPostRequest,
    responses(
        (status = 200, description = "Updated", body = NewsPostResponse),
        (status = 400, description = "Invalid fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateNewsPost"
)]
#[put("/admin/news/{id}")]
pub async fn update_news_post(
    _admin: AdminSession,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<NewsPostRequest>,
) -> ApiResult<web::Json<NewsPostResponse>> {
    let id: NewsPostId = parse_id(&path, CONTENT_ID)?;
    let post = state
        .content
        .update_news_post(&id, payload.into_inner().into())
        .await?;
    Ok(web::Json(NewsPostResponse::from(&post)))
}
