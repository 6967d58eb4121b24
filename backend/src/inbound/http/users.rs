//! Back-office login and session endpoints.
//!
//! ```text
//! POST /api/v1/login {"email":"admin@vetpal.org","password":"…","returnTo":"/admin"}
//! POST /api/v1/logout
//! GET  /api/v1/session
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::{
    Error, ErrorCode, FieldError, LoginCredentials, LoginValidationError, ReturnPath, Subject,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "admin@vetpal.org")]
    pub email: String,
    pub password: String,
    /// Back-office path to resume after login. Off-site values are ignored.
    #[schema(example = "/admin/applications?status=new")]
    pub return_to: Option<String>,
}

/// Where the client should navigate after a successful login.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[schema(example = "/admin")]
    pub redirect_to: String,
}

/// Identity carried by the current session cookie.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub roles: Vec<String>,
}

impl From<&Subject> for SessionResponse {
    fn from(subject: &Subject) -> Self {
        match subject {
            Subject::Authenticated { user_id, roles } => Self {
                authenticated: true,
                user_id: Some(user_id.as_ref().to_owned()),
                roles: roles.iter().map(|role| role.as_str().to_owned()).collect(),
            },
            #[cfg(feature = "legacy-admin-token")]
            Subject::LegacyToken => Self {
                authenticated: true,
                user_id: None,
                roles: Vec::new(),
            },
            Subject::Anonymous => Self {
                authenticated: false,
                user_id: None,
                roles: Vec::new(),
            },
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => FieldError::required("email").into(),
        LoginValidationError::EmptyPassword => FieldError::required("password").into(),
    }
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Blank email or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let request = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&request.email, &request.password)
        .map_err(map_login_validation_error)?;
    let user = match state.login.authenticate(&credentials).await {
        Ok(user) => user,
        Err(err) => {
            if err.code() == ErrorCode::Unauthorized {
                warn!("login rejected");
            }
            return Err(err);
        }
    };
    session.persist_login(&user)?;
    info!(user_id = %user.user_id.as_ref(), "login succeeded");
    let redirect = ReturnPath::sanitise(request.return_to.as_deref());
    Ok(web::Json(LoginResponse {
        redirect_to: redirect.as_str().to_owned(),
    }))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Describe the current session.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Current identity", body = SessionResponse)),
    tags = ["users"],
    operation_id = "currentSession",
    security([])
)]
#[get("/session")]
pub async fn current_session(session: SessionContext) -> ApiResult<web::Json<SessionResponse>> {
    let subject = session.subject()?;
    Ok(web::Json(SessionResponse::from(&subject)))
}
