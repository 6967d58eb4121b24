//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every malformed input, whether a bad path id, an unknown filter value or
//! an undecodable body, leaves as the same `400 invalid_request` shape as
//! form validation: `details.fields = [{field, code, message}]`.

use std::str::FromStr;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};

use crate::domain::{Error, FieldError, FieldErrorCode, ListFilter, SearchText, StatusFilter};

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn single(field: &str, code: FieldErrorCode, message: String) -> Error {
    FieldError::new(field, code, message).into()
}

/// Parse a record id taken from the URL path.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: FieldName) -> Result<T, Error> {
    raw.parse().map_err(|_| {
        single(
            field.as_str(),
            FieldErrorCode::InvalidFormat,
            format!("{} must be a valid UUID", field.as_str()),
        )
    })
}

/// Query string shared by every admin list and export endpoint.
#[derive(Debug, Default, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// `all` or a status name.
    pub status: Option<String>,
    /// Case-insensitive substring.
    pub search: Option<String>,
}

impl ListQuery {
    /// Build a list filter, reporting an unknown status as a field error.
    pub(crate) fn filter<S>(&self, allowed: &[&str]) -> Result<ListFilter<S>, Error>
    where
        S: FromStr + PartialEq + Copy,
    {
        let status = match self.status.as_deref() {
            None => StatusFilter::All,
            Some(raw) => raw.parse::<StatusFilter<S>>().map_err(|_| {
                single(
                    "status",
                    FieldErrorCode::InvalidChoice,
                    format!("status must be all or one of: {}", allowed.join(", ")),
                )
            })?,
        };
        Ok(ListFilter::new(status, self.search_text()))
    }

    /// The search needle alone, for collections without a status.
    pub(crate) fn search_text(&self) -> SearchText {
        self.search
            .as_deref()
            .map(SearchText::new)
            .unwrap_or_default()
    }
}

/// Extractor configuration that reports decode failures in the API shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match &err {
        JsonPayloadError::Deserialize(inner) => {
            single("body", FieldErrorCode::InvalidFormat, inner.to_string())
        }
        JsonPayloadError::ContentType => single(
            "body",
            FieldErrorCode::InvalidFormat,
            "expected an application/json body".to_owned(),
        ),
        other => Error::invalid_request(format!("unreadable request body: {other}")),
    };
    error.into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    single("query", FieldErrorCode::InvalidFormat, err.to_string()).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    single("path", FieldErrorCode::InvalidFormat, err.to_string()).into()
}
