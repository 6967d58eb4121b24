//! Field-level validation shared by every submitted form.
//!
//! Validators never stop at the first problem: each field check feeds a
//! [`FieldErrors`] collector so the client can annotate every invalid field in
//! one round trip. A non-empty collector aborts the write.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::Error;

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;
/// Minimum number of digits in a phone number once formatting is stripped.
pub const PHONE_MIN_DIGITS: usize = 7;
/// Maximum number of digits in a phone number.
pub const PHONE_MAX_DIGITS: usize = 15;

/// Machine-readable reason attached to a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    TooShort,
    TooLong,
    InvalidEmail,
    InvalidPhone,
    InvalidUrl,
    InvalidChoice,
    InvalidFormat,
    InvalidDate,
    OutOfRange,
}

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, code: FieldErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            code,
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, FieldErrorCode::Required, format!("{field} is required"))
    }
}

/// Every field error found while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// Record the error side of `result` and hand back the success value.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// True when `field` has at least one recorded error.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<FieldErrors> for Error {
    fn from(value: FieldErrors) -> Self {
        let count = value.len();
        let message = if count == 1 {
            "1 field is invalid".to_owned()
        } else {
            format!("{count} fields are invalid")
        };
        Error::invalid_request(message).with_details(json!({ "fields": value.0 }))
    }
}

impl From<FieldError> for Error {
    fn from(value: FieldError) -> Self {
        FieldErrors(vec![value]).into()
    }
}

/// Lowercased, trimmed email address.
///
/// # Examples
/// ```
/// use vetpal::domain::EmailAddress;
///
/// let email = EmailAddress::parse(" Jane@Example.com ").unwrap();
/// assert_eq!(email.as_str(), "jane@example.com");
/// assert!(EmailAddress::parse("jane.example.com").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

impl EmailAddress {
    /// Parse a raw address, returning `None` when it is malformed.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.len() > EMAIL_MAX || !email_regex().is_match(trimmed) {
            return None;
        }
        Some(Self(trimmed.to_lowercase()))
    }

    /// Wrap a value read back from storage.
    pub fn from_trusted(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Required text with inclusive character bounds.
pub fn required_text(
    field: &str,
    raw: Option<&str>,
    min_chars: usize,
    max_chars: usize,
) -> Result<String, FieldError> {
    let value = present(raw).ok_or_else(|| FieldError::required(field))?;
    bounded(field, value, min_chars, max_chars)
}

/// Optional text; blank input counts as absent.
pub fn optional_text(
    field: &str,
    raw: Option<&str>,
    max_chars: usize,
) -> Result<Option<String>, FieldError> {
    present(raw)
        .map(|value| bounded(field, value, 0, max_chars))
        .transpose()
}

fn bounded(field: &str, value: &str, min_chars: usize, max_chars: usize) -> Result<String, FieldError> {
    let count = value.chars().count();
    if count < min_chars {
        return Err(FieldError::new(
            field,
            FieldErrorCode::TooShort,
            format!("{field} must be at least {min_chars} characters"),
        ));
    }
    if count > max_chars {
        return Err(FieldError::new(
            field,
            FieldErrorCode::TooLong,
            format!("{field} must be at most {max_chars} characters"),
        ));
    }
    Ok(value.to_owned())
}

/// Required email address.
pub fn email(field: &str, raw: Option<&str>) -> Result<EmailAddress, FieldError> {
    let value = present(raw).ok_or_else(|| FieldError::required(field))?;
    EmailAddress::parse(value).ok_or_else(|| {
        FieldError::new(
            field,
            FieldErrorCode::InvalidEmail,
            format!("{field} must be a valid email address"),
        )
    })
}

/// Required phone number; keeps the applicant's formatting.
pub fn phone(field: &str, raw: Option<&str>) -> Result<String, FieldError> {
    let value = present(raw).ok_or_else(|| FieldError::required(field))?;
    let allowed = value
        .chars()
        .all(|ch| ch.is_ascii_digit() || matches!(ch, ' ' | '-' | '(' | ')' | '+' | '.'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !allowed || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Err(FieldError::new(
            field,
            FieldErrorCode::InvalidPhone,
            format!("{field} must contain {PHONE_MIN_DIGITS} to {PHONE_MAX_DIGITS} digits"),
        ));
    }
    Ok(value.to_owned())
}

/// Optional absolute http(s) URL.
pub fn optional_url(field: &str, raw: Option<&str>) -> Result<Option<Url>, FieldError> {
    let Some(value) = present(raw) else {
        return Ok(None);
    };
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(url)),
        _ => Err(FieldError::new(
            field,
            FieldErrorCode::InvalidUrl,
            format!("{field} must be an http or https URL"),
        )),
    }
}

/// Optional value parsed with `FromStr`, reported as an invalid choice.
pub fn optional_choice<T: std::str::FromStr>(
    field: &str,
    raw: Option<&str>,
    allowed: &[&str],
) -> Result<Option<T>, FieldError> {
    present(raw)
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                FieldError::new(
                    field,
                    FieldErrorCode::InvalidChoice,
                    format!("{field} must be one of: {}", allowed.join(", ")),
                )
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("jane@example.com", true)]
    #[case("JANE@EXAMPLE.COM", true)]
    #[case("jane@example", false)]
    #[case("jane example@x.org", false)]
    #[case("@example.com", false)]
    #[case("", false)]
    fn email_shapes(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(EmailAddress::parse(raw).is_some(), ok);
    }

    #[rstest]
    #[case("5551234567", true)]
    #[case("(555) 123-4567", true)]
    #[case("+1 555.123.4567", true)]
    #[case("555-12", false)]
    #[case("call me", false)]
    fn phone_shapes(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(phone("phone", Some(raw)).is_ok(), ok);
    }

    #[rstest]
    #[case(None, FieldErrorCode::Required)]
    #[case(Some("   "), FieldErrorCode::Required)]
    #[case(Some("J"), FieldErrorCode::TooShort)]
    fn required_text_codes(#[case] raw: Option<&str>, #[case] code: FieldErrorCode) {
        let err = required_text("fullName", raw, 2, 120).expect_err("must fail");
        assert_eq!(err.code, code);
        assert_eq!(err.field, "fullName");
    }

    #[rstest]
    #[case("ftp://example.com/cv.pdf")]
    #[case("not a url")]
    fn rejects_non_http_urls(#[case] raw: &str) {
        let err = optional_url("profileUrl", Some(raw)).expect_err("must fail");
        assert_eq!(err.code, FieldErrorCode::InvalidUrl);
    }

    #[rstest]
    fn blank_optional_url_is_absent() {
        assert_eq!(optional_url("profileUrl", Some("  ")), Ok(None));
    }

    #[rstest]
    fn collector_keeps_every_error() {
        let mut errors = FieldErrors::new();
        let name = errors.check(required_text("fullName", None, 2, 10));
        let mail = errors.check(email("email", Some("nope")));
        assert!(name.is_none() && mail.is_none());
        assert_eq!(errors.len(), 2);

        let err: Error = errors.into();
        let details = err.details().expect("details present");
        assert_eq!(details["fields"][1]["code"], "invalid_email");
        assert_eq!(err.message(), "2 fields are invalid");
    }
}
