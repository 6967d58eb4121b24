//! Raw application form input and its validation.

use chrono::NaiveDate;

use crate::domain::validation::{
    self, FieldError, FieldErrorCode, FieldErrors, optional_choice, optional_text,
    optional_url, required_text,
};

use super::{ApplicationDetails, ApplicationRole, VeteranStatus};

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 120;
pub const LOCATION_MIN: usize = 2;
pub const LOCATION_MAX: usize = 120;
pub const COVER_NOTE_MAX: usize = 2000;
pub const POSITION_MAX: usize = 120;

/// Untrusted form payload exactly as the applicant sent it.
///
/// Field names in errors use the camelCase names of the public form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationSubmission {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub profile_url: Option<String>,
    pub cover_note: Option<String>,
    pub role: Option<String>,
    pub position: Option<String>,
    pub veteran_status: Option<String>,
    pub willing_to_relocate: Option<bool>,
    pub desired_start_date: Option<String>,
}

impl ApplicationSubmission {
    /// Check every field and report all failures together.
    ///
    /// A missing role defaults to `volunteer`, the form's preselected option.
    pub fn validate(&self) -> Result<ApplicationDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = errors.check(required_text(
            "fullName",
            self.full_name.as_deref(),
            FULL_NAME_MIN,
            FULL_NAME_MAX,
        ));
        let email = errors.check(validation::email("email", self.email.as_deref()));
        let phone = errors.check(validation::phone("phone", self.phone.as_deref()));
        let location = errors.check(required_text(
            "location",
            self.location.as_deref(),
            LOCATION_MIN,
            LOCATION_MAX,
        ));
        let profile_url = errors.check(optional_url("profileUrl", self.profile_url.as_deref()));
        let cover_note = errors.check(optional_text(
            "coverNote",
            self.cover_note.as_deref(),
            COVER_NOTE_MAX,
        ));
        let role = errors.check(optional_choice::<ApplicationRole>(
            "role",
            self.role.as_deref(),
            ApplicationRole::NAMES,
        ));
        let position = errors.check(optional_text(
            "position",
            self.position.as_deref(),
            POSITION_MAX,
        ));
        let veteran_status = errors.check(optional_choice::<VeteranStatus>(
            "veteranStatus",
            self.veteran_status.as_deref(),
            VeteranStatus::NAMES,
        ));
        let desired_start_date =
            errors.check(parse_start_date(self.desired_start_date.as_deref()));

        let (
            Some(full_name),
            Some(email),
            Some(phone),
            Some(location),
            Some(profile_url),
            Some(cover_note),
            Some(role),
            Some(position),
            Some(veteran_status),
            Some(desired_start_date),
        ) = (
            full_name,
            email,
            phone,
            location,
            profile_url,
            cover_note,
            role,
            position,
            veteran_status,
            desired_start_date,
        )
        else {
            return Err(errors);
        };

        Ok(ApplicationDetails {
            full_name,
            email,
            phone,
            location,
            profile_url,
            cover_note,
            role: role.unwrap_or(ApplicationRole::Volunteer),
            position,
            veteran_status,
            willing_to_relocate: self.willing_to_relocate,
            desired_start_date,
        })
    }
}

fn parse_start_date(raw: Option<&str>) -> Result<Option<NaiveDate>, FieldError> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            FieldError::new(
                "desiredStartDate",
                FieldErrorCode::InvalidDate,
                "desiredStartDate must be a YYYY-MM-DD date",
            )
        })
}
