//! Application records and the applicant-supplied details they carry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::domain::listing::Listable;
use crate::domain::{ApplicationId, EmailAddress};

use super::ApplicationStatus;

/// Error for unrecognised enumeration values on the submission form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownChoice(pub String);

macro_rules! form_choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire names accepted by [`FromStr`].
            pub const NAMES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownChoice(other.to_owned())),
                }
            }
        }
    };
}

form_choice!(
    /// Programme the applicant is applying to.
    ApplicationRole {
        Volunteer => "volunteer",
        Veteran => "veteran",
        Careers => "careers",
    }
);

form_choice!(
    /// Optional service affiliation tag.
    VeteranStatus {
        Veteran => "veteran",
        ActiveDuty => "active_duty",
        Reservist => "reservist",
        MilitaryFamily => "military_family",
        Supporter => "supporter",
    }
);

/// Validated applicant input, produced by
/// [`super::ApplicationSubmission::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDetails {
    pub full_name: String,
    pub email: EmailAddress,
    pub phone: String,
    pub location: String,
    pub profile_url: Option<Url>,
    pub cover_note: Option<String>,
    pub role: ApplicationRole,
    pub position: Option<String>,
    pub veteran_status: Option<VeteranStatus>,
    pub willing_to_relocate: Option<bool>,
    pub desired_start_date: Option<NaiveDate>,
}

/// Stored application.
///
/// ## Invariants
/// - `status` is always a member of [`ApplicationStatus`].
/// - `created_at <= updated_at`, with equality at submission.
/// - `internal_notes` is administrator only.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub(super) id: ApplicationId,
    pub(super) details: ApplicationDetails,
    pub(super) status: ApplicationStatus,
    pub(super) internal_notes: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
    pub(super) reviewed_at: Option<DateTime<Utc>>,
}

/// Stored fields, used by adapters to rebuild a record.
#[derive(Debug, Clone)]
pub struct ApplicationParts {
    pub id: ApplicationId,
    pub details: ApplicationDetails,
    pub status: ApplicationStatus,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    /// A freshly submitted application: status `new`, both timestamps `now`.
    pub fn submit(id: ApplicationId, details: ApplicationDetails, now: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            status: ApplicationStatus::New,
            internal_notes: None,
            created_at: now,
            updated_at: now,
            reviewed_at: None,
        }
    }

    /// Rebuild a record read from storage.
    ///
    /// A clock skew that left `updated_at` behind `created_at` is repaired by
    /// lifting `updated_at`.
    pub fn from_parts(parts: ApplicationParts) -> Self {
        Self {
            id: parts.id,
            details: parts.details,
            status: parts.status,
            internal_notes: parts.internal_notes,
            created_at: parts.created_at,
            updated_at: parts.updated_at.max(parts.created_at),
            reviewed_at: parts.reviewed_at,
        }
    }

    pub fn id(&self) -> ApplicationId {
        self.id
    }

    pub fn details(&self) -> &ApplicationDetails {
        &self.details
    }

    pub fn full_name(&self) -> &str {
        &self.details.full_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.details.email
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn internal_notes(&self) -> Option<&str> {
        self.internal_notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// `mailto:` link the operator's mail client opens to contact the
    /// applicant. Nothing is sent by the server.
    ///
    /// # Examples
    /// ```rust,ignore
    /// assert_eq!(
    ///     record.mailto_link(),
    ///     "mailto:jane@example.com?subject=Your%20VETPAL%20volunteer%20application"
    /// );
    /// ```
    pub fn mailto_link(&self) -> String {
        let subject = format!("Your VETPAL {} application", self.details.role);
        let encoded: String = form_urlencoded::byte_serialize(subject.as_bytes()).collect();
        // byte_serialize escapes a literal '+', so any left over are spaces.
        format!(
            "mailto:{}?subject={}",
            self.details.email,
            encoded.replace('+', "%20")
        )
    }
}

impl Listable for ApplicationRecord {
    type Status = ApplicationStatus;

    fn list_status(&self) -> ApplicationStatus {
        self.status
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.details.full_name.as_str(),
            self.details.email.as_str(),
            self.details.role.as_str(),
        ];
        if let Some(position) = self.details.position.as_deref() {
            fields.push(position);
        }
        fields
    }
}
