//! Application disposition and the legacy status vocabularies.
//!
//! [`ApplicationStatus`] is the only vocabulary stored or reasoned about.
//! Older screens spoke two other dialects: the public detail page used
//! `new/review/contacted/closed` and the back-office CMS used
//! `new/reviewing/interviewed/accepted/rejected`. They survive as
//! [`PublicStatus`] and [`CmsStatus`], which translate at the boundary and
//! never reach storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned for an unrecognised status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

/// Canonical application disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    Reviewing,
    Contacted,
    Interviewed,
    Accepted,
    Rejected,
    Closed,
}

impl ApplicationStatus {
    /// Every state, in workflow order.
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::Reviewing,
        Self::Contacted,
        Self::Interviewed,
        Self::Accepted,
        Self::Rejected,
        Self::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reviewing => "reviewing",
            Self::Contacted => "contacted",
            Self::Interviewed => "interviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }

    /// Conventional end states. Only protected under
    /// [`super::TransitionPolicy::LockTerminal`].
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Closed)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    /// Accepts canonical names plus the legacy `review` spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .or_else(|| (normalized == "review").then_some(Self::Reviewing))
            .ok_or_else(|| UnknownStatus(s.to_owned()))
    }
}

/// Vocabulary of the applicant-facing detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicStatus {
    New,
    Review,
    Contacted,
    Closed,
}

impl From<ApplicationStatus> for PublicStatus {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::New => Self::New,
            ApplicationStatus::Reviewing | ApplicationStatus::Interviewed => Self::Review,
            ApplicationStatus::Contacted => Self::Contacted,
            ApplicationStatus::Accepted
            | ApplicationStatus::Rejected
            | ApplicationStatus::Closed => Self::Closed,
        }
    }
}

impl From<PublicStatus> for ApplicationStatus {
    fn from(value: PublicStatus) -> Self {
        match value {
            PublicStatus::New => Self::New,
            PublicStatus::Review => Self::Reviewing,
            PublicStatus::Contacted => Self::Contacted,
            PublicStatus::Closed => Self::Closed,
        }
    }
}

/// Vocabulary of the old back-office CMS screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmsStatus {
    New,
    Reviewing,
    Interviewed,
    Accepted,
    Rejected,
}

impl From<ApplicationStatus> for CmsStatus {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::New => Self::New,
            ApplicationStatus::Reviewing | ApplicationStatus::Contacted => Self::Reviewing,
            ApplicationStatus::Interviewed => Self::Interviewed,
            ApplicationStatus::Accepted => Self::Accepted,
            ApplicationStatus::Rejected | ApplicationStatus::Closed => Self::Rejected,
        }
    }
}

impl From<CmsStatus> for ApplicationStatus {
    fn from(value: CmsStatus) -> Self {
        match value {
            CmsStatus::New => Self::New,
            CmsStatus::Reviewing => Self::Reviewing,
            CmsStatus::Interviewed => Self::Interviewed,
            CmsStatus::Accepted => Self::Accepted,
            CmsStatus::Rejected => Self::Rejected,
        }
    }
}
