//! Volunteer, veteran and careers applications.
//!
//! Applicants submit an [`ApplicationSubmission`]; validation yields
//! [`ApplicationDetails`] which become an [`ApplicationRecord`] in state
//! `new`. Administrators then move the record through the workflow with
//! [`StatusTransition`]s.

mod record;
mod status;
mod submission;
mod workflow;

pub use record::{
    ApplicationDetails, ApplicationParts, ApplicationRecord, ApplicationRole, UnknownChoice,
    VeteranStatus,
};
pub use status::{ApplicationStatus, CmsStatus, PublicStatus, UnknownStatus};
pub use submission::{
    ApplicationSubmission, COVER_NOTE_MAX, FULL_NAME_MAX, FULL_NAME_MIN, LOCATION_MAX,
    LOCATION_MIN, POSITION_MAX,
};
pub use workflow::{NOTES_MAX, StatusTransition, TransitionError, TransitionPolicy};

use crate::domain::listing::ListFilter;

/// Back-office filter over applications.
pub type ApplicationFilter = ListFilter<ApplicationStatus>;

#[cfg(test)]
mod tests;
