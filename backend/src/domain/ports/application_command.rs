//! Driving port for application intake and the status workflow.
//!
//! The HTTP adapter hands raw submissions and transition requests to this
//! port; validation, persistence and cache invalidation live behind it.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, ApplicationSubmission, Error,
    StatusTransition,
};

/// Path the public site shows once an application is stored.
pub const THANK_YOU_PATH: &str = "/apply/thank-you";

/// Acknowledgement returned to the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub redirect_to: String,
}

impl SubmissionReceipt {
    /// Receipt for a freshly stored application.
    pub fn for_new(id: ApplicationId) -> Self {
        Self {
            id,
            status: ApplicationStatus::New,
            redirect_to: THANK_YOU_PATH.to_owned(),
        }
    }
}

/// Domain use-case port for mutating applications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationCommand: Send + Sync {
    /// Validate and store a new application.
    async fn submit(&self, submission: ApplicationSubmission)
    -> Result<SubmissionReceipt, Error>;

    /// Move an application to another status and return the stored result.
    async fn transition(
        &self,
        id: &ApplicationId,
        transition: StatusTransition,
    ) -> Result<ApplicationRecord, Error>;
}

/// Fixture command that validates input but stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureApplicationCommand;

#[async_trait]
impl ApplicationCommand for FixtureApplicationCommand {
    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<SubmissionReceipt, Error> {
        submission.validate()?;
        Ok(SubmissionReceipt::for_new(ApplicationId::random()))
    }

    async fn transition(
        &self,
        id: &ApplicationId,
        _transition: StatusTransition,
    ) -> Result<ApplicationRecord, Error> {
        Err(Error::not_found(format!("application {id} not found")))
    }
}
