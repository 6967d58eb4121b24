//! Status transitions applied by administrators.
//!
//! A transition is an explicit action: it names the target state, may replace
//! the internal notes and may carry the `updated_at` the administrator last
//! saw. Applying one never mutates the input record; the caller receives a new
//! record to persist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::Error;
use crate::domain::validation::{FieldError, FieldErrorCode};

use super::{ApplicationRecord, ApplicationStatus};

/// Maximum length of administrator notes.
pub const NOTES_MAX: usize = 5000;

/// Which transitions are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any state may move to any state.
    #[default]
    Permissive,
    /// `accepted`, `rejected` and `closed` can only be re-applied, never left.
    LockTerminal,
}

impl TransitionPolicy {
    pub fn from_lock_flag(lock_terminal: bool) -> Self {
        if lock_terminal {
            Self::LockTerminal
        } else {
            Self::Permissive
        }
    }

    pub fn permits(self, from: ApplicationStatus, to: ApplicationStatus) -> bool {
        match self {
            Self::Permissive => true,
            Self::LockTerminal => !from.is_terminal() || from == to,
        }
    }
}

/// Requested change of disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub to: ApplicationStatus,
    /// `None` keeps the stored notes; `Some("")` clears them.
    pub notes: Option<String>,
    /// Optimistic check against the stored `updated_at`.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

impl StatusTransition {
    pub fn to(status: ApplicationStatus) -> Self {
        Self {
            to: status,
            notes: None,
            expected_updated_at: None,
        }
    }

    /// Attach notes, enforcing [`NOTES_MAX`].
    pub fn with_notes(mut self, notes: &str) -> Result<Self, FieldError> {
        let trimmed = notes.trim();
        if trimmed.chars().count() > NOTES_MAX {
            return Err(FieldError::new(
                "notes",
                FieldErrorCode::TooLong,
                format!("notes must be at most {NOTES_MAX} characters"),
            ));
        }
        self.notes = Some(trimmed.to_owned());
        Ok(self)
    }

    pub fn expecting(mut self, updated_at: DateTime<Utc>) -> Self {
        self.expected_updated_at = Some(updated_at);
        self
    }
}

/// Reasons a transition is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("status {from} is terminal and cannot change to {to}")]
    Locked {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application was modified at {actual}, expected {expected}")]
    Stale {
        expected: DateTime<Utc>,
        actual: DateTime<Utc>,
    },
}

impl From<TransitionError> for Error {
    fn from(value: TransitionError) -> Self {
        let details = match &value {
            TransitionError::Locked { from, to } => json!({
                "reason": "terminal_status",
                "from": from,
                "to": to,
            }),
            TransitionError::Stale { actual, .. } => json!({
                "reason": "stale",
                "updatedAt": actual,
            }),
        };
        Error::conflict(value.to_string()).with_details(details)
    }
}

impl ApplicationRecord {
    /// Apply `transition` at `now` under `policy`.
    ///
    /// On success the returned record has the new status, `updated_at` and
    /// `reviewed_at` set to `now` (never earlier than `created_at`), and the
    /// notes replaced when the transition carried any.
    pub fn transition(
        &self,
        transition: &StatusTransition,
        policy: TransitionPolicy,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, TransitionError> {
        match transition.expected_updated_at {
            Some(expected) if expected != self.updated_at => {
                return Err(TransitionError::Stale {
                    expected,
                    actual: self.updated_at,
                });
            }
            _ => {}
        }
        if !policy.permits(self.status, transition.to) {
            return Err(TransitionError::Locked {
                from: self.status,
                to: transition.to,
            });
        }

        let stamp = now.max(self.created_at);
        let mut next = self.clone();
        next.status = transition.to;
        next.updated_at = stamp;
        next.reviewed_at = Some(stamp);
        if let Some(notes) = &transition.notes {
            next.internal_notes = (!notes.is_empty()).then(|| notes.clone());
        }
        Ok(next)
    }
}
