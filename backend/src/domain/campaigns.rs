//! Fundraising campaigns and their progress.
//!
//! The running total only grows through [`CampaignRecord::record_contribution`],
//! which the donation service calls when a donation succeeds. Administrators
//! edit everything else through [`CampaignDraft`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    FieldError, FieldErrorCode, FieldErrors, optional_choice, optional_text, required_text,
};
use super::{CampaignId, MinorUnits, Slug};

pub const TITLE_MAX: usize = 160;
pub const DESCRIPTION_MAX: usize = 10_000;

/// Lifecycle of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

impl CampaignStatus {
    pub const NAMES: &'static [&'static str] = &["draft", "active", "completed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(other.to_owned()),
        }
    }
}

/// Basis points in one hundred percent.
const FULL_BASIS_POINTS: i64 = 10_000;

/// Progress towards a goal as a percentage with two decimals, capped at 100.
///
/// A zero goal reports no progress.
///
/// # Examples
/// ```
/// use vetpal::domain::{MinorUnits, progress_basis_points};
///
/// let goal = MinorUnits::new(10_000).unwrap();
/// assert_eq!(progress_basis_points(MinorUnits::new(2_500).unwrap(), goal), 2_500);
/// assert_eq!(progress_basis_points(MinorUnits::new(50_000).unwrap(), goal), 10_000);
/// ```
pub fn progress_basis_points(current: MinorUnits, goal: MinorUnits) -> i64 {
    if goal.get() == 0 {
        return 0;
    }
    let scaled = i128::from(current.get()) * i128::from(FULL_BASIS_POINTS) / i128::from(goal.get());
    scaled.min(i128::from(FULL_BASIS_POINTS)) as i64
}

/// Validated administrator input for creating or updating a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignDraft {
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub goal_amount: MinorUnits,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub featured: bool,
}

/// Untrusted campaign form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<i64>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: Option<String>,
    pub featured: Option<bool>,
}

impl CampaignForm {
    pub fn validate(&self) -> Result<CampaignDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = errors.check(required_text("title", self.title.as_deref(), 1, TITLE_MAX));
        let slug = errors.check(slug_field("slug", self.slug.as_deref()));
        let description = errors.check(optional_text(
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX,
        ));
        let goal_amount = errors.check(match self.goal_amount {
            None => Err(FieldError::required("goalAmount")),
            Some(cents) if cents <= 0 => Err(FieldError::new(
                "goalAmount",
                FieldErrorCode::OutOfRange,
                "goalAmount must be greater than zero",
            )),
            Some(cents) => MinorUnits::new(cents).ok_or_else(|| FieldError::required("goalAmount")),
        });
        let status = errors.check(optional_choice::<CampaignStatus>(
            "status",
            self.status.as_deref(),
            CampaignStatus::NAMES,
        ));
        if let (Some(starts), Some(ends)) = (self.starts_on, self.ends_on) {
            if ends < starts {
                errors.push(FieldError::new(
                    "endsOn",
                    FieldErrorCode::OutOfRange,
                    "endsOn must not be before startsOn",
                ));
            }
        }

        let (Some(title), Some(slug), Some(description), Some(goal_amount), Some(status)) =
            (title, slug, description, goal_amount, status)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(CampaignDraft {
            title,
            slug,
            description,
            goal_amount,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            status: status.unwrap_or_default(),
            featured: self.featured.unwrap_or(false),
        })
    }
}

/// Shared slug field check for admin forms.
pub(crate) fn slug_field(field: &str, raw: Option<&str>) -> Result<Slug, FieldError> {
    let value = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FieldError::required(field))?;
    Slug::new(value)
        .map_err(|err| FieldError::new(field, FieldErrorCode::InvalidFormat, err.to_string()))
}

/// Stored campaign.
///
/// ## Invariants
/// - `goal_amount > 0` for campaigns created through [`CampaignDraft`].
/// - `current_amount` never decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRecord {
    pub id: CampaignId,
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub goal_amount: MinorUnits,
    current_amount: MinorUnits,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored campaign fields, used by adapters to rebuild a record.
#[derive(Debug, Clone)]
pub struct CampaignParts {
    pub id: CampaignId,
    pub title: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub goal_amount: MinorUnits,
    pub current_amount: MinorUnits,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignRecord {
    pub fn create(id: CampaignId, draft: CampaignDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            goal_amount: draft.goal_amount,
            current_amount: MinorUnits::ZERO,
            starts_on: draft.starts_on,
            ends_on: draft.ends_on,
            status: draft.status,
            featured: draft.featured,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record read from storage, running total included.
    pub fn from_parts(parts: CampaignParts) -> Self {
        Self {
            id: parts.id,
            title: parts.title,
            slug: parts.slug,
            description: parts.description,
            goal_amount: parts.goal_amount,
            current_amount: parts.current_amount,
            starts_on: parts.starts_on,
            ends_on: parts.ends_on,
            status: parts.status,
            featured: parts.featured,
            created_at: parts.created_at,
            updated_at: parts.updated_at.max(parts.created_at),
        }
    }

    /// Apply an administrator edit. The running total is preserved.
    pub fn revise(&self, draft: CampaignDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            goal_amount: draft.goal_amount,
            starts_on: draft.starts_on,
            ends_on: draft.ends_on,
            status: draft.status,
            featured: draft.featured,
            updated_at: now.max(self.created_at),
            ..self.clone()
        }
    }

    pub fn current_amount(&self) -> MinorUnits {
        self.current_amount
    }

    /// Grow the running total by a succeeded donation.
    pub fn record_contribution(&mut self, amount: MinorUnits, now: DateTime<Utc>) {
        self.current_amount = self.current_amount.saturating_add(amount);
        self.updated_at = now.max(self.created_at);
    }

    /// See [`progress_basis_points`].
    pub fn progress_basis_points(&self) -> i64 {
        progress_basis_points(self.current_amount, self.goal_amount)
    }

    /// Progress as a percentage in `0.0..=100.0`.
    pub fn progress_percent(&self) -> f64 {
        self.progress_basis_points() as f64 / 100.0
    }

    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Public ordering: featured campaigns first, then newest.
pub fn public_campaigns(mut campaigns: Vec<CampaignRecord>) -> Vec<CampaignRecord> {
    campaigns.retain(CampaignRecord::is_active);
    campaigns.sort_by(|a, b| {
        b.featured
            .cmp(&a.featured)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    campaigns
}
