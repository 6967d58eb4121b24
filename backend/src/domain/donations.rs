//! Donations, donors and the donation state machine.
//!
//! A donation starts `pending` when checkout is initiated. The payment
//! processor later settles it as `succeeded` or `failed`; a succeeded donation
//! may be `refunded`. No other move is legal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::listing::{ListFilter, Listable};
use super::validation::{
    self, FieldError, FieldErrorCode, FieldErrors, optional_choice, required_text,
};
use super::{CampaignId, DonationId, DonorId, EmailAddress, Error, MinorUnits, Slug};

/// Smallest accepted donation: one currency unit.
pub const MIN_DONATION: i64 = 100;
pub const DONOR_NAME_MAX: usize = 120;

/// Settlement state of a donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub const NAMES: &'static [&'static str] = &["pending", "succeeded", "failed", "refunded"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Succeeded)
                | (Self::Pending, Self::Failed)
                | (Self::Succeeded, Self::Refunded)
        )
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognised donation status or cadence names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown donation value: {0}")]
pub struct UnknownDonationValue(pub String);

impl FromStr for DonationStatus {
    type Err = UnknownDonationValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownDonationValue(other.to_owned())),
        }
    }
}

/// One-time gift or monthly recurring gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    #[default]
    OneTime,
    Monthly,
}

impl Cadence {
    pub const NAMES: &'static [&'static str] = &["one_time", "monthly"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Monthly => "monthly",
        }
    }

    pub fn is_recurring(self) -> bool {
        self == Self::Monthly
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = UnknownDonationValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one_time" => Ok(Self::OneTime),
            "monthly" => Ok(Self::Monthly),
            other => Err(UnknownDonationValue(other.to_owned())),
        }
    }
}

/// Refused donation status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("donation cannot move from {from} to {to}")]
pub struct DonationTransitionError {
    pub from: DonationStatus,
    pub to: DonationStatus,
}

impl From<DonationTransitionError> for Error {
    fn from(value: DonationTransitionError) -> Self {
        Error::conflict(value.to_string()).with_details(json!({
            "from": value.from,
            "to": value.to,
        }))
    }
}

/// Person who gave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorRecord {
    pub id: DonorId,
    pub full_name: String,
    pub email: EmailAddress,
    pub created_at: DateTime<Utc>,
}

/// Stored donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRecord {
    pub id: DonationId,
    pub amount: MinorUnits,
    pub donor_id: DonorId,
    pub campaign_id: Option<CampaignId>,
    pub cadence: Cadence,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DonationRecord {
    /// A donation awaiting settlement.
    pub fn pending(
        id: DonationId,
        donor_id: DonorId,
        intent: &CheckoutIntent,
        campaign_id: Option<CampaignId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            amount: intent.amount,
            donor_id,
            campaign_id,
            cadence: intent.cadence,
            status: DonationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Settle or refund. Returns the updated record.
    pub fn transition(
        &self,
        to: DonationStatus,
        now: DateTime<Utc>,
    ) -> Result<DonationRecord, DonationTransitionError> {
        if !self.status.can_become(to) {
            return Err(DonationTransitionError {
                from: self.status,
                to,
            });
        }
        Ok(Self {
            status: to,
            updated_at: now.max(self.created_at),
            ..self.clone()
        })
    }

    /// True when moving to `to` should credit the linked campaign.
    pub fn credits_campaign_on(&self, to: DonationStatus) -> bool {
        self.campaign_id.is_some()
            && self.status == DonationStatus::Pending
            && to == DonationStatus::Succeeded
    }
}

/// Donation joined with its donor, as shown in the back office.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationListing {
    pub donation: DonationRecord,
    pub donor: Option<DonorRecord>,
}

impl Listable for DonationListing {
    type Status = DonationStatus;

    fn list_status(&self) -> DonationStatus {
        self.donation.status
    }

    fn search_fields(&self) -> Vec<&str> {
        self.donor
            .as_ref()
            .map(|donor| vec![donor.full_name.as_str(), donor.email.as_str()])
            .unwrap_or_default()
    }
}

impl Listable for DonorRecord {
    type Status = ();

    fn list_status(&self) {}

    fn search_fields(&self) -> Vec<&str> {
        vec![self.full_name.as_str(), self.email.as_str()]
    }
}

/// Back-office filter over donations.
pub type DonationFilter = ListFilter<DonationStatus>;
/// Back-office search over donors.
pub type DonorFilter = ListFilter<()>;

/// Validated checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutIntent {
    pub amount: MinorUnits,
    pub cadence: Cadence,
    pub donor_name: String,
    pub donor_email: EmailAddress,
    pub campaign_slug: Option<Slug>,
}

/// Untrusted donation form payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub amount: Option<i64>,
    pub cadence: Option<String>,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub campaign_slug: Option<String>,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<CheckoutIntent, FieldErrors> {
        let mut errors = FieldErrors::new();
        let amount = errors.check(match self.amount {
            None => Err(FieldError::required("amount")),
            Some(cents) if cents < MIN_DONATION => Err(FieldError::new(
                "amount",
                FieldErrorCode::OutOfRange,
                format!("amount must be at least {MIN_DONATION} cents"),
            )),
            Some(cents) => MinorUnits::new(cents).ok_or_else(|| FieldError::required("amount")),
        });
        let cadence = errors.check(optional_choice::<Cadence>(
            "cadence",
            self.cadence.as_deref(),
            Cadence::NAMES,
        ));
        let donor_name = errors.check(required_text(
            "donorName",
            self.donor_name.as_deref(),
            2,
            DONOR_NAME_MAX,
        ));
        let donor_email = errors.check(validation::email("donorEmail", self.donor_email.as_deref()));
        let campaign_slug = errors.check(
            self.campaign_slug
                .as_deref()
                .map(str::trim)
                .filter(|raw| !raw.is_empty())
                .map(|raw| {
                    Slug::new(raw).map_err(|err| {
                        FieldError::new("campaignSlug", FieldErrorCode::InvalidFormat, err.to_string())
                    })
                })
                .transpose(),
        );

        let (Some(amount), Some(cadence), Some(donor_name), Some(donor_email), Some(campaign_slug)) =
            (amount, cadence, donor_name, donor_email, campaign_slug)
        else {
            return Err(errors);
        };
        Ok(CheckoutIntent {
            amount,
            cadence: cadence.unwrap_or_default(),
            donor_name,
            donor_email,
            campaign_slug,
        })
    }
}
