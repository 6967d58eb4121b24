//! Diesel row structs and their translation to domain records.
//!
//! Rows are private to the persistence layer. Decoding is fallible: a value
//! outside the domain vocabulary (an unknown status, a negative amount) is
//! reported as a [`RowDecodeError`] instead of being coerced.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use url::Url;
use uuid::Uuid;

use crate::domain::{
    ApplicationDetails, ApplicationId, ApplicationParts, ApplicationRecord, ApplicationRole,
    ApplicationStatus, Cadence, CampaignId, CampaignParts, CampaignRecord, CampaignStatus,
    DonationId, DonationRecord, DonationStatus, DonorId, DonorRecord, EmailAddress, EventId,
    EventRecord, MinorUnits, NewsPostId, NewsPostRecord, Slug, VeteranStatus,
};

use super::schema::{accounts, applications, campaigns, donations, donors, events, news_posts};

/// A stored value the domain refuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table}.{column} holds an unreadable value: {value}")]
pub(crate) struct RowDecodeError {
    pub table: &'static str,
    pub column: &'static str,
    pub value: String,
}

impl RowDecodeError {
    fn new(table: &'static str, column: &'static str, value: impl ToString) -> Self {
        Self {
            table,
            column,
            value: value.to_string(),
        }
    }
}

fn parse_column<T: FromStr>(
    table: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<T, RowDecodeError> {
    raw.parse()
        .map_err(|_| RowDecodeError::new(table, column, raw))
}

fn amount_column(
    table: &'static str,
    column: &'static str,
    raw: i64,
) -> Result<MinorUnits, RowDecodeError> {
    MinorUnits::new(raw).ok_or_else(|| RowDecodeError::new(table, column, raw))
}

fn slug_column(table: &'static str, raw: String) -> Result<Slug, RowDecodeError> {
    Slug::new(raw.clone()).map_err(|_| RowDecodeError::new(table, "slug", raw))
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub profile_url: Option<String>,
    pub cover_note: Option<String>,
    pub role: String,
    pub position: Option<String>,
    pub veteran_status: Option<String>,
    pub willing_to_relocate: Option<bool>,
    pub desired_start_date: Option<NaiveDate>,
    pub status: String,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for ApplicationRecord {
    type Error = RowDecodeError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "applications";
        let profile_url = row
            .profile_url
            .map(|raw| Url::parse(&raw).map_err(|_| RowDecodeError::new(TABLE, "profile_url", raw)))
            .transpose()?;
        let veteran_status = row
            .veteran_status
            .as_deref()
            .map(|raw| parse_column::<VeteranStatus>(TABLE, "veteran_status", raw))
            .transpose()?;
        let details = ApplicationDetails {
            full_name: row.full_name,
            email: EmailAddress::from_trusted(row.email),
            phone: row.phone,
            location: row.location,
            profile_url,
            cover_note: row.cover_note,
            role: parse_column::<ApplicationRole>(TABLE, "role", &row.role)?,
            position: row.position,
            veteran_status,
            willing_to_relocate: row.willing_to_relocate,
            desired_start_date: row.desired_start_date,
        };
        Ok(ApplicationRecord::from_parts(ApplicationParts {
            id: ApplicationId::from_uuid(row.id),
            details,
            status: parse_column::<ApplicationStatus>(TABLE, "status", &row.status)?,
            internal_notes: row.internal_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
            reviewed_at: row.reviewed_at,
        }))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = applications)]
pub(crate) struct NewApplicationRow<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub location: &'a str,
    pub profile_url: Option<&'a str>,
    pub cover_note: Option<&'a str>,
    pub role: &'a str,
    pub position: Option<&'a str>,
    pub veteran_status: Option<&'a str>,
    pub willing_to_relocate: Option<bool>,
    pub desired_start_date: Option<NaiveDate>,
    pub status: &'a str,
    pub internal_notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a ApplicationRecord> for NewApplicationRow<'a> {
    fn from(record: &'a ApplicationRecord) -> Self {
        let details = record.details();
        Self {
            id: *record.id().as_uuid(),
            full_name: &details.full_name,
            email: details.email.as_str(),
            phone: &details.phone,
            location: &details.location,
            profile_url: details.profile_url.as_ref().map(Url::as_str),
            cover_note: details.cover_note.as_deref(),
            role: details.role.as_str(),
            position: details.position.as_deref(),
            veteran_status: details.veteran_status.map(VeteranStatus::as_str),
            willing_to_relocate: details.willing_to_relocate,
            desired_start_date: details.desired_start_date,
            status: record.status().as_str(),
            internal_notes: record.internal_notes(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
            reviewed_at: record.reviewed_at(),
        }
    }
}

/// Workflow columns written by a status transition. `None` notes clear the
/// column, so `treat_none_as_null` is required.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = applications)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ApplicationWorkflowUpdate<'a> {
    pub status: &'a str,
    pub internal_notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a ApplicationRecord> for ApplicationWorkflowUpdate<'a> {
    fn from(record: &'a ApplicationRecord) -> Self {
        Self {
            status: record.status().as_str(),
            internal_notes: record.internal_notes(),
            updated_at: record.updated_at(),
            reviewed_at: record.reviewed_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CampaignRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for CampaignRecord {
    type Error = RowDecodeError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "campaigns";
        Ok(CampaignRecord::from_parts(CampaignParts {
            id: CampaignId::from_uuid(row.id),
            title: row.title,
            slug: slug_column(TABLE, row.slug)?,
            description: row.description,
            goal_amount: amount_column(TABLE, "goal_amount", row.goal_amount)?,
            current_amount: amount_column(TABLE, "current_amount", row.current_amount)?,
            starts_on: row.starts_on,
            ends_on: row.ends_on,
            status: parse_column::<CampaignStatus>(TABLE, "status", &row.status)?,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaigns)]
pub(crate) struct NewCampaignRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: &'a str,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a CampaignRecord> for NewCampaignRow<'a> {
    fn from(record: &'a CampaignRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            title: &record.title,
            slug: record.slug.as_str(),
            description: record.description.as_deref(),
            goal_amount: record.goal_amount.get(),
            current_amount: record.current_amount().get(),
            starts_on: record.starts_on,
            ends_on: record.ends_on,
            status: record.status.as_str(),
            featured: record.featured,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Editable campaign columns. `current_amount` is deliberately absent: it
/// only moves through settled donations.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = campaigns)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CampaignUpdate<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub goal_amount: i64,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub status: &'a str,
    pub featured: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a CampaignRecord> for CampaignUpdate<'a> {
    fn from(record: &'a CampaignRecord) -> Self {
        Self {
            title: &record.title,
            slug: record.slug.as_str(),
            description: record.description.as_deref(),
            goal_amount: record.goal_amount.get(),
            starts_on: record.starts_on,
            ends_on: record.ends_on,
            status: record.status.as_str(),
            featured: record.featured,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Donors and donations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = donors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonorRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<DonorRow> for DonorRecord {
    fn from(row: DonorRow) -> Self {
        Self {
            id: DonorId::from_uuid(row.id),
            full_name: row.full_name,
            email: EmailAddress::from_trusted(row.email),
            created_at: row.created_at,
        }
    }
}

impl From<&DonorRecord> for DonorRow {
    fn from(record: &DonorRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            full_name: record.full_name.clone(),
            email: record.email.as_str().to_owned(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = donations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DonationRow {
    pub id: Uuid,
    pub amount: i64,
    pub donor_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub cadence: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DonationRow> for DonationRecord {
    type Error = RowDecodeError;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "donations";
        Ok(Self {
            id: DonationId::from_uuid(row.id),
            amount: amount_column(TABLE, "amount", row.amount)?,
            donor_id: DonorId::from_uuid(row.donor_id),
            campaign_id: row.campaign_id.map(CampaignId::from_uuid),
            cadence: parse_column::<Cadence>(TABLE, "cadence", &row.cadence)?,
            status: parse_column::<DonationStatus>(TABLE, "status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = donations)]
pub(crate) struct NewDonationRow<'a> {
    pub id: Uuid,
    pub amount: i64,
    pub donor_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub cadence: &'a str,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a DonationRecord> for NewDonationRow<'a> {
    fn from(record: &'a DonationRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            amount: record.amount.get(),
            donor_id: *record.donor_id.as_uuid(),
            campaign_id: record.campaign_id.map(Uuid::from),
            cadence: record.cadence.as_str(),
            status: record.status.as_str(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = RowDecodeError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            slug: slug_column("events", row.slug)?,
            summary: row.summary,
            location: row.location,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert and update share one shape. The changeset skips the primary key and
/// rewrites `created_at` with its unchanged value.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EventWrite<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
    pub summary: Option<&'a str>,
    pub location: Option<&'a str>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a EventRecord> for EventWrite<'a> {
    fn from(record: &'a EventRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            title: &record.title,
            slug: record.slug.as_str(),
            summary: record.summary.as_deref(),
            location: record.location.as_deref(),
            starts_at: record.starts_at,
            ends_at: record.ends_at,
            published: record.published,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = news_posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NewsPostRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NewsPostRow> for NewsPostRecord {
    type Error = RowDecodeError;

    fn try_from(row: NewsPostRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NewsPostId::from_uuid(row.id),
            title: row.title,
            slug: slug_column("news_posts", row.slug)?,
            excerpt: row.excerpt,
            body: row.body,
            published_at: row.published_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = news_posts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewsPostWrite<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
    pub excerpt: Option<&'a str>,
    pub body: &'a str,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a NewsPostRecord> for NewsPostWrite<'a> {
    fn from(record: &'a NewsPostRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            title: &record.title,
            slug: record.slug.as_str(),
            excerpt: record.excerpt.as_deref(),
            body: &record.body,
            published_at: record.published_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
}
