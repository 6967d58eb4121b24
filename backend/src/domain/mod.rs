//! Domain primitives, aggregates and services.
//!
//! Purpose: hold every rule of the VETPAL back office independently of HTTP
//! and storage. Entities validate their own input, the application workflow
//! and donation state machine live next to their records, and the services at
//! the bottom of this module implement the driving ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Applications, campaigns, donations, content: records, forms, filters.
//! - Access: subject, resource, policy and login redirect decisions.
//! - Services: `ApplicationService`, `CampaignService`, `DonationService`,
//!   `ContentService`, `AccountLoginService`.

pub mod access;
pub mod applications;
pub mod auth;
pub mod campaigns;
pub mod collections;
pub mod content;
pub mod csv_export;
pub mod donations;
pub mod error;
pub mod ids;
pub mod listing;
pub mod money;
pub mod ports;
pub mod slug;
pub mod trace_id;
pub mod user;
pub mod validation;

mod account_login_service;
mod application_service;
mod campaign_service;
mod content_service;
mod donation_service;

#[cfg(feature = "legacy-admin-token")]
pub use self::access::LegacyAdminToken;
pub use self::access::{
    AccessDecision, AccessPolicy, DEFAULT_RETURN_PATH, LOGIN_PATH, Resource, ReturnPath,
    RoleAccessPolicy, Subject, decide,
};
pub use self::account_login_service::AccountLoginService;
pub use self::application_service::ApplicationService;
pub use self::applications::{
    ApplicationDetails, ApplicationFilter, ApplicationParts, ApplicationRecord, ApplicationRole,
    ApplicationStatus, ApplicationSubmission, CmsStatus, PublicStatus, StatusTransition,
    TransitionError, TransitionPolicy, UnknownChoice, UnknownStatus, VeteranStatus,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::campaign_service::CampaignService;
pub use self::campaigns::{
    CampaignDraft, CampaignForm, CampaignParts, CampaignRecord, CampaignStatus,
    progress_basis_points, public_campaigns,
};
pub use self::collections::CollectionCaches;
pub use self::content::{
    EventDraft, EventForm, EventRecord, NewsPostDraft, NewsPostForm, NewsPostRecord,
    public_events, public_news,
};
pub use self::content_service::ContentService;
pub use self::csv_export::{CsvExportError, ExportKind};
pub use self::donation_service::{CLIENT_REFERENCE_PARAM, CheckoutLinks, DonationService};
pub use self::donations::{
    Cadence, CheckoutForm, CheckoutIntent, DonationFilter, DonationListing, DonationRecord,
    DonationStatus, DonationTransitionError, DonorFilter, DonorRecord, MIN_DONATION,
    UnknownDonationValue,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{
    ApplicationId, CampaignId, DonationId, DonorId, EventId, NewsPostId, RecordIdError,
};
pub use self::listing::{ListFilter, Listable, Listing, SearchText, StatusFilter};
pub use self::money::MinorUnits;
pub use self::slug::{Slug, SlugError};
pub use self::trace_id::TraceId;
pub use self::user::{Role, UserId, UserValidationError};
pub use self::validation::{EmailAddress, FieldError, FieldErrorCode, FieldErrors};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use vetpal::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
