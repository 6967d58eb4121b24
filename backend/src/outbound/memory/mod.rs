//! In-process adapters used when no database URL is configured.
//!
//! State lives for the life of the process. These stores honour the same
//! contracts as the Postgres adapters (slug uniqueness, stale-write checks,
//! compare-and-set settlement) so services behave identically on either.

mod applications;
mod content;
mod fundraising;

pub use applications::MemoryApplicationRepository;
pub use content::MemoryContentRepository;
pub use fundraising::{MemoryCampaignRepository, MemoryDonationRepository};
