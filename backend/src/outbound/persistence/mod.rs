//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories here only translate between Diesel rows and domain records;
//! every rule lives in the domain services. Rows (`models.rs`) and table
//! definitions (`schema.rs`) never leave this module.
//!
//! ```ignore
//! use vetpal::outbound::persistence::{DbPool, DieselApplicationRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/vetpal")).await?;
//! let applications = DieselApplicationRepository::new(pool.clone());
//! ```

mod diesel_account_repository;
mod diesel_application_repository;
mod diesel_campaign_repository;
mod diesel_content_repository;
mod diesel_donation_repository;
mod diesel_error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_repository::DieselAccountRepository;
pub use diesel_application_repository::DieselApplicationRepository;
pub use diesel_campaign_repository::DieselCampaignRepository;
pub use diesel_content_repository::DieselContentRepository;
pub use diesel_donation_repository::DieselDonationRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
