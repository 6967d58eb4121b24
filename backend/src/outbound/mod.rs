//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for development and tests
//! - **cache**: in-process collection cache
//!
//! Adapters only translate between domain types and storage representations.

pub mod cache;
pub mod memory;
pub mod persistence;
