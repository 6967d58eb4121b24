//! HTTP inbound adapter exposing REST endpoints.

pub mod applications;
pub mod campaigns;
pub mod content;
pub mod csv_response;
pub mod donations;
pub mod error;
pub mod guard;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
