//! Vendors
//!
//! The vendor record is the source of truth for store names and delivery fees.

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::VendorsServiceError;
pub use service::*;
