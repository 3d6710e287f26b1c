//! Orders
//!
//! Orders are created once from a checkout payload. The server re-derives everything it can
//! from its own records before persisting, and stamps each order with a searchable id.

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod search;
pub mod searchable_id;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
