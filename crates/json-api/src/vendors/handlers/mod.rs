//! Vendor Handlers

pub(crate) mod dishes;
pub(crate) mod get;
