//! Dishpatch Domain Concerns

pub mod orders;
pub mod vendors;
