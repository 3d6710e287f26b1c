//! Vendors Data

use dishpatch::SpiceLevel;

use crate::domain::vendors::records::{DishUuid, VendorUuid};

/// New or updated vendor details
#[derive(Debug, Clone, PartialEq)]
pub struct VendorUpsert {
    pub uuid: VendorUuid,
    pub store_name: String,
    pub delivery_fee: u64,
}

/// New or updated menu entry
#[derive(Debug, Clone, PartialEq)]
pub struct DishUpsert {
    pub uuid: DishUuid,
    pub vendor: VendorUuid,
    pub name: String,
    pub unit_price: u64,
    pub spice_levels: Vec<SpiceLevel>,
    pub available: bool,
}
