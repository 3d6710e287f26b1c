//! Vendor Records

use dishpatch::{Dish, SpiceLevel};
use jiff::Timestamp;

pub use dishpatch::cart::{DishUuid, VendorUuid};

/// Vendor Record
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRecord {
    pub uuid: VendorUuid,
    pub store_name: String,
    pub delivery_fee: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Dish Record
///
/// A vendor's menu entry. Orders are priced and named from it, never from the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DishRecord {
    pub uuid: DishUuid,
    pub vendor: VendorUuid,
    pub name: String,

    /// Price of one portion in minor units
    pub unit_price: u64,

    /// Spice levels a customer may choose; empty when the dish has no options
    pub spice_levels: Vec<SpiceLevel>,

    pub available: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DishRecord {
    /// The menu entry as the cart understands it.
    #[must_use]
    pub fn to_dish(&self) -> Dish {
        Dish {
            uuid: self.uuid,
            name: self.name.clone(),
            unit_price: self.unit_price,
            spice_levels: self.spice_levels.iter().copied().collect(),
            available: self.available,
        }
    }
}
