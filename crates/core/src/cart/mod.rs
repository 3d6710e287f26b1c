//! Cart
//!
//! A cart is an ordered list of vendor groups. Each group carries the vendor's authoritative
//! delivery fee and the dishes ordered from that vendor, in the order they were added.

use std::{fmt, str::FromStr};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::ids::TypedUuid;

mod errors;
mod storage;
mod store;

pub use errors::{CartError, StorageError, StoreError};
pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage};
pub use store::{CartStore, SubscriptionId};

/// Vendor UUID
pub type VendorUuid = TypedUuid<VendorCartGroup>;

/// Dish UUID
pub type DishUuid = TypedUuid<Dish>;

/// Spice level a customer may pick for a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    /// Mild
    Mild,

    /// Medium
    Medium,

    /// Hot
    Hot,

    /// Extra hot
    ExtraHot,
}

impl SpiceLevel {
    /// Stable lowercase name, used for storage and the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
            SpiceLevel::ExtraHot => "extra_hot",
        }
    }
}

impl fmt::Display for SpiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpiceLevel {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(SpiceLevel::Mild),
            "medium" => Ok(SpiceLevel::Medium),
            "hot" => Ok(SpiceLevel::Hot),
            "extra_hot" => Ok(SpiceLevel::ExtraHot),
            other => Err(CartError::UnknownOption(other.to_string())),
        }
    }
}

/// A dish as listed on a vendor's menu.
#[derive(Debug, Clone, PartialEq)]
pub struct Dish {
    /// Dish identifier
    pub uuid: DishUuid,

    /// Display name
    pub name: String,

    /// Price of one portion, in minor units
    pub unit_price: u64,

    /// Spice levels the customer may choose from; empty when the dish has no options
    pub spice_levels: SmallVec<[SpiceLevel; 4]>,

    /// Whether the vendor currently offers the dish
    pub available: bool,
}

impl Dish {
    /// A cart line for `quantity` portions, priced and named from this menu entry.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: `quantity` is zero.
    /// - [`CartError::DishUnavailable`]: the vendor does not currently offer the dish.
    /// - [`CartError::InvalidOption`]: `option` is not one of the dish's spice levels.
    pub fn line_item(
        &self,
        quantity: u32,
        option: Option<SpiceLevel>,
    ) -> Result<CartLineItem, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if !self.available {
            return Err(CartError::DishUnavailable(self.uuid));
        }

        if let Some(level) = option
            && !self.spice_levels.contains(&level)
        {
            return Err(CartError::InvalidOption {
                dish: self.uuid,
                option: level,
            });
        }

        Ok(CartLineItem {
            dish: self.uuid,
            name: self.name.clone(),
            unit_price: self.unit_price,
            quantity,
            option,
        })
    }
}

/// The vendor details a cart group is created from.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRef {
    /// Vendor identifier
    pub uuid: VendorUuid,

    /// Store name shown to the customer
    pub store_name: String,

    /// Delivery fee in minor units, as read from the vendor record
    pub delivery_fee: u64,
}

/// A dish in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Dish identifier
    pub dish: DishUuid,

    /// Dish name at the time it was added
    pub name: String,

    /// Price of one portion, in minor units
    pub unit_price: u64,

    /// Number of portions, always at least one
    pub quantity: u32,

    /// Selected spice level
    pub option: Option<SpiceLevel>,
}

impl CartLineItem {
    fn matches(&self, dish: DishUuid, option: Option<SpiceLevel>) -> bool {
        self.dish == dish && self.option == option
    }
}

/// The items a customer is ordering from a single vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCartGroup {
    /// Vendor identifier
    pub vendor: VendorUuid,

    /// Store name
    pub store_name: String,

    /// Delivery fee in minor units
    pub delivery_fee: u64,

    /// Line items in display order
    pub items: Vec<CartLineItem>,
}

impl VendorCartGroup {
    /// Sum of quantities in this group.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    fn position(&self, dish: DishUuid, option: Option<SpiceLevel>) -> Option<usize> {
        self.items.iter().position(|item| item.matches(dish, option))
    }
}

/// Customer cart
///
/// Mutation is only possible through [`CartStore`], so a [`Cart`] handed out as a snapshot is
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredCart")]
pub struct Cart {
    groups: Vec<VendorCartGroup>,
}

#[derive(Deserialize)]
struct StoredCart {
    groups: Vec<VendorCartGroup>,
}

impl TryFrom<StoredCart> for Cart {
    type Error = CartError;

    fn try_from(stored: StoredCart) -> Result<Self, Self::Error> {
        Cart::from_groups(stored.groups)
    }
}

impl Cart {
    /// Build a cart from groups received from an untrusted source.
    ///
    /// # Errors
    ///
    /// - [`CartError::DuplicateVendor`]: the same vendor appears in two groups.
    /// - [`CartError::EmptyGroup`]: a group has no items.
    /// - [`CartError::ZeroQuantity`]: an item has a quantity of zero.
    /// - [`CartError::DuplicateLineItem`]: a dish and option pair appears twice in one group.
    pub fn from_groups(groups: Vec<VendorCartGroup>) -> Result<Self, CartError> {
        let mut vendors = FxHashSet::default();

        for group in &groups {
            if !vendors.insert(group.vendor) {
                return Err(CartError::DuplicateVendor(group.vendor));
            }

            if group.items.is_empty() {
                return Err(CartError::EmptyGroup(group.vendor));
            }

            let mut lines = FxHashSet::default();

            for item in &group.items {
                if item.quantity == 0 {
                    return Err(CartError::ZeroQuantity);
                }

                if !lines.insert((item.dish, item.option)) {
                    return Err(CartError::DuplicateLineItem(item.dish));
                }
            }
        }

        Ok(Self { groups })
    }

    /// Vendor groups in display order.
    pub fn groups(&self) -> &[VendorCartGroup] {
        &self.groups
    }

    /// The group for a vendor, if the cart holds any of its dishes.
    pub fn group(&self, vendor: VendorUuid) -> Option<&VendorCartGroup> {
        self.groups.iter().find(|group| group.vendor == vendor)
    }

    /// Total number of portions across every group.
    pub fn item_count(&self) -> u64 {
        self.groups.iter().map(VendorCartGroup::item_count).sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn add_item(
        &mut self,
        vendor: &VendorRef,
        dish: &Dish,
        quantity: u32,
        option: Option<SpiceLevel>,
    ) -> Result<(), CartError> {
        let line = dish.line_item(quantity, option)?;

        let group_index = match self.group_index(vendor.uuid) {
            Some(index) => index,
            None => {
                self.groups.push(VendorCartGroup {
                    vendor: vendor.uuid,
                    store_name: vendor.store_name.clone(),
                    delivery_fee: vendor.delivery_fee,
                    items: Vec::new(),
                });

                self.groups.len() - 1
            }
        };

        let group = self
            .groups
            .get_mut(group_index)
            .ok_or(CartError::ItemNotFound)?;

        match group
            .position(dish.uuid, option)
            .and_then(|index| group.items.get_mut(index))
        {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow)?;
            }
            None => group.items.push(line),
        }

        Ok(())
    }

    pub(crate) fn remove_item(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let current = self.line(vendor, dish, option)?.quantity;

        self.write_quantity(vendor, dish, option, current.saturating_sub(quantity))
    }

    pub(crate) fn delete_item(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
    ) -> Result<(), CartError> {
        self.line(vendor, dish, option)?;

        self.write_quantity(vendor, dish, option, 0)
    }

    pub(crate) fn set_quantity(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity < 0 {
            return Err(CartError::NegativeQuantity(quantity));
        }

        let quantity = u32::try_from(quantity).map_err(|_overflow| CartError::QuantityOverflow)?;

        self.line(vendor, dish, option)?;

        self.write_quantity(vendor, dish, option, quantity)
    }

    pub(crate) fn clear(&mut self) {
        self.groups.clear();
    }

    /// Take back the portions in `submitted`. Lines added or topped up since then keep the
    /// difference; lines the customer already removed are skipped.
    pub(crate) fn remove_submitted(
        &mut self,
        submitted: &[VendorCartGroup],
    ) -> Result<(), CartError> {
        for group in submitted {
            for item in &group.items {
                let Ok(current) = self.line(group.vendor, item.dish, item.option) else {
                    continue;
                };

                let remaining = current.quantity.saturating_sub(item.quantity);

                self.write_quantity(group.vendor, item.dish, item.option, remaining)?;
            }
        }

        Ok(())
    }

    fn group_index(&self, vendor: VendorUuid) -> Option<usize> {
        self.groups.iter().position(|group| group.vendor == vendor)
    }

    fn line(
        &self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
    ) -> Result<&CartLineItem, CartError> {
        self.group(vendor)
            .and_then(|group| group.items.iter().find(|item| item.matches(dish, option)))
            .ok_or(CartError::ItemNotFound)
    }

    /// Set a line's quantity, dropping the line at zero and the group once it is empty.
    fn write_quantity(
        &mut self,
        vendor: VendorUuid,
        dish: DishUuid,
        option: Option<SpiceLevel>,
        quantity: u32,
    ) -> Result<(), CartError> {
        let group_index = self.group_index(vendor).ok_or(CartError::ItemNotFound)?;

        let group = self
            .groups
            .get_mut(group_index)
            .ok_or(CartError::ItemNotFound)?;

        let item_index = group
            .position(dish, option)
            .ok_or(CartError::ItemNotFound)?;

        if quantity == 0 {
            group.items.remove(item_index);
        } else if let Some(item) = group.items.get_mut(item_index) {
            item.quantity = quantity;
        }

        if group.items.is_empty() {
            self.groups.remove(group_index);
        }

        Ok(())
    }
}
