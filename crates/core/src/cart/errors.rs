//! Cart errors.

use std::io;

use thiserror::Error;

use crate::cart::{DishUuid, SpiceLevel, VendorUuid};

/// Errors raised by cart mutations and validation.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities added or removed must be at least one.
    #[error("quantity must be at least one")]
    ZeroQuantity,

    /// A quantity below zero was requested.
    #[error("quantity cannot be negative (got {0})")]
    NegativeQuantity(i64),

    /// The resulting quantity does not fit.
    #[error("quantity is too large")]
    QuantityOverflow,

    /// The chosen option is not offered for the dish.
    #[error("dish {dish} does not offer the {option} option")]
    InvalidOption {
        /// Dish the option was chosen for
        dish: DishUuid,

        /// Rejected option
        option: SpiceLevel,
    },

    /// The option name is not recognised.
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),

    /// The dish is not currently offered.
    #[error("dish {0} is unavailable")]
    DishUnavailable(DishUuid),

    /// No line item matches the vendor, dish and option.
    #[error("item not found in cart")]
    ItemNotFound,

    /// A vendor appears in more than one group.
    #[error("vendor {0} appears more than once")]
    DuplicateVendor(VendorUuid),

    /// A vendor group has no items.
    #[error("vendor {0} has no items")]
    EmptyGroup(VendorUuid),

    /// A dish and option pair appears twice in one group.
    #[error("dish {0} appears more than once with the same option")]
    DuplicateLineItem(DishUuid),
}

/// Errors raised while reading or writing the persisted cart.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("cart storage i/o failed: {0}")]
    Io(#[from] io::Error),

    /// The cart could not be encoded or decoded.
    #[error("cart could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by [`CartStore`](crate::cart::CartStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The mutation was rejected; the cart is unchanged.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The new cart could not be persisted; the cart is unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
