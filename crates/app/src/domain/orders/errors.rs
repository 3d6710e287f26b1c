//! Orders service errors.

use std::num::TryFromIntError;

use dishpatch::{
    cart::{CartError, DishUuid, VendorUuid},
    schedule::ScheduleError,
    totals::TotalsError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::orders::records::UnknownOrderStatus;

/// Constraint guarding searchable order id uniqueness.
pub(crate) const SEARCHABLE_ORDER_ID_CONSTRAINT: &str = "orders_searchable_order_id_key";

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("order has no items")]
    EmptyOrder,

    #[error("vendor {0} not found")]
    UnknownVendor(VendorUuid),

    #[error("dish {0} is not on the vendor's menu")]
    UnknownDish(DishUuid),

    #[error("dish cannot be ordered: {0}")]
    DishNotOrderable(#[source] CartError),

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    InvalidCart(#[from] CartError),

    #[error(transparent)]
    Totals(#[from] TotalsError),

    #[error("could not assign a unique searchable order id after {attempts} attempts")]
    SearchableIdExhausted { attempts: u32 },

    #[error("amount out of range")]
    InvalidAmount(#[from] TryFromIntError),

    #[error("stored order is corrupt: {0}")]
    CorruptRecord(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<UnknownOrderStatus> for OrdersServiceError {
    fn from(error: UnknownOrderStatus) -> Self {
        Self::CorruptRecord(error.to_string())
    }
}

/// Whether `error` is a collision on the searchable order id.
pub(crate) fn is_searchable_id_conflict(error: &Error) -> bool {
    error.as_database_error().is_some_and(|error| {
        matches!(error.kind(), ErrorKind::UniqueViolation)
            && error.constraint() == Some(SEARCHABLE_ORDER_ID_CONSTRAINT)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            OrdersServiceError::from(Error::RowNotFound),
            OrdersServiceError::NotFound
        ));
    }

    #[test]
    fn non_database_errors_are_not_id_conflicts() {
        assert!(!is_searchable_id_conflict(&Error::RowNotFound));
        assert!(!is_searchable_id_conflict(&Error::PoolTimedOut));
    }
}
