//! Vendors Repositories

mod dishes;
mod vendors;

pub(crate) use dishes::{DishWrite, PgDishesRepository};
pub(crate) use vendors::PgVendorsRepository;
