//! Order and vendor services backed by `PostgreSQL`.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
