//! Searchable Order Ids
//!
//! Ids are the submission time in epoch milliseconds plus a random offset below one second.
//! Within a process they are strictly increasing; across processes the unique constraint on
//! `orders.searchable_order_id` catches collisions and the caller retries.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};

use jiff::Timestamp;
use rand::Rng;

/// Exclusive upper bound of the random offset, in milliseconds.
pub const RANDOM_OFFSET_MS: i64 = 1_000;

/// A timestamp-derived id candidate.
pub fn candidate<R: Rng + ?Sized>(at: Timestamp, rng: &mut R) -> i64 {
    at.as_millisecond()
        .saturating_add(rng.gen_range(0..RANDOM_OFFSET_MS))
}

/// Where an orders service takes searchable ids from.
pub trait SearchableIdSource: Send + Sync + fmt::Debug {
    /// An id for a new order submitted at `at`.
    fn next_id(&self, at: Timestamp) -> i64;

    /// An id for an existing order created at `created_at`.
    fn backfill_id(&self, created_at: Timestamp) -> i64;
}

/// Hands out increasing searchable ids.
#[derive(Debug, Default)]
pub struct SearchableIdGenerator {
    last: AtomicI64,
}

impl SearchableIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next id for an order submitted at `at`.
    pub fn next(&self, at: Timestamp) -> i64 {
        let candidate = candidate(at, &mut rand::thread_rng());

        let mut last = self.last.load(Ordering::Relaxed);

        loop {
            let next = candidate.max(last.saturating_add(1));

            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

impl SearchableIdSource for SearchableIdGenerator {
    fn next_id(&self, at: Timestamp) -> i64 {
        self.next(at)
    }

    fn backfill_id(&self, created_at: Timestamp) -> i64 {
        candidate(created_at, &mut rand::thread_rng())
    }
}
