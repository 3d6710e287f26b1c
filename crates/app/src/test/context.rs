//! Test context for service-level integration tests.

use dishpatch::TaxRate;

use crate::{
    database::Db,
    domain::{
        orders::{PgOrdersService, data::CheckoutPolicy},
        vendors::PgVendorsService,
    },
};

use super::db::TestDb;

/// Tax rate applied by the test checkout policy.
const TEST_TAX_RATE: f64 = 0.08;

pub(crate) struct TestContext {
    pub db: TestDb,
    pub orders: PgOrdersService,
    pub vendors: PgVendorsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let policy = CheckoutPolicy {
            tax_rate: TaxRate::from_fraction(TEST_TAX_RATE).expect("valid test tax rate"),
            ..CheckoutPolicy::default()
        };

        Self {
            orders: PgOrdersService::new(db.clone(), policy),
            vendors: PgVendorsService::new(db),
            db: test_db,
        }
    }
}
