use clap::Args;
use dishpatch_app::{
    database::{self, Db},
    domain::orders::{OrdersService, PgOrdersService, data::CheckoutPolicy},
};

#[derive(Debug, Args)]
pub(crate) struct BackfillArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: BackfillArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    // The checkout policy plays no part in backfilling.
    let service = PgOrdersService::new(Db::new(pool), CheckoutPolicy::default());

    let report = service
        .backfill_searchable_ids()
        .await
        .map_err(|error| format!("failed to backfill searchable order ids: {error}"))?;

    println!("assigned: {}", report.assigned);
    println!("retries: {}", report.retries);

    Ok(())
}
