use clap::{Args, Subcommand};

mod backfill;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Assign searchable ids to orders created before they existed
    BackfillSearchableIds(backfill::BackfillArgs),
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::BackfillSearchableIds(args) => backfill::run(args).await,
    }
}
