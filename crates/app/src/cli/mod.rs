use clap::{Parser, Subcommand};

mod db;
mod orders;
mod vendor;

#[derive(Debug, Parser)]
#[command(name = "dishpatch-app", about = "Dishpatch CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Vendor(vendor::VendorCommand),
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Vendor(command) => vendor::run(command).await,
            Commands::Orders(command) => orders::run(command).await,
        }
    }
}
