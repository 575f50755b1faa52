mod export;
mod http;
mod locate;
mod prices;

use clap::{Parser, Subcommand};

use crate::cli::{export::ExportArgs, locate::LocateArgs, prices::PricesArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve an address into coordinates and its price area.
    #[clap(name = "locate")]
    Locate(LocateArgs),

    /// Fetch the day-ahead spot prices.
    #[clap(name = "prices")]
    Prices(PricesArgs),

    /// Export a simulation run with its summary.
    #[clap(name = "export")]
    Export(ExportArgs),
}
