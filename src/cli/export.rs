use std::{io, path::PathBuf};

use clap::Parser;

use crate::{
    core::{export::build_export, run::RecordedRun},
    prelude::*,
    tables::build_summary_table,
};

#[derive(Parser)]
pub struct ExportArgs {
    /// Simulation run as JSON with `timestamps`, `consumption`, `solar_generation`,
    /// `battery_soc`, `grid_power`, and `spot_price` arrays. Timestamps are RFC 3339,
    /// those without an offset are read as UTC.
    #[clap(long, env = "EXPORT_INPUT")]
    input: PathBuf,

    /// Where to write the export document.
    #[clap(long, env = "EXPORT_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the full document to stdout instead of the summary table.
    #[clap(long)]
    print: bool,
}

impl ExportArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let recorded = RecordedRun::read_from(&self.input)?;
        let document = build_export(&recorded.as_run(), self.output.as_deref())
            .with_context(|| format!("failed to export `{}`", self.input.display()))?;
        if self.print {
            document.to_writer_pretty(io::stdout().lock())?;
            println!();
        } else {
            println!("{}", build_summary_table(&document));
        }
        Ok(())
    }
}
