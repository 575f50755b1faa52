use clap::Parser;

use crate::{
    api::{HttpConfig, LocationResolver, geonorge},
    cli::http::HttpArgs,
    core::zone::Zone,
    prelude::*,
};

#[derive(Parser)]
pub struct LocateArgs {
    /// Norwegian address, for example: `Karl Johans gate 1, Oslo`.
    address: String,

    #[clap(flatten)]
    http: HttpArgs,
}

impl LocateArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let coordinates = geonorge::Api::new(&HttpConfig::from(&self.http))
            .resolve(&self.address)
            .with_context(|| format!("failed to locate `{}`", self.address))?;
        let zone = Zone::from_coordinates(coordinates);
        info!(%coordinates, %zone, "located");
        println!("{coordinates} ({zone})");
        Ok(())
    }
}
