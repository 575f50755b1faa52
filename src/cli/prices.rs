use chrono::{Local, NaiveDate};
use clap::{Args, Parser};

use crate::{
    api::{HttpConfig, LocationResolver, PriceFeed, geonorge, hvakosterstrommen},
    cli::http::HttpArgs,
    core::{coordinates::Coordinates, zone::Zone},
    prelude::*,
    tables::build_prices_table,
};

#[derive(Parser)]
pub struct PricesArgs {
    #[clap(flatten)]
    location: LocationArgs,

    /// Delivery date, defaults to today.
    #[clap(long, env = "PRICES_DATE")]
    date: Option<NaiveDate>,

    /// Include VAT where applicable.
    #[clap(long = "with-vat", env = "WITH_VAT")]
    with_vat: bool,

    #[clap(flatten)]
    http: HttpArgs,
}

#[derive(Args)]
#[group(required = true, multiple = true)]
struct LocationArgs {
    /// Price area.
    #[clap(long, env = "ZONE", conflicts_with_all = ["address", "latitude", "longitude"])]
    zone: Option<Zone>,

    /// Address to derive the price area from.
    #[clap(long, env = "ADDRESS", conflicts_with_all = ["latitude", "longitude"])]
    address: Option<String>,

    #[clap(long, requires = "longitude", allow_hyphen_values = true)]
    latitude: Option<f64>,

    #[clap(long, requires = "latitude", allow_hyphen_values = true)]
    longitude: Option<f64>,
}

enum Location {
    Zone(Zone),
    Coordinates(Coordinates),
}

impl LocationArgs {
    fn resolve(&self, config: &HttpConfig) -> Result<Location> {
        if let Some(zone) = self.zone {
            return Ok(Location::Zone(zone));
        }
        let coordinates = match (&self.address, self.latitude, self.longitude) {
            (Some(address), _, _) => geonorge::Api::new(config)
                .resolve(address)
                .with_context(|| format!("failed to locate `{address}`"))?,
            (None, Some(latitude), Some(longitude)) => Coordinates::new(latitude, longitude),
            _ => bail!("specify either a zone, an address, or coordinates"),
        };
        Ok(Location::Coordinates(coordinates))
    }
}

impl PricesArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let config = HttpConfig::from(&self.http);
        let on = self.date.unwrap_or_else(|| Local::now().date_naive());
        let feed = hvakosterstrommen::Api::new(&config);
        let (zone, prices) = match self.location.resolve(&config)? {
            Location::Zone(zone) => {
                let prices = feed
                    .prices_for_zone(zone, on, self.with_vat)
                    .with_context(|| format!("failed to fetch the prices for {zone} on {on}"))?;
                (zone, prices)
            }
            Location::Coordinates(coordinates) => feed
                .prices_for_coordinates(coordinates, on, self.with_vat)
                .with_context(|| format!("failed to fetch the prices at {coordinates} on {on}"))?,
        };
        info!(%zone, mean_rate = %prices.mean_rate(), "fetched");
        println!("{}", build_prices_table(zone, &prices));
        Ok(())
    }
}
