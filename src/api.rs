mod client;
pub mod geonorge;
pub mod hvakosterstrommen;

use chrono::NaiveDate;

pub use self::client::{Client, HttpConfig};
use crate::core::{
    coordinates::Coordinates,
    prices::{DayAheadPrices, PriceSeriesError},
    zone::Zone,
};

/// Upstream service could not produce a usable result.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    #[error("the address is empty")]
    EmptyAddress,

    #[error("no matches found for address `{address}`")]
    NoMatches { address: String },

    #[error("could not extract coordinates for address `{address}`")]
    MissingCoordinates { address: String },

    #[error("prices for {zone} on {date} are not published yet")]
    NotPublished { zone: Zone, date: NaiveDate },

    #[error("unusable price series")]
    PriceSeries(#[from] PriceSeriesError),
}

/// Free-form address to coordinates.
pub trait LocationResolver {
    fn resolve(&self, address: &str) -> Result<Coordinates, UpstreamError>;
}

/// Day-ahead spot prices per price area.
pub trait PriceFeed {
    /// Get the spot prices excluding VAT.
    fn get_prices(&self, zone: Zone, on: NaiveDate) -> Result<DayAheadPrices, UpstreamError>;

    fn prices_for_zone(
        &self,
        zone: Zone,
        on: NaiveDate,
        apply_tax: bool,
    ) -> Result<DayAheadPrices, UpstreamError> {
        let prices = self.get_prices(zone, on)?;
        Ok(if apply_tax { prices.with_vat(zone) } else { prices })
    }

    fn prices_for_coordinates(
        &self,
        coordinates: Coordinates,
        on: NaiveDate,
        apply_tax: bool,
    ) -> Result<(Zone, DayAheadPrices), UpstreamError> {
        let zone = Zone::from_coordinates(coordinates);
        Ok((zone, self.prices_for_zone(zone, on, apply_tax)?))
    }
}
