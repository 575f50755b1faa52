//! [Hva koster strømmen](https://www.hvakosterstrommen.no/strompris-api) day-ahead price client.

use chrono::{DateTime, FixedOffset, NaiveDate};
use itertools::Itertools;
use serde::Deserialize;

use crate::{
    api::{Client, HttpConfig, PriceFeed, UpstreamError},
    core::{
        prices::{DayAheadPrices, HourlyPrice},
        zone::Zone,
    },
    prelude::*,
    quantity::rate::KilowattHourRate,
};

pub struct Api(Client);

impl Api {
    pub fn new(config: &HttpConfig) -> Self {
        Self(Client::new(config))
    }

    fn url(zone: Zone, on: NaiveDate) -> String {
        format!("https://www.hvakosterstrommen.no/api/v1/prices/{}_{zone}.json", on.format("%Y/%m-%d"))
    }
}

impl PriceFeed for Api {
    #[instrument(skip_all, fields(zone = %zone, on = %on))]
    fn get_prices(&self, zone: Zone, on: NaiveDate) -> Result<DayAheadPrices, UpstreamError> {
        info!("fetching…");
        let entries = match self.0.get(&Self::url(zone, on)).call() {
            Ok(mut response) => response.body_mut().read_json::<Vec<Entry>>()?,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(UpstreamError::NotPublished { zone, date: on });
            }
            Err(error) => return Err(error.into()),
        };
        info!(n_entries = entries.len(), "fetched");
        Ok(DayAheadPrices::try_from(entries.into_iter().map(HourlyPrice::from).collect_vec())?)
    }
}

#[derive(Deserialize)]
struct Entry {
    #[serde(rename = "NOK_per_kWh")]
    nok_per_kwh: f64,

    time_start: DateTime<FixedOffset>,
    time_end: DateTime<FixedOffset>,
}

impl From<Entry> for HourlyPrice {
    fn from(entry: Entry) -> Self {
        Self {
            start: entry.time_start,
            end: entry.time_end,
            rate: KilowattHourRate::from(entry.nok_per_kwh),
        }
    }
}
