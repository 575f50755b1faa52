use chrono::{DateTime, FixedOffset};

use crate::{core::zone::Zone, quantity::rate::KilowattHourRate};

/// Number of hourly prices in a day-ahead series.
pub const N_HOURS: usize = 24;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PriceSeriesError {
    #[error("expected {expected} hourly prices, got {actual}")]
    UnexpectedCount { expected: usize, actual: usize },

    #[error("price at index {index} starts before the previous one")]
    Unordered { index: usize },
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HourlyPrice {
    /// Inclusive.
    pub start: DateTime<FixedOffset>,

    /// Exclusive.
    pub end: DateTime<FixedOffset>,

    pub rate: KilowattHourRate,
}

/// Complete day-ahead price series: exactly [`N_HOURS`] ascending hourly prices.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayAheadPrices(Vec<HourlyPrice>);

impl TryFrom<Vec<HourlyPrice>> for DayAheadPrices {
    type Error = PriceSeriesError;

    fn try_from(prices: Vec<HourlyPrice>) -> Result<Self, Self::Error> {
        if prices.len() != N_HOURS {
            return Err(PriceSeriesError::UnexpectedCount {
                expected: N_HOURS,
                actual: prices.len(),
            });
        }
        if let Some(index) = prices.windows(2).position(|pair| pair[1].start < pair[0].start) {
            return Err(PriceSeriesError::Unordered { index: index + 1 });
        }
        Ok(Self(prices))
    }
}

impl DayAheadPrices {
    /// Scale the rates by the zone's VAT multiplier.
    pub fn with_vat(mut self, zone: Zone) -> Self {
        let multiplier = zone.vat_multiplier();
        for price in &mut self.0 {
            price.rate = price.rate * multiplier;
        }
        self
    }

    #[must_use]
    pub fn as_slice(&self) -> &[HourlyPrice] {
        &self.0
    }

    pub fn mean_rate(&self) -> KilowattHourRate {
        #[expect(clippy::cast_precision_loss)]
        let n = self.0.len() as f64;
        self.0.iter().map(|price| price.rate).sum::<KilowattHourRate>() / n
    }
}
