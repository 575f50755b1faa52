use std::{fs, path::Path};

use bon::Builder;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::prelude::*;

/// Shape violation of the parallel input series, detected before any computation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ShapeError {
    #[error("the simulation run has no timesteps")]
    Empty,

    #[error("`{series}` has {actual} values, but there are {expected} timestamps")]
    LengthMismatch { series: &'static str, expected: usize, actual: usize },

    #[error("`{series}` has a non-finite value at index {index}: {value}")]
    NonFinite { series: &'static str, index: usize, value: f64 },

    #[error("timestamp at index {index} precedes the previous one")]
    Unordered { index: usize },

    #[error("`{quantity}` overflows the floating-point range")]
    Overflow { quantity: &'static str },
}

/// Completed simulation run as six index-aligned series.
///
/// Index `i` in every series refers to the same timestep.
#[must_use]
#[derive(Copy, Clone, Builder)]
pub struct SimulationRun<'a> {
    pub timestamps: &'a [DateTime<FixedOffset>],

    /// Household consumption, kW.
    pub consumption: &'a [f64],

    /// Solar generation, kW.
    pub solar_generation: &'a [f64],

    /// Battery state of charge, percent.
    pub battery_soc: &'a [f64],

    /// Grid power, kW, positive when importing.
    pub grid_power: &'a [f64],

    /// Spot price per kilowatt-hour, may be negative.
    pub spot_price: &'a [f64],
}

impl SimulationRun<'_> {
    const fn numeric_series(&self) -> [(&'static str, &[f64]); 5] {
        [
            ("consumption", self.consumption),
            ("solar_generation", self.solar_generation),
            ("battery_soc", self.battery_soc),
            ("grid_power", self.grid_power),
            ("spot_price", self.spot_price),
        ]
    }

    /// Check the shape invariants and return the number of timesteps.
    pub fn validate(&self) -> Result<usize, ShapeError> {
        let n_points = self.timestamps.len();
        if n_points == 0 {
            return Err(ShapeError::Empty);
        }
        for (series, values) in self.numeric_series() {
            if values.len() != n_points {
                return Err(ShapeError::LengthMismatch {
                    series,
                    expected: n_points,
                    actual: values.len(),
                });
            }
        }
        for (series, values) in self.numeric_series() {
            if let Some((index, value)) =
                values.iter().copied().enumerate().find(|(_, value)| !value.is_finite())
            {
                return Err(ShapeError::NonFinite { series, index, value });
            }
        }
        if let Some(index) = self.timestamps.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ShapeError::Unordered { index: index + 1 });
        }
        Ok(n_points)
    }

    /// Net power drawn from (positive) or injected into (negative) the battery at each step.
    #[must_use]
    pub fn battery_power(&self) -> Vec<f64> {
        self.consumption
            .iter()
            .zip(self.grid_power)
            .zip(self.solar_generation)
            // Adding zero turns `-0.0` into `0.0` and keeps every other value intact.
            .map(|((consumption, grid), solar)| consumption - grid - solar + 0.0)
            .collect()
    }
}

/// Simulation run as read from a JSON file.
#[derive(Deserialize)]
pub struct RecordedRun {
    /// RFC 3339 timestamps. Those without an offset are taken as UTC.
    #[serde(deserialize_with = "deserialize_timestamps")]
    pub timestamps: Vec<DateTime<FixedOffset>>,
    pub consumption: Vec<f64>,
    pub solar_generation: Vec<f64>,
    pub battery_soc: Vec<f64>,
    pub grid_power: Vec<f64>,

    #[serde(alias = "spot_prices")]
    pub spot_price: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordedTimestamp {
    WithOffset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl From<RecordedTimestamp> for DateTime<FixedOffset> {
    fn from(timestamp: RecordedTimestamp) -> Self {
        match timestamp {
            RecordedTimestamp::WithOffset(timestamp) => timestamp,
            RecordedTimestamp::Naive(timestamp) => timestamp.and_utc().fixed_offset(),
        }
    }
}

fn deserialize_timestamps<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<DateTime<FixedOffset>>, D::Error> {
    let timestamps = Vec::<RecordedTimestamp>::deserialize(deserializer)?;
    Ok(timestamps.into_iter().map(Into::into).collect())
}

impl RecordedRun {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = fs::read(path)
            .with_context(|| format!("failed to read the simulation run from `{}`", path.display()))?;
        let run: Self = serde_json::from_slice(&contents)
            .with_context(|| format!("failed to parse the simulation run `{}`", path.display()))?;
        info!(n_timestamps = run.timestamps.len(), "loaded");
        Ok(run)
    }

    pub fn as_run(&self) -> SimulationRun<'_> {
        SimulationRun::builder()
            .timestamps(&self.timestamps)
            .consumption(&self.consumption)
            .solar_generation(&self.solar_generation)
            .battery_soc(&self.battery_soc)
            .grid_power(&self.grid_power)
            .spot_price(&self.spot_price)
            .build()
    }
}
