use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::coordinates::Coordinates;

/// Norwegian electricity price area.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    derive_more::Display,
    derive_more::FromStr,
)]
#[allow(clippy::upper_case_acronyms)]
pub enum Zone {
    /// Oslo, eastern Norway.
    #[value(name = "NO1")]
    NO1,

    /// Kristiansand, southern Norway.
    #[value(name = "NO2")]
    NO2,

    /// Trondheim, mid-Norway.
    #[value(name = "NO3")]
    NO3,

    /// Tromsø, northern Norway.
    #[value(name = "NO4")]
    NO4,

    /// Bergen, western Norway.
    #[value(name = "NO5")]
    NO5,
}

impl Zone {
    /// Northern Norway is exempt from VAT on electricity.
    pub const fn is_vat_exempt(self) -> bool {
        matches!(self, Self::NO4)
    }

    /// Multiplier that turns a spot price into the price including VAT.
    #[must_use]
    pub const fn vat_multiplier(self) -> f64 {
        if self.is_vat_exempt() { 1.0 } else { 1.25 }
    }

    /// Approximate the price area from the coordinates.
    ///
    /// The borders follow latitude and longitude lines, so places close to a real border
    /// may end up in the neighbouring area.
    pub fn from_coordinates(coordinates: Coordinates) -> Self {
        let Coordinates { latitude, longitude } = coordinates;
        if latitude >= 65.0 {
            Self::NO4
        } else if latitude >= 62.0 {
            Self::NO3
        } else if longitude < 7.5 && latitude >= 59.5 {
            Self::NO5
        } else if longitude < 9.0 {
            Self::NO2
        } else {
            Self::NO1
        }
    }
}
