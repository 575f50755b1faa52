use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::quantity::{
    Quantity,
    energy::KilowattHours,
    power::Kilowatts,
    rate::KilowattHourRate,
    ratio::Ratio,
};

/// Decimal places of every summary value.
const PRECISION: i32 = 2;

/// Summary statistics of a simulation run, rounded for presentation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_consumption: KilowattHours,
    pub total_solar_generation: KilowattHours,

    /// Peak grid import.
    pub max_grid_power: Kilowatts,

    pub average_spot_price: KilowattHourRate,

    /// Solar energy used on-site divided by solar energy generated.
    pub self_consumption_ratio: Ratio,
}

impl Summary {
    /// Compute the summary from hourly series of equal length.
    ///
    /// Each step is one hour long, so power sums numerically equal the energy.
    pub fn from_hourly(
        consumption: &[f64],
        solar_generation: &[f64],
        grid_power: &[f64],
        spot_prices: &[f64],
    ) -> Self {
        let step = TimeDelta::hours(1);
        let total_consumption = consumption.iter().copied().map(Kilowatts::from).sum::<Kilowatts>();
        let total_solar_generation =
            solar_generation.iter().copied().map(Kilowatts::from).sum::<Kilowatts>();
        let max_grid_power =
            grid_power.iter().copied().map(Kilowatts::from).max().unwrap_or(Quantity::ZERO);

        #[expect(clippy::cast_precision_loss)]
        let average_spot_price = if spot_prices.is_empty() {
            KilowattHourRate::ZERO
        } else {
            spot_prices.iter().copied().map(KilowattHourRate::from).sum::<KilowattHourRate>()
                / spot_prices.len() as f64
        };

        // Solar used on-site ignores the battery charging from solar.
        let solar_used = consumption
            .iter()
            .zip(solar_generation)
            .map(|(consumption, solar)| Kilowatts::from(consumption.min(*solar)))
            .sum::<Kilowatts>();
        let self_consumption_ratio = if total_solar_generation > Kilowatts::ZERO {
            Ratio::from(solar_used / total_solar_generation)
        } else {
            Ratio::ZERO
        };

        Self {
            total_consumption: (total_consumption * step).round_to(PRECISION),
            total_solar_generation: (total_solar_generation * step).round_to(PRECISION),
            max_grid_power: max_grid_power.round_to(PRECISION),
            average_spot_price: average_spot_price.round_to(PRECISION),
            self_consumption_ratio: self_consumption_ratio.round_to(PRECISION),
        }
    }
}

impl Summary {
    /// Name of the first value that is not finite, if any.
    pub const fn non_finite(&self) -> Option<&'static str> {
        if !self.total_consumption.is_finite() {
            Some("total_consumption")
        } else if !self.total_solar_generation.is_finite() {
            Some("total_solar_generation")
        } else if !self.max_grid_power.is_finite() {
            Some("max_grid_power")
        } else if !self.average_spot_price.is_finite() {
            Some("average_spot_price")
        } else if !self.self_consumption_ratio.is_finite() {
            Some("self_consumption_ratio")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hourly() {
        let summary = Summary::from_hourly(
            &[1.0, 1.0, 1.0],
            &[0.5, 0.0, 2.0],
            &[0.5, 1.0, -1.0],
            &[1.0, 1.2, 0.8],
        );
        assert_eq!(summary.total_consumption, KilowattHours::from(3.0));
        assert_eq!(summary.total_solar_generation, KilowattHours::from(2.5));
        assert_eq!(summary.max_grid_power, Kilowatts::from(1.0));
        assert_eq!(summary.average_spot_price, KilowattHourRate::from(1.0));
        assert_eq!(summary.self_consumption_ratio, Ratio::from(0.6));
    }

    #[test]
    fn test_no_solar() {
        let summary = Summary::from_hourly(&[1.0, 2.0], &[0.0, 0.0], &[1.0, 2.0], &[0.5, 0.5]);
        assert_eq!(summary.self_consumption_ratio, Ratio::ZERO);
        assert_eq!(summary.total_solar_generation, KilowattHours::ZERO);
    }

    #[test]
    fn test_max_grid_power_is_peak_import() {
        let summary = Summary::from_hourly(&[0.0; 3], &[0.0; 3], &[-5.0, 1.5, -0.5], &[0.0; 3]);
        assert_eq!(summary.max_grid_power, Kilowatts::from(1.5));
    }

    #[test]
    fn test_max_grid_power_when_always_exporting() {
        let summary = Summary::from_hourly(&[0.0; 2], &[3.0; 2], &[-2.0, -1.0], &[0.0; 2]);
        assert_eq!(summary.max_grid_power, Kilowatts::from(-1.0));
    }

    #[test]
    fn test_negative_prices() {
        let summary = Summary::from_hourly(&[0.0; 2], &[0.0; 2], &[0.0; 2], &[-0.3, -0.1]);
        assert_eq!(summary.average_spot_price, KilowattHourRate::from(-0.2));
    }

    #[test]
    fn test_self_consumption_ratio_bounds() {
        let consumption = [0.0, 0.3, 4.0, 1.2, 0.9];
        let solar_generation = [2.0, 0.0, 1.1, 5.0, 0.9];
        let summary =
            Summary::from_hourly(&consumption, &solar_generation, &[0.0; 5], &[0.0; 5]);
        assert!(summary.self_consumption_ratio >= Ratio::ZERO);
        assert!(summary.self_consumption_ratio <= Ratio::from(1.0));
    }

    #[test]
    fn test_rounding() {
        let summary = Summary::from_hourly(&[0.333, 0.333], &[0.0; 2], &[1.234_56], &[0.111]);
        assert_eq!(summary.total_consumption, KilowattHours::from(0.67));
        assert_eq!(summary.max_grid_power, Kilowatts::from(1.23));
        assert_eq!(summary.average_spot_price, KilowattHourRate::from(0.11));
    }

    #[test]
    fn test_non_finite() {
        let summary = Summary::from_hourly(&[f64::MAX, f64::MAX], &[0.0; 2], &[0.0; 2], &[0.0; 2]);
        assert_eq!(summary.non_finite(), Some("total_consumption"));
        let summary = Summary::from_hourly(&[1.0], &[1.0], &[0.0], &[0.5]);
        assert_eq!(summary.non_finite(), None);
    }

    #[test]
    fn test_empty() {
        let summary = Summary::from_hourly(&[], &[], &[], &[]);
        assert_eq!(summary.total_consumption, KilowattHours::ZERO);
        assert_eq!(summary.average_spot_price, KilowattHourRate::ZERO);
    }
}
