use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Dimensionless ratio, normally `0..=1`.
pub type Ratio = Quantity<0, 0, 0>;

impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

impl Debug for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
