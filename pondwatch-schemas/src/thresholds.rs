//! Three-tier threshold table (optimal, acceptable, critical) for each
//! parameter, tuned for whiteleg shrimp ponds.

use crate::sensor::Parameter;
use serde::{Deserialize, Serialize};

/// Where a value sits relative to a parameter's ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Optimal,
    Acceptable,
    /// Outside acceptable but not yet beyond a critical bound.
    Degraded,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub acceptable_min: f64,
    pub acceptable_max: f64,
    pub critical_min: f64,
    pub critical_max: f64,
}

impl ParameterRange {
    pub const fn new(optimal: (f64, f64), acceptable: (f64, f64), critical: (f64, f64)) -> Self {
        Self {
            optimal_min: optimal.0,
            optimal_max: optimal.1,
            acceptable_min: acceptable.0,
            acceptable_max: acceptable.1,
            critical_min: critical.0,
            critical_max: critical.1,
        }
    }

    pub fn is_critical_low(&self, value: f64) -> bool {
        value < self.critical_min
    }

    pub fn is_critical_high(&self, value: f64) -> bool {
        value > self.critical_max
    }

    pub fn is_critical(&self, value: f64) -> bool {
        self.is_critical_low(value) || self.is_critical_high(value)
    }

    pub fn is_acceptable(&self, value: f64) -> bool {
        value >= self.acceptable_min && value <= self.acceptable_max
    }

    pub fn is_optimal(&self, value: f64) -> bool {
        value >= self.optimal_min && value <= self.optimal_max
    }

    pub fn band(&self, value: f64) -> Band {
        if self.is_critical(value) {
            Band::Critical
        } else if !self.is_acceptable(value) {
            Band::Degraded
        } else if !self.is_optimal(value) {
            Band::Acceptable
        } else {
            Band::Optimal
        }
    }

    /// True when critical ⊇ acceptable ⊇ optimal and every bound is finite.
    pub fn is_nested(&self) -> bool {
        let bounds = [
            self.critical_min,
            self.acceptable_min,
            self.optimal_min,
            self.optimal_max,
            self.acceptable_max,
            self.critical_max,
        ];
        bounds.iter().all(|b| b.is_finite()) && bounds.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Threshold ranges for all seven parameters. Missing entries in a config
/// file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdTable {
    #[serde(rename = "pH")]
    pub ph: ParameterRange,
    #[serde(rename = "Temperature")]
    pub temperature: ParameterRange,
    #[serde(rename = "DO")]
    pub dissolved_oxygen: ParameterRange,
    #[serde(rename = "Salinity")]
    pub salinity: ParameterRange,
    #[serde(rename = "Ammonia")]
    pub ammonia: ParameterRange,
    #[serde(rename = "Nitrite")]
    pub nitrite: ParameterRange,
    #[serde(rename = "Turbidity")]
    pub turbidity: ParameterRange,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            ph: ParameterRange::new((7.5, 8.5), (7.0, 9.0), (6.5, 9.5)),
            temperature: ParameterRange::new((26.0, 30.0), (24.0, 32.0), (20.0, 35.0)),
            dissolved_oxygen: ParameterRange::new((5.0, 8.0), (4.0, 10.0), (3.5, 15.0)),
            salinity: ParameterRange::new((15.0, 25.0), (10.0, 30.0), (5.0, 40.0)),
            ammonia: ParameterRange::new((0.0, 0.05), (0.0, 0.1), (0.0, 0.5)),
            nitrite: ParameterRange::new((0.0, 0.25), (0.0, 0.5), (0.0, 1.0)),
            turbidity: ParameterRange::new((25.0, 40.0), (20.0, 50.0), (10.0, 80.0)),
        }
    }
}

impl ThresholdTable {
    pub fn range(&self, parameter: Parameter) -> &ParameterRange {
        match parameter {
            Parameter::Ph => &self.ph,
            Parameter::Temperature => &self.temperature,
            Parameter::DissolvedOxygen => &self.dissolved_oxygen,
            Parameter::Salinity => &self.salinity,
            Parameter::Ammonia => &self.ammonia,
            Parameter::Nitrite => &self.nitrite,
            Parameter::Turbidity => &self.turbidity,
        }
    }
}
