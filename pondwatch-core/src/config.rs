//! Tunable constants of the prediction pipeline.
//!
//! Every section has a default, so a config file only needs the values it
//! changes. `PredictorConfig::validate` runs once when a predictor is built;
//! a bad configuration is fatal there and never reaches a request.

use crate::error::PondwatchError;
use pondwatch_schemas::{
    sensor::{Parameter, SensorSnapshot},
    thresholds::ThresholdTable,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Values substituted for parameters missing from a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorDefaults {
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "DO")]
    pub dissolved_oxygen: f64,
    #[serde(rename = "Salinity")]
    pub salinity: f64,
    #[serde(rename = "Ammonia")]
    pub ammonia: f64,
    #[serde(rename = "Nitrite")]
    pub nitrite: f64,
    #[serde(rename = "Turbidity")]
    pub turbidity: f64,
}

impl Default for SensorDefaults {
    fn default() -> Self {
        Self {
            ph: 7.5,
            temperature: 28.0,
            dissolved_oxygen: 6.0,
            salinity: 20.0,
            ammonia: 0.05,
            nitrite: 0.1,
            turbidity: 30.0,
        }
    }
}

impl SensorDefaults {
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            ph: self.ph,
            temperature: self.temperature,
            dissolved_oxygen: self.dissolved_oxygen,
            salinity: self.salinity,
            ammonia: self.ammonia,
            nitrite: self.nitrite,
            turbidity: self.turbidity,
        }
    }

    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Temperature => self.temperature,
            Parameter::DissolvedOxygen => self.dissolved_oxygen,
            Parameter::Salinity => self.salinity,
            Parameter::Ammonia => self.ammonia,
            Parameter::Nitrite => self.nitrite,
            Parameter::Turbidity => self.turbidity,
        }
    }
}

/// WQI weights. Must be non-negative and sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WqiWeights {
    #[serde(rename = "DO")]
    pub dissolved_oxygen: f64,
    #[serde(rename = "pH")]
    pub ph: f64,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Ammonia")]
    pub ammonia: f64,
    #[serde(rename = "Nitrite")]
    pub nitrite: f64,
}

impl Default for WqiWeights {
    fn default() -> Self {
        Self {
            dissolved_oxygen: 0.35,
            ph: 0.20,
            temperature: 0.20,
            ammonia: 0.15,
            nitrite: 0.10,
        }
    }
}

impl WqiWeights {
    pub fn entries(&self) -> [(Parameter, f64); 5] {
        [
            (Parameter::DissolvedOxygen, self.dissolved_oxygen),
            (Parameter::Ph, self.ph),
            (Parameter::Temperature, self.temperature),
            (Parameter::Ammonia, self.ammonia),
            (Parameter::Nitrite, self.nitrite),
        ]
    }

    pub fn validate(&self) -> Result<(), PondwatchError> {
        if let Some((parameter, weight)) = self
            .entries()
            .into_iter()
            .find(|(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(PondwatchError::ConfigError(format!(
                "WQI weight for '{}' must be a non-negative number, got {}",
                parameter, weight
            )));
        }
        let sum: f64 = self.entries().iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PondwatchError::ConfigError(format!(
                "WQI weights must sum to 1.0, got {:.6}",
                sum
            )));
        }
        Ok(())
    }
}

/// Drift toward a baseline, per six-hour step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRule {
    pub baseline: f64,
    pub step: f64,
}

/// Rules of the fallback forecaster used when no trained regressor is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftSettings {
    #[serde(rename = "pH")]
    pub ph: DriftRule,
    #[serde(rename = "DO")]
    pub dissolved_oxygen: DriftRule,
    #[serde(rename = "Temperature")]
    pub temperature: DriftRule,
    #[serde(rename = "Salinity")]
    pub salinity: DriftRule,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            ph: DriftRule { baseline: 7.8, step: 0.05 },
            dissolved_oxygen: DriftRule { baseline: 6.5, step: 0.25 },
            temperature: DriftRule { baseline: 28.5, step: 0.25 },
            salinity: DriftRule { baseline: 20.0, step: 0.10 },
        }
    }
}

impl DriftSettings {
    /// Rule for a forecast target; `None` for parameters that carry over.
    pub fn rule(&self, parameter: Parameter) -> Option<&DriftRule> {
        match parameter {
            Parameter::Ph => Some(&self.ph),
            Parameter::DissolvedOxygen => Some(&self.dissolved_oxygen),
            Parameter::Temperature => Some(&self.temperature),
            Parameter::Salinity => Some(&self.salinity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub thresholds: ThresholdTable,
    pub wqi_weights: WqiWeights,
    pub defaults: SensorDefaults,
    pub drift: DriftSettings,
    /// Fraction of DO lost overnight to respiration.
    pub night_drop_fraction: f64,
    pub recovery_target_wqi: f64,
    /// WQI points per hour assumed under active management.
    pub managed_recovery_rate: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            wqi_weights: WqiWeights::default(),
            defaults: SensorDefaults::default(),
            drift: DriftSettings::default(),
            night_drop_fraction: 0.30,
            recovery_target_wqi: 75.0,
            managed_recovery_rate: 2.5,
        }
    }
}

impl PredictorConfig {
    pub fn validate(&self) -> Result<(), PondwatchError> {
        self.wqi_weights.validate()?;

        for parameter in Parameter::ALL {
            if !self.thresholds.range(parameter).is_nested() {
                return Err(PondwatchError::ConfigError(format!(
                    "Threshold ranges for '{}' must nest critical ⊇ acceptable ⊇ optimal",
                    parameter
                )));
            }
        }

        for parameter in Parameter::FORECAST_TARGETS {
            if let Some(rule) = self.drift.rule(parameter) {
                if !rule.baseline.is_finite() || !rule.step.is_finite() || rule.step < 0.0 {
                    return Err(PondwatchError::ConfigError(format!(
                        "Drift rule for '{}' needs a finite baseline and a non-negative step",
                        parameter
                    )));
                }
            }
        }

        if !(0.0..1.0).contains(&self.night_drop_fraction) {
            return Err(PondwatchError::ConfigError(format!(
                "night_drop_fraction must be in [0, 1), got {}",
                self.night_drop_fraction
            )));
        }
        if !(self.recovery_target_wqi > 0.0 && self.recovery_target_wqi <= 100.0) {
            return Err(PondwatchError::ConfigError(format!(
                "recovery_target_wqi must be in (0, 100], got {}",
                self.recovery_target_wqi
            )));
        }
        if !(self.managed_recovery_rate.is_finite() && self.managed_recovery_rate > 0.0) {
            return Err(PondwatchError::ConfigError(format!(
                "managed_recovery_rate must be positive, got {}",
                self.managed_recovery_rate
            )));
        }
        Ok(())
    }
}

/// Reads any YAML config document from disk.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, PondwatchError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| PondwatchError::FileIO(display.clone(), e))?;
    serde_yaml::from_str(&content).map_err(|e| PondwatchError::YamlParsing(display, e))
}
