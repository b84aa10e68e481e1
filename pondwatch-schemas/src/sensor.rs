//! Sensor readings as they arrive from a pond and as the core sees them after
//! normalisation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven water-quality parameters tracked for every pond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "pH")]
    Ph,
    Temperature,
    #[serde(rename = "DO")]
    DissolvedOxygen,
    Salinity,
    Ammonia,
    Nitrite,
    Turbidity,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::Ph,
        Parameter::Temperature,
        Parameter::DissolvedOxygen,
        Parameter::Salinity,
        Parameter::Ammonia,
        Parameter::Nitrite,
        Parameter::Turbidity,
    ];

    /// Parameters produced by the horizon forecasters. The rest carry over
    /// from the current snapshot.
    pub const FORECAST_TARGETS: [Parameter; 4] = [
        Parameter::Ph,
        Parameter::DissolvedOxygen,
        Parameter::Temperature,
        Parameter::Salinity,
    ];

    /// The key used in requests, responses and model artifacts.
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Temperature => "Temperature",
            Parameter::DissolvedOxygen => "DO",
            Parameter::Salinity => "Salinity",
            Parameter::Ammonia => "Ammonia",
            Parameter::Nitrite => "Nitrite",
            Parameter::Turbidity => "Turbidity",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH Level",
            Parameter::Temperature => "Temperature",
            Parameter::DissolvedOxygen => "Dissolved Oxygen",
            Parameter::Salinity => "Salinity",
            Parameter::Ammonia => "Ammonia",
            Parameter::Nitrite => "Nitrite",
            Parameter::Turbidity => "Turbidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Ph => "",
            Parameter::Temperature => "°C",
            Parameter::DissolvedOxygen | Parameter::Ammonia | Parameter::Nitrite => "mg/L",
            Parameter::Salinity => "ppt",
            Parameter::Turbidity => "cm",
        }
    }

    /// Resolves a feature name from a model artifact. Accepts both the
    /// dashboard keys and the column names of the training dataset.
    pub fn from_feature_name(name: &str) -> Option<Parameter> {
        match name.trim() {
            "pH" | "ph" => Some(Parameter::Ph),
            "Temperature" | "temperature" | "Temp" => Some(Parameter::Temperature),
            "DO" | "dissolved_oxygen" | "DO(mg/L)" => Some(Parameter::DissolvedOxygen),
            "Salinity" | "salinity" => Some(Parameter::Salinity),
            "Ammonia" | "ammonia" | "Ammonia (mg L-1 )" | "Ammonia (mg L-1)" => {
                Some(Parameter::Ammonia)
            }
            "Nitrite" | "nitrite" | "Nitrite (mg L-1 )" | "Nitrite (mg L-1)" => {
                Some(Parameter::Nitrite)
            }
            "Turbidity" | "turbidity" | "Turbidity (cm)" => Some(Parameter::Turbidity),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One pond's normalised readings at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
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

impl SensorSnapshot {
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

    /// Returns a copy with one parameter replaced.
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        match parameter {
            Parameter::Ph => self.ph = value,
            Parameter::Temperature => self.temperature = value,
            Parameter::DissolvedOxygen => self.dissolved_oxygen = value,
            Parameter::Salinity => self.salinity = value,
            Parameter::Ammonia => self.ammonia = value,
            Parameter::Nitrite => self.nitrite = value,
            Parameter::Turbidity => self.turbidity = value,
        }
        self
    }
}

/// A single raw value. Devices and dashboards send numbers, but some
/// gateways forward everything as strings. Anything else is kept as
/// received so the normalizer can reject it per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// A partial reading exactly as received. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "pH", alias = "ph", skip_serializing_if = "Option::is_none")]
    pub ph: Option<RawValue>,
    #[serde(
        rename = "Temperature",
        alias = "temperature",
        alias = "Temp",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<RawValue>,
    #[serde(rename = "DO", alias = "dissolved_oxygen", skip_serializing_if = "Option::is_none")]
    pub dissolved_oxygen: Option<RawValue>,
    #[serde(rename = "Salinity", alias = "salinity", skip_serializing_if = "Option::is_none")]
    pub salinity: Option<RawValue>,
    #[serde(rename = "Ammonia", alias = "ammonia", skip_serializing_if = "Option::is_none")]
    pub ammonia: Option<RawValue>,
    #[serde(rename = "Nitrite", alias = "nitrite", skip_serializing_if = "Option::is_none")]
    pub nitrite: Option<RawValue>,
    #[serde(rename = "Turbidity", alias = "turbidity", skip_serializing_if = "Option::is_none")]
    pub turbidity: Option<RawValue>,
}

impl SensorReading {
    pub fn get(&self, parameter: Parameter) -> Option<&RawValue> {
        match parameter {
            Parameter::Ph => self.ph.as_ref(),
            Parameter::Temperature => self.temperature.as_ref(),
            Parameter::DissolvedOxygen => self.dissolved_oxygen.as_ref(),
            Parameter::Salinity => self.salinity.as_ref(),
            Parameter::Ammonia => self.ammonia.as_ref(),
            Parameter::Nitrite => self.nitrite.as_ref(),
            Parameter::Turbidity => self.turbidity.as_ref(),
        }
    }

    pub fn set(&mut self, parameter: Parameter, value: impl Into<RawValue>) {
        let value = Some(value.into());
        match parameter {
            Parameter::Ph => self.ph = value,
            Parameter::Temperature => self.temperature = value,
            Parameter::DissolvedOxygen => self.dissolved_oxygen = value,
            Parameter::Salinity => self.salinity = value,
            Parameter::Ammonia => self.ammonia = value,
            Parameter::Nitrite => self.nitrite = value,
            Parameter::Turbidity => self.turbidity = value,
        }
    }
}

impl From<&SensorSnapshot> for SensorReading {
    fn from(snapshot: &SensorSnapshot) -> Self {
        let mut reading = SensorReading::default();
        for parameter in Parameter::ALL {
            reading.set(parameter, snapshot.get(parameter));
        }
        reading
    }
}

fn default_pond_id() -> u32 {
    1
}

/// The request body accepted by the prediction entry point.
///
/// `history` holds earlier readings for the same pond, oldest first. It is
/// optional; the core never stores readings between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default = "default_pond_id")]
    pub pond_id: u32,
    #[serde(flatten)]
    pub reading: SensorReading,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<SensorReading>,
}

impl PredictionRequest {
    pub fn new(pond_id: u32, reading: SensorReading) -> Self {
        Self {
            pond_id,
            reading,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<SensorReading>) -> Self {
        self.history = history;
        self
    }
}
