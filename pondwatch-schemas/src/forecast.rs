use crate::{
    classification::{ModelKind, WqiClass},
    sensor::{Parameter, SensorSnapshot},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Forecast horizons. The derived ordering is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::H6, Horizon::H12, Horizon::H24];

    pub fn hours(&self) -> u32 {
        match self {
            Horizon::H6 => 6,
            Horizon::H12 => 12,
            Horizon::H24 => 24,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::H6 => "6h",
            Horizon::H12 => "12h",
            Horizon::H24 => "24h",
        }
    }

    pub fn from_hours(hours: u32) -> Option<Self> {
        Horizon::ALL.into_iter().find(|h| h.hours() == hours)
    }

    /// Confidence multiplier; further horizons are trusted less.
    pub fn confidence_decay(&self) -> f64 {
        match self {
            Horizon::H6 => 1.0,
            Horizon::H12 => 0.95,
            Horizon::H24 => 0.90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    pub snapshot: SensorSnapshot,
    pub confidence: f64,
    pub model: String,
    pub model_kind: ModelKind,
}

/// Forecasts keyed by horizon, always iterated 6h, 12h, 24h.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet(BTreeMap<Horizon, HorizonForecast>);

impl ForecastSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, horizon: Horizon, forecast: HorizonForecast) {
        self.0.insert(horizon, forecast);
    }

    pub fn get(&self, horizon: Horizon) -> Option<&HorizonForecast> {
        self.0.get(&horizon)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &HorizonForecast)> {
        self.0.iter().map(|(h, f)| (*h, f))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        Horizon::ALL.iter().all(|h| self.0.contains_key(h))
    }
}

impl FromIterator<(Horizon, HorizonForecast)> for ForecastSet {
    fn from_iter<I: IntoIterator<Item = (Horizon, HorizonForecast)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedWqi {
    pub value: f64,
    pub class: WqiClass,
}

/// A forecast value outside physical bounds. Forecasts are never clamped;
/// they are flagged instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastFlag {
    pub horizon: Horizon,
    pub parameter: Parameter,
    pub value: f64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_map_serializes_in_order() {
        let mut map = BTreeMap::new();
        map.insert(Horizon::H24, 3);
        map.insert(Horizon::H6, 1);
        map.insert(Horizon::H12, 2);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"6h":1,"12h":2,"24h":3}"#);
    }

    #[test]
    fn hours_round_trip() {
        for horizon in Horizon::ALL {
            assert_eq!(Horizon::from_hours(horizon.hours()), Some(horizon));
        }
        assert_eq!(Horizon::from_hours(48), None);
    }
}
