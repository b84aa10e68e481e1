use crate::{forecast::Horizon, sensor::Parameter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// Field action attached to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    ActivateAerator,
    IncreaseAeration,
    AddLime,
    WaterExchange,
    EmergencyCooling,
    ReduceFeeding,
    AddSalt,
    AdjustSalinity,
    ManageTurbidity,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub parameter: Parameter,
    pub message: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub action: AlertAction,
    /// Set for predictive alerts; `None` means the condition holds now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
}

impl Alert {
    pub fn is_critical(&self) -> bool {
        self.level == AlertLevel::Critical
    }

    pub fn is_predictive(&self) -> bool {
        self.horizon.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Info,
    Warning,
    Action,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    pub fn new(kind: RecommendationType, title: &str, description: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}
