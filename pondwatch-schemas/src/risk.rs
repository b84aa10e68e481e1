use crate::sensor::Parameter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerType {
    AlreadyCritical,
    CriticalLow,
    CriticalHigh,
    OutOfRange,
}

/// How long until the pond becomes dangerous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeToDanger {
    pub is_safe: bool,
    pub hours_remaining: Option<u32>,
    pub critical_parameter: Option<Parameter>,
    pub status: RiskLevel,
    pub danger_type: Option<DangerType>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AeratorSetting {
    Normal,
    Moderate,
    High,
    Maximum,
}

impl AeratorSetting {
    pub fn label(&self) -> &'static str {
        match self {
            AeratorSetting::Normal => "normal",
            AeratorSetting::Moderate => "moderate",
            AeratorSetting::High => "high",
            AeratorSetting::Maximum => "maximum",
        }
    }
}

/// Overnight DO projection. Without photosynthesis DO falls through the
/// night and bottoms out before dawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSafety {
    pub current_do: f64,
    pub predicted_night_do: f64,
    pub is_night_safe: bool,
    pub safety_margin: f64,
    pub risk_level: RiskLevel,
    pub aerator_setting: AeratorSetting,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryBasis {
    ForecastTrend,
    ManagedIntervention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryEstimate {
    pub needs_recovery: bool,
    pub current_wqi: f64,
    pub target_wqi: f64,
    pub estimated_hours: Option<u32>,
    /// WQI points per hour used for the estimate.
    pub recovery_rate: Option<f64>,
    pub basis: Option<RecoveryBasis>,
    pub worst_parameter: Option<Parameter>,
    pub required_actions: Vec<String>,
    pub message: String,
}
