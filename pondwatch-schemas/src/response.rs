use crate::{
    alert::{Alert, Recommendation},
    classification::{ClassificationResult, WaterQualityStatus, WqiClass},
    forecast::{ForecastFlag, Horizon, PredictedWqi},
    health::{SensorHealth, TrendReport},
    risk::{NightSafety, RecoveryEstimate, TimeToDanger},
    sensor::{Parameter, SensorSnapshot},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Warning,
    Critical,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Warning => "warning",
            Urgency::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStatus {
    pub wqi: f64,
    pub wqi_class: WqiClass,
    pub status: WaterQualityStatus,
    pub sensors: SensorSnapshot,
}

/// All confidences are on a 0-1 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub sensor: f64,
    pub classification: f64,
    pub forecast: BTreeMap<Horizon, f64>,
    pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub using_trained_model: bool,
    pub classification_model: String,
    pub forecast_models: BTreeMap<Horizon, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub pond_id: u32,
    pub current: CurrentStatus,
    pub classification: ClassificationResult,
    pub forecasts: BTreeMap<Horizon, SensorSnapshot>,
    pub predicted_wqi: BTreeMap<Horizon, PredictedWqi>,
    pub forecast_flags: Vec<ForecastFlag>,
    pub alerts: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    pub time_to_danger: Option<TimeToDanger>,
    pub night_safety: Option<NightSafety>,
    pub recovery: Option<RecoveryEstimate>,
    pub sensor_health: SensorHealth,
    pub trends: TrendReport,
    pub urgency: Urgency,
    pub critical_parameter: Option<Parameter>,
    pub confidence: ConfidenceReport,
    pub model_info: ModelInfo,
    pub using_trained_model: bool,
}

impl PredictionResponse {
    pub fn critical_alert_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_critical()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSummary {
    pub pond_count: usize,
    pub total_alerts: usize,
    pub critical_ponds: usize,
    pub average_wqi: f64,
    pub farm_status: FarmStatus,
    pub farm_message: String,
}

/// A pond whose request was rejected during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub pond_id: u32,
    pub error: String,
}

/// Batch results, most urgent pond first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<PredictionResponse>,
    pub failures: Vec<BatchFailure>,
    pub summary: FarmSummary,
}
