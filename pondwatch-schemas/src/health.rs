use crate::sensor::Parameter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorIssueKind {
    ImplausibleValue,
    SuddenChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorIssue {
    pub parameter: Parameter,
    pub kind: SensorIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorHealth {
    pub is_healthy: bool,
    /// 0-1; each issue lowers it.
    pub confidence: f64,
    pub issues: Vec<SensorIssue>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendQuality {
    Improving,
    Stable,
    Deteriorating,
    Changing,
    Unstable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallTrend {
    Improving,
    Stable,
    Deteriorating,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTrend {
    pub direction: TrendDirection,
    /// Least-squares slope per reading.
    pub rate: f64,
    pub quality: TrendQuality,
    pub current: f64,
    pub avg_recent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub overall: OverallTrend,
    pub parameters: BTreeMap<Parameter, ParameterTrend>,
    pub message: String,
}
