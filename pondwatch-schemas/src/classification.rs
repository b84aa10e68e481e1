use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower bounds of the WQI tiers. Both scales share them so that a score
/// always lands in matching tiers.
pub const WQI_EXCELLENT_MIN: f64 = 85.0;
pub const WQI_GOOD_MIN: f64 = 70.0;
pub const WQI_MEDIUM_MIN: f64 = 50.0;
pub const WQI_BAD_MIN: f64 = 25.0;

/// Ordinal water-quality class used by the classifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WqiClass {
    Good,
    Medium,
    Bad,
    #[serde(rename = "Very Bad")]
    VeryBad,
}

impl WqiClass {
    pub const ALL: [WqiClass; 4] = [WqiClass::Good, WqiClass::Medium, WqiClass::Bad, WqiClass::VeryBad];

    pub fn from_score(wqi: f64) -> Self {
        if wqi >= WQI_GOOD_MIN {
            WqiClass::Good
        } else if wqi >= WQI_MEDIUM_MIN {
            WqiClass::Medium
        } else if wqi >= WQI_BAD_MIN {
            WqiClass::Bad
        } else {
            WqiClass::VeryBad
        }
    }

    /// Class for the rule-based classifier: the number of parameters that
    /// sit outside their acceptable range.
    pub fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => WqiClass::Good,
            1 => WqiClass::Medium,
            2 => WqiClass::Bad,
            _ => WqiClass::VeryBad,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WqiClass::Good => "Good",
            WqiClass::Medium => "Medium",
            WqiClass::Bad => "Bad",
            WqiClass::VeryBad => "Very Bad",
        }
    }

    /// Parses the labels classifiers were trained on.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Good" | "good" => Some(WqiClass::Good),
            "Medium" | "medium" => Some(WqiClass::Medium),
            "Bad" | "bad" => Some(WqiClass::Bad),
            "Very Bad" | "very_bad" | "VeryBad" => Some(WqiClass::VeryBad),
            _ => None,
        }
    }
}

/// Five-tier pond status scale used for farmer-facing summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterQualityStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl WaterQualityStatus {
    pub fn from_score(wqi: f64) -> Self {
        if wqi >= WQI_EXCELLENT_MIN {
            WaterQualityStatus::Excellent
        } else if wqi >= WQI_GOOD_MIN {
            WaterQualityStatus::Good
        } else if wqi >= WQI_MEDIUM_MIN {
            WaterQualityStatus::Fair
        } else if wqi >= WQI_BAD_MIN {
            WaterQualityStatus::Poor
        } else {
            WaterQualityStatus::Critical
        }
    }
}

/// Which kind of model produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RuleBased,
    DriftFallback,
    Linear,
    TreeEnsemble,
    NeuralNet,
}

impl ModelKind {
    pub fn is_trained(&self) -> bool {
        !matches!(self, ModelKind::RuleBased | ModelKind::DriftFallback)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Projected WQI of the classified snapshot (0-100).
    pub wqi: f64,
    pub wqi_class: WqiClass,
    /// Max class probability for trained models, a fixed value for the
    /// rule-based path.
    pub confidence: f64,
    /// Artifact name, or `rule_based`.
    pub model: String,
    pub model_kind: ModelKind,
    pub probabilities: BTreeMap<WqiClass, f64>,
    pub using_trained_model: bool,
}
