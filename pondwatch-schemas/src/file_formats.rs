//! On-disk formats of the exported model artifacts.
//!
//! The training pipeline exports one classifier and one regressor per
//! forecast horizon. Each file names the features it expects, in order, and
//! carries the fitted parameters of one of three model families.

use crate::sensor::Parameter;
use serde::{Deserialize, Serialize};

pub const CLASSIFIER_FILE: &str = "water_quality_cls_best.json";

pub fn forecaster_file_name(horizon_hours: u32) -> String {
    format!("ts_best_h{}.json", horizon_hours)
}

/// Standardisation fitted at training time: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Relu,
    Tanh,
    Logistic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Row-major, one row per output unit.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
    pub activation: Activation,
}

/// A node of a flattened decision tree. Children are indices into the
/// tree's node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

/// Fitted parameters of one model family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    /// `y = W x + b`, one row of `W` per output.
    Linear {
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Outputs are averaged over all trees.
    TreeEnsemble { trees: Vec<DecisionTree> },
    NeuralNet { layers: Vec<DenseLayer> },
}

/// How a classifier's raw outputs turn into probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierOutput {
    #[default]
    Probabilities,
    Logits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierFile {
    pub schema_version: String,
    pub name: String,
    /// Feature names in model input order.
    pub features: Vec<String>,
    /// Class labels in model output order.
    pub classes: Vec<String>,
    #[serde(default)]
    pub output: ClassifierOutput,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub model: ModelSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecasterFile {
    pub schema_version: String,
    pub name: String,
    pub horizon_hours: u32,
    /// Number of past readings in the input window.
    pub n_lags: usize,
    /// Per-reading feature names. The input vector is the window flattened
    /// oldest reading first.
    pub features: Vec<String>,
    /// Parameters in model output order.
    pub targets: Vec<Parameter>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// Validation score used as the base forecast confidence.
    #[serde(default)]
    pub confidence: Option<f64>,
    pub model: ModelSpec,
}
