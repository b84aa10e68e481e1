//! Inference over exported model artifacts.
//!
//! Every model family sits behind `ModelAdapter`. Shapes are checked once
//! when an artifact is loaded, so a `LoadedModel` only fails at inference
//! time when a caller passes the wrong number of features.

pub mod linear;
pub mod neural;
pub mod registry;
pub mod tree;

use crate::error::PondwatchError;
use pondwatch_schemas::{
    classification::ModelKind,
    file_formats::{ModelSpec, StandardScaler},
};

pub use linear::LinearModel;
pub use neural::NeuralNetModel;
pub use registry::{ClassifierModel, FeatureSource, ForecasterModel, ModelRegistry};
pub use tree::TreeEnsembleModel;

pub trait ModelAdapter: Send + Sync {
    fn kind(&self) -> ModelKind;
    fn input_len(&self) -> usize;
    fn output_len(&self) -> usize;
    /// Runs the model on an already scaled feature vector.
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PondwatchError>;
}

/// Builds the adapter for a model spec and checks it accepts `input_len`
/// features.
pub fn from_spec(name: &str, spec: &ModelSpec, input_len: usize) -> Result<Box<dyn ModelAdapter>, PondwatchError> {
    let adapter: Box<dyn ModelAdapter> = match spec {
        ModelSpec::Linear {
            coefficients,
            intercepts,
        } => Box::new(LinearModel::new(name, coefficients.clone(), intercepts.clone())?),
        ModelSpec::TreeEnsemble { trees } => Box::new(TreeEnsembleModel::new(name, trees.clone(), input_len)?),
        ModelSpec::NeuralNet { layers } => Box::new(NeuralNetModel::new(name, layers.clone())?),
    };

    if adapter.input_len() != input_len {
        return Err(PondwatchError::ModelShape {
            model: name.to_string(),
            expected: input_len,
            actual: adapter.input_len(),
        });
    }
    Ok(adapter)
}

/// An adapter together with its name and optional input scaler.
pub struct LoadedModel {
    name: String,
    scaler: Option<StandardScaler>,
    adapter: Box<dyn ModelAdapter>,
}

impl LoadedModel {
    pub fn new(
        name: &str,
        spec: &ModelSpec,
        scaler: Option<StandardScaler>,
        input_len: usize,
    ) -> Result<Self, PondwatchError> {
        if let Some(scaler) = &scaler {
            for actual in [scaler.mean.len(), scaler.scale.len()] {
                if actual != input_len {
                    return Err(PondwatchError::ModelShape {
                        model: name.to_string(),
                        expected: input_len,
                        actual,
                    });
                }
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err(PondwatchError::ModelUnavailable(
                    name.to_string(),
                    "scaler has a zero or non-finite scale".to_string(),
                ));
            }
        }

        Ok(Self {
            name: name.to_string(),
            scaler,
            adapter: from_spec(name, spec, input_len)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModelKind {
        self.adapter.kind()
    }

    pub fn input_len(&self) -> usize {
        self.adapter.input_len()
    }

    pub fn output_len(&self) -> usize {
        self.adapter.output_len()
    }

    pub fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PondwatchError> {
        if features.len() != self.input_len() {
            return Err(PondwatchError::ModelShape {
                model: self.name.clone(),
                expected: self.input_len(),
                actual: features.len(),
            });
        }

        let outputs = match &self.scaler {
            Some(scaler) => {
                let scaled: Vec<f64> = features
                    .iter()
                    .zip(scaler.mean.iter().zip(&scaler.scale))
                    .map(|(x, (mean, scale))| (x - mean) / scale)
                    .collect();
                self.adapter.predict(&scaled)?
            }
            None => self.adapter.predict(features)?,
        };

        if outputs.len() != self.output_len() {
            return Err(PondwatchError::ModelShape {
                model: self.name.clone(),
                expected: self.output_len(),
                actual: outputs.len(),
            });
        }
        if outputs.iter().any(|v| !v.is_finite()) {
            return Err(PondwatchError::ModelUnavailable(
                self.name.clone(),
                "inference produced a non-finite value".to_string(),
            ));
        }
        Ok(outputs)
    }
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("input_len", &self.input_len())
            .field("output_len", &self.output_len())
            .finish()
    }
}

fn shape_error(model: &str, expected: usize, actual: usize) -> PondwatchError {
    PondwatchError::ModelShape {
        model: model.to_string(),
        expected,
        actual,
    }
}

fn empty_model(model: &str, what: &str) -> PondwatchError {
    PondwatchError::ModelUnavailable(model.to_string(), format!("{} is empty", what))
}
