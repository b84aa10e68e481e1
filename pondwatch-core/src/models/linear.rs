use super::{empty_model, shape_error, ModelAdapter};
use crate::error::PondwatchError;
use pondwatch_schemas::classification::ModelKind;

/// `y = W x + b`.
#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    input_len: usize,
}

impl LinearModel {
    pub fn new(name: &str, coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self, PondwatchError> {
        let input_len = coefficients
            .first()
            .map(|row| row.len())
            .ok_or_else(|| empty_model(name, "coefficient matrix"))?;
        if input_len == 0 {
            return Err(empty_model(name, "coefficient row"));
        }
        if let Some(row) = coefficients.iter().find(|row| row.len() != input_len) {
            return Err(shape_error(name, input_len, row.len()));
        }
        if intercepts.len() != coefficients.len() {
            return Err(shape_error(name, coefficients.len(), intercepts.len()));
        }

        Ok(Self {
            coefficients,
            intercepts,
            input_len,
        })
    }
}

impl ModelAdapter for LinearModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_len(&self) -> usize {
        self.intercepts.len()
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PondwatchError> {
        Ok(self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, intercept)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + intercept)
            .collect())
    }
}
