use super::{empty_model, shape_error, ModelAdapter};
use crate::error::PondwatchError;
use pondwatch_schemas::{
    classification::ModelKind,
    file_formats::{Activation, DenseLayer},
};

/// Feed-forward stack of dense layers.
#[derive(Debug, Clone)]
pub struct NeuralNetModel {
    layers: Vec<DenseLayer>,
    input_len: usize,
    output_len: usize,
}

impl NeuralNetModel {
    pub fn new(name: &str, layers: Vec<DenseLayer>) -> Result<Self, PondwatchError> {
        let input_len = layers
            .first()
            .and_then(|layer| layer.weights.first())
            .map(|row| row.len())
            .ok_or_else(|| empty_model(name, "network"))?;

        let mut width = input_len;
        for layer in &layers {
            if layer.weights.is_empty() {
                return Err(empty_model(name, "layer"));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != width) {
                return Err(shape_error(name, width, row.len()));
            }
            if layer.biases.len() != layer.weights.len() {
                return Err(shape_error(name, layer.weights.len(), layer.biases.len()));
            }
            width = layer.weights.len();
        }

        Ok(Self {
            layers,
            input_len,
            output_len: width,
        })
    }
}

fn activate(activation: Activation, x: f64) -> f64 {
    match activation {
        Activation::Identity => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
    }
}

impl ModelAdapter for NeuralNetModel {
    fn kind(&self) -> ModelKind {
        ModelKind::NeuralNet
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PondwatchError> {
        let mut signal = features.to_vec();
        for layer in &self.layers {
            signal = layer
                .weights
                .iter()
                .zip(&layer.biases)
                .map(|(row, bias)| {
                    let z = row.iter().zip(&signal).map(|(w, x)| w * x).sum::<f64>() + bias;
                    activate(layer.activation, z)
                })
                .collect();
        }
        Ok(signal)
    }
}
