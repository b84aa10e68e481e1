use super::{empty_model, shape_error, ModelAdapter};
use crate::error::PondwatchError;
use pondwatch_schemas::{
    classification::ModelKind,
    file_formats::{DecisionTree, TreeNode},
};

/// Averaged ensemble of flattened decision trees.
///
/// A split sends `x[feature] <= threshold` to `left`. Child indices must
/// point forward in the node list, which rules out cycles.
#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    trees: Vec<DecisionTree>,
    input_len: usize,
    output_len: usize,
}

impl TreeEnsembleModel {
    pub fn new(name: &str, trees: Vec<DecisionTree>, input_len: usize) -> Result<Self, PondwatchError> {
        if trees.is_empty() {
            return Err(empty_model(name, "tree ensemble"));
        }

        let mut output_len = None;
        for tree in &trees {
            if tree.nodes.is_empty() {
                return Err(empty_model(name, "tree"));
            }
            for (index, node) in tree.nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= input_len {
                            return Err(shape_error(name, input_len, feature + 1));
                        }
                        if !threshold.is_finite() {
                            return Err(PondwatchError::ModelUnavailable(
                                name.to_string(),
                                format!("node {} has a non-finite threshold", index),
                            ));
                        }
                        for child in [*left, *right] {
                            if child <= index || child >= tree.nodes.len() {
                                return Err(PondwatchError::ModelUnavailable(
                                    name.to_string(),
                                    format!("node {} points to invalid child {}", index, child),
                                ));
                            }
                        }
                    }
                    TreeNode::Leaf { value } => match output_len {
                        None if value.is_empty() => return Err(empty_model(name, "leaf")),
                        None => output_len = Some(value.len()),
                        Some(expected) if expected != value.len() => {
                            return Err(shape_error(name, expected, value.len()))
                        }
                        Some(_) => {}
                    },
                }
            }
        }

        let output_len = output_len.ok_or_else(|| empty_model(name, "leaf set"))?;
        Ok(Self {
            trees,
            input_len,
            output_len,
        })
    }

    fn leaf<'a>(tree: &'a DecisionTree, features: &[f64]) -> &'a [f64] {
        let mut index = 0;
        loop {
            match &tree.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

impl ModelAdapter for TreeEnsembleModel {
    fn kind(&self) -> ModelKind {
        ModelKind::TreeEnsemble
    }

    fn input_len(&self) -> usize {
        self.input_len
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>, PondwatchError> {
        let mut sums = vec![0.0; self.output_len];
        for tree in &self.trees {
            for (sum, value) in sums.iter_mut().zip(Self::leaf(tree, features)) {
                *sum += value;
            }
        }
        let count = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / count).collect())
    }
}
