//! Status classification of a normalised snapshot.

use crate::{
    config::PredictorConfig,
    error::PondwatchError,
    models::ClassifierModel,
    wqi::{compute_wqi, round_to},
};
use pondwatch_schemas::{
    classification::{ClassificationResult, ModelKind, WqiClass},
    file_formats::ClassifierOutput,
    sensor::{Parameter, SensorSnapshot},
};
use std::collections::BTreeMap;
use tracing::warn;

pub const RULE_BASED_CONFIDENCE: f64 = 0.70;
pub const RULE_BASED_MODEL: &str = "rule_based";

/// Uses the trained classifier when one is loaded, otherwise the rules.
/// An inference failure degrades to the rules for this call only.
pub fn classify(
    snapshot: &SensorSnapshot,
    model: Option<&ClassifierModel>,
    config: &PredictorConfig,
) -> ClassificationResult {
    if let Some(model) = model {
        match classify_with_model(snapshot, model, config) {
            Ok(result) => return result,
            Err(e) => warn!(
                model = model.model.name(),
                error = %e,
                "Classifier inference failed, falling back to rules"
            ),
        }
    }
    classify_rule_based(snapshot, config)
}

/// Counts the parameters outside their acceptable range.
pub fn classify_rule_based(snapshot: &SensorSnapshot, config: &PredictorConfig) -> ClassificationResult {
    let issues = Parameter::ALL
        .iter()
        .filter(|p| !config.thresholds.range(**p).is_acceptable(snapshot.get(**p)))
        .count();
    let wqi_class = WqiClass::from_issue_count(issues);

    let others = (1.0 - RULE_BASED_CONFIDENCE) / (WqiClass::ALL.len() - 1) as f64;
    let probabilities = WqiClass::ALL
        .iter()
        .map(|class| {
            let p = if *class == wqi_class { RULE_BASED_CONFIDENCE } else { others };
            (*class, round_to(p, 3))
        })
        .collect();

    ClassificationResult {
        wqi: compute_wqi(snapshot, &config.thresholds, &config.wqi_weights),
        wqi_class,
        confidence: RULE_BASED_CONFIDENCE,
        model: RULE_BASED_MODEL.to_string(),
        model_kind: ModelKind::RuleBased,
        probabilities,
        using_trained_model: false,
    }
}

pub fn classify_with_model(
    snapshot: &SensorSnapshot,
    model: &ClassifierModel,
    config: &PredictorConfig,
) -> Result<ClassificationResult, PondwatchError> {
    let outputs = model.model.predict(&model.feature_vector(snapshot))?;
    let probabilities = to_probabilities(&outputs, model.output).ok_or_else(|| {
        PondwatchError::ModelUnavailable(
            model.model.name().to_string(),
            "outputs do not form a probability distribution".to_string(),
        )
    })?;

    // Ties go to the first class in output order.
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate() {
        if *p > probabilities[best] {
            best = i;
        }
    }

    let mut by_class: BTreeMap<WqiClass, f64> = BTreeMap::new();
    for (class, p) in model.classes.iter().zip(&probabilities) {
        *by_class.entry(*class).or_insert(0.0) += p;
    }
    for p in by_class.values_mut() {
        *p = round_to(*p, 3);
    }

    Ok(ClassificationResult {
        wqi: compute_wqi(snapshot, &config.thresholds, &config.wqi_weights),
        wqi_class: model.classes[best],
        confidence: round_to(probabilities[best], 3),
        model: model.model.name().to_string(),
        model_kind: model.model.kind(),
        probabilities: by_class,
        using_trained_model: true,
    })
}

fn to_probabilities(outputs: &[f64], kind: ClassifierOutput) -> Option<Vec<f64>> {
    match kind {
        ClassifierOutput::Logits => {
            let max = outputs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let exps: Vec<f64> = outputs.iter().map(|z| (z - max).exp()).collect();
            let sum: f64 = exps.iter().sum();
            Some(exps.into_iter().map(|e| e / sum).collect())
        }
        ClassifierOutput::Probabilities => {
            let clipped: Vec<f64> = outputs.iter().map(|p| p.max(0.0)).collect();
            let sum: f64 = clipped.iter().sum();
            if sum <= 0.0 {
                return None;
            }
            Some(clipped.into_iter().map(|p| p / sum).collect())
        }
    }
}
