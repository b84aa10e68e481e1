use pondwatch_core::{ModelRegistry, PredictorBuilder};
use pondwatch_schemas::{
    alert::AlertLevel,
    classification::{ModelKind, WqiClass},
    file_formats::{forecaster_file_name, CLASSIFIER_FILE},
    forecast::Horizon,
    sensor::{Parameter, PredictionRequest},
};
use serde_json::{json, Value};
use std::{fs, path::Path};

fn write(dir: &Path, file: &str, artifact: &Value) {
    fs::write(dir.join(file), serde_json::to_string_pretty(artifact).unwrap()).unwrap();
}

/// Logits favour Good when DO is above 5 mg/L and Very Bad below it.
fn linear_classifier() -> Value {
    json!({
        "schema_version": "1",
        "name": "cls_logreg",
        "features": ["pH", "Temperature", "DO(mg/L)", "Salinity", "Ammonia (mg L-1 )", "Nitrite (mg L-1 )", "BOD (mg/L)"],
        "classes": ["Good", "Medium", "Bad", "Very Bad"],
        "output": "logits",
        "model": {
            "type": "linear",
            "coefficients": [
                [0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0]
            ],
            "intercepts": [-5.0, 0.0, 0.0, 5.0]
        }
    })
}

const IDENTITY: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Persistence with DO raised by half a milligram.
fn linear_forecaster(hours: u32) -> Value {
    json!({
        "schema_version": "1",
        "name": format!("ts_ridge_h{}", hours),
        "horizon_hours": hours,
        "n_lags": 1,
        "features": ["pH", "DO", "Temperature", "Salinity"],
        "targets": ["pH", "DO", "Temperature", "Salinity"],
        "scaler": {"mean": [0.0, 0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0, 1.0]},
        "confidence": 0.9,
        "model": {"type": "linear", "coefficients": IDENTITY, "intercepts": [0.0, 0.5, 0.0, 0.0]}
    })
}

/// Splits on the DO of the older of two readings.
fn tree_forecaster(hours: u32) -> Value {
    json!({
        "schema_version": "1",
        "name": format!("ts_forest_h{}", hours),
        "horizon_hours": hours,
        "n_lags": 2,
        "features": ["pH", "DO", "Temperature", "Salinity"],
        "targets": ["pH", "DO", "Temperature", "Salinity"],
        "model": {"type": "tree_ensemble", "trees": [{"nodes": [
            {"kind": "split", "feature": 1, "threshold": 4.0, "left": 1, "right": 2},
            {"kind": "leaf", "value": [7.8, 3.0, 28.5, 20.0]},
            {"kind": "leaf", "value": [7.8, 6.0, 28.5, 20.0]}
        ]}]}
    })
}

fn neural_forecaster(hours: u32) -> Value {
    json!({
        "schema_version": "1",
        "name": format!("ts_mlp_h{}", hours),
        "horizon_hours": hours,
        "n_lags": 1,
        "features": ["pH", "DO", "Temperature", "Salinity"],
        "targets": ["pH", "DO", "Temperature", "Salinity"],
        "confidence": 0.8,
        "model": {"type": "neural_net", "layers": [
            {"weights": IDENTITY, "biases": [0.0, 0.0, 0.0, 0.0], "activation": "relu"},
            {"weights": IDENTITY, "biases": [0.0, 0.0, 0.0, 0.0], "activation": "identity"}
        ]}
    })
}

fn full_model_dir(dir: &Path) {
    write(dir, CLASSIFIER_FILE, &linear_classifier());
    write(dir, &forecaster_file_name(6), &linear_forecaster(6));
    write(dir, &forecaster_file_name(12), &tree_forecaster(12));
    write(dir, &forecaster_file_name(24), &neural_forecaster(24));
}

fn request(json: &str) -> PredictionRequest {
    serde_json::from_str(json).unwrap()
}

#[test]
fn all_three_model_families_load() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());

    let registry = ModelRegistry::load(dir.path());
    assert!(registry.is_complete());
    assert_eq!(registry.classifier_name(), "cls_logreg");
    assert_eq!(registry.forecaster_kind(Horizon::H6), ModelKind::Linear);
    assert_eq!(registry.forecaster_kind(Horizon::H12), ModelKind::TreeEnsemble);
    assert_eq!(registry.forecaster_kind(Horizon::H24), ModelKind::NeuralNet);
}

#[test]
fn trained_path_is_reported_as_trained() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());
    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();

    let response = predictor
        .predict(&request(r#"{"pH": 7.8, "Temperature": 28.5, "DO": 6.2, "Salinity": 20}"#))
        .unwrap();

    assert!(response.using_trained_model);
    assert!(response.model_info.using_trained_model);
    assert_eq!(response.classification.model, "cls_logreg");
    assert_eq!(response.classification.model_kind, ModelKind::Linear);
    assert_eq!(response.classification.wqi_class, WqiClass::Good);
    assert!(response.classification.confidence > 0.5);

    let probabilities: f64 = response.classification.probabilities.values().sum();
    assert!((probabilities - 1.0).abs() < 1e-2);

    assert!((response.forecasts[&Horizon::H6].dissolved_oxygen - 6.7).abs() < 1e-9);
    // A single reading is padded to the two-lag window, so the split sees 6.2.
    assert_eq!(response.forecasts[&Horizon::H12].dissolved_oxygen, 6.0);
    assert!((response.forecasts[&Horizon::H24].dissolved_oxygen - 6.2).abs() < 1e-9);

    assert_eq!(response.confidence.forecast[&Horizon::H6], 0.9);
    assert!((response.confidence.forecast[&Horizon::H12] - 0.8075).abs() < 1e-3);
    assert_eq!(response.confidence.forecast[&Horizon::H24], 0.72);
    assert_eq!(response.model_info.forecast_models[&Horizon::H24], "ts_mlp_h24");
}

#[test]
fn trained_classifier_sees_low_oxygen() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());
    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();

    let response = predictor.predict(&request(r#"{"DO": 3.2}"#)).unwrap();
    assert_eq!(response.classification.wqi_class, WqiClass::VeryBad);
    // The score-based class is independent of the classifier.
    assert_eq!(response.current.wqi_class, WqiClass::Medium);
}

#[test]
fn lagged_history_drives_a_predictive_alert() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());
    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();

    let response = predictor
        .predict(&request(r#"{"DO": 5.5, "history": [{"DO": 3.8}]}"#))
        .unwrap();

    assert_eq!(response.forecasts[&Horizon::H12].dissolved_oxygen, 3.0);
    let alert = response
        .alerts
        .iter()
        .find(|a| a.parameter == Parameter::DissolvedOxygen)
        .unwrap();
    assert_eq!(alert.level, AlertLevel::Critical);
    assert_eq!(alert.horizon, Some(Horizon::H12));

    let danger = response.time_to_danger.as_ref().unwrap();
    assert!(!danger.is_safe);
    assert_eq!(danger.hours_remaining, Some(12));
}

#[test]
fn corrupt_classifier_falls_back_to_rules() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());
    fs::write(dir.path().join(CLASSIFIER_FILE), "{ not json").unwrap();

    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();
    let response = predictor.predict(&request(r#"{"DO": 6.2}"#)).unwrap();

    assert_eq!(response.classification.model, "rule_based");
    assert!(!response.using_trained_model);
    assert_eq!(response.model_info.forecast_models[&Horizon::H6], "ts_ridge_h6");
}

#[test]
fn misshapen_or_misplaced_forecasters_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());

    let mut short = linear_forecaster(6);
    short["model"]["coefficients"] = json!([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]]);
    write(dir.path(), &forecaster_file_name(6), &short);
    write(dir.path(), &forecaster_file_name(24), &neural_forecaster(12));

    let registry = ModelRegistry::load(dir.path());
    assert!(registry.forecaster(Horizon::H6).is_none());
    assert!(registry.forecaster(Horizon::H12).is_some());
    assert!(registry.forecaster(Horizon::H24).is_none());
    assert!(!registry.is_complete());
}

#[test]
fn forecaster_must_predict_all_four_targets() {
    let dir = tempfile::tempdir().unwrap();
    let mut partial = linear_forecaster(6);
    partial["targets"] = json!(["pH", "DO", "Temperature", "Ammonia"]);
    write(dir.path(), &forecaster_file_name(6), &partial);

    assert!(ModelRegistry::load(dir.path()).forecaster(Horizon::H6).is_none());
}

#[test]
fn non_finite_inference_degrades_for_that_call() {
    let dir = tempfile::tempdir().unwrap();
    full_model_dir(dir.path());
    let mut overflowing = linear_classifier();
    overflowing["model"]["coefficients"][0][2] = json!(1e308);
    write(dir.path(), CLASSIFIER_FILE, &overflowing);

    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();
    assert!(predictor.registry().classifier().is_some());

    let response = predictor.predict(&request(r#"{"DO": 6.2}"#)).unwrap();
    assert_eq!(response.classification.model_kind, ModelKind::RuleBased);
    assert!(!response.using_trained_model);
}
