use pondwatch_core::{
    config::{load_yaml, PredictorConfig},
    wqi, PondwatchError, PredictorBuilder,
};
use pondwatch_schemas::{
    classification::{WaterQualityStatus, WqiClass},
    sensor::{Parameter, SensorSnapshot},
    thresholds::ThresholdTable,
};
use std::fs;

#[test]
fn class_boundaries_are_inclusive_lower_bounds() {
    assert_eq!(WqiClass::from_score(70.0), WqiClass::Good);
    assert_eq!(WqiClass::from_score(69.9), WqiClass::Medium);
    assert_eq!(WqiClass::from_score(50.0), WqiClass::Medium);
    assert_eq!(WqiClass::from_score(49.9), WqiClass::Bad);
    assert_eq!(WqiClass::from_score(25.0), WqiClass::Bad);
    assert_eq!(WqiClass::from_score(24.9), WqiClass::VeryBad);

    assert_eq!(WaterQualityStatus::from_score(85.0), WaterQualityStatus::Excellent);
    assert_eq!(WaterQualityStatus::from_score(84.9), WaterQualityStatus::Good);
    assert_eq!(WaterQualityStatus::from_score(70.0), WaterQualityStatus::Good);
    assert_eq!(WaterQualityStatus::from_score(50.0), WaterQualityStatus::Fair);
    assert_eq!(WaterQualityStatus::from_score(25.0), WaterQualityStatus::Poor);
    assert_eq!(WaterQualityStatus::from_score(24.9), WaterQualityStatus::Critical);
}

#[test]
fn computed_scores_land_on_the_boundaries() {
    let config = PredictorConfig::default();
    let optimal = SensorSnapshot {
        ph: 8.0,
        temperature: 28.0,
        dissolved_oxygen: 6.0,
        salinity: 20.0,
        ammonia: 0.02,
        nitrite: 0.1,
        turbidity: 30.0,
    };
    let score = |s: &SensorSnapshot| wqi::compute_wqi(s, &config.thresholds, &config.wqi_weights);

    assert_eq!(score(&optimal), 100.0);
    // Losing pH and Temperature entirely leaves 60; losing DO leaves 65.
    let no_ph_or_temp = optimal.with(Parameter::Ph, 6.0).with(Parameter::Temperature, 36.0);
    assert_eq!(score(&no_ph_or_temp), 60.0);
    assert_eq!(WqiClass::from_score(score(&no_ph_or_temp)), WqiClass::Medium);

    // DO alone at zero plus pH halfway: 65 - 10 = 55.
    let halfway_ph = optimal.with(Parameter::DissolvedOxygen, 1.0).with(Parameter::Ph, 7.0);
    assert_eq!(score(&halfway_ph), 55.0);

    // DO, pH and Temperature all gone: 25, the lowest Bad score.
    let bad = optimal
        .with(Parameter::DissolvedOxygen, 1.0)
        .with(Parameter::Ph, 6.0)
        .with(Parameter::Temperature, 36.0);
    assert_eq!(score(&bad), 25.0);
    assert_eq!(WqiClass::from_score(score(&bad)), WqiClass::Bad);
    assert_eq!(WaterQualityStatus::from_score(score(&bad)), WaterQualityStatus::Poor);
}

#[test]
fn weights_that_do_not_sum_to_one_cannot_build_a_predictor() {
    let mut config = PredictorConfig::default();
    config.wqi_weights.dissolved_oxygen = 0.5;
    let err = PredictorBuilder::new().with_config(config).build().unwrap_err();
    assert!(matches!(err, PondwatchError::ConfigError(_)));
}

#[test]
fn inverted_ranges_are_a_config_error() {
    let mut config = PredictorConfig::default();
    config.thresholds.dissolved_oxygen.optimal_min = 11.0;
    assert!(matches!(config.validate(), Err(PondwatchError::ConfigError(_))));

    let mut config = PredictorConfig::default();
    config.night_drop_fraction = 1.0;
    assert!(matches!(config.validate(), Err(PondwatchError::ConfigError(_))));
}

#[test]
fn yaml_overrides_only_what_it_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("predictor.yaml");
    fs::write(
        &path,
        "wqi_weights:\n  DO: 0.40\n  pH: 0.15\n  Temperature: 0.20\n  Ammonia: 0.15\n  Nitrite: 0.10\ndrift:\n  DO:\n    baseline: 7.0\n    step: 0.5\n",
    )
    .unwrap();

    let config: PredictorConfig = load_yaml(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.wqi_weights.dissolved_oxygen, 0.40);
    assert_eq!(config.drift.dissolved_oxygen.baseline, 7.0);
    assert_eq!(config.drift.ph.baseline, 7.8);
    assert_eq!(config.thresholds, ThresholdTable::default());
    assert_eq!(config.recovery_target_wqi, 75.0);
}

#[test]
fn unreadable_yaml_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "wqi_weights: [1, 2").unwrap();
    let err = load_yaml::<PredictorConfig>(&path).unwrap_err();
    assert!(matches!(err, PondwatchError::YamlParsing(..)));
    assert!(err.to_string().contains("broken.yaml"));

    let missing = load_yaml::<PredictorConfig>(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, PondwatchError::FileIO(..)));
}
