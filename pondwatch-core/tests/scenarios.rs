use pondwatch_core::{analysis, PondwatchError, Predictor, PredictorBuilder};
use pondwatch_schemas::{
    alert::AlertLevel,
    classification::{ModelKind, WqiClass},
    forecast::Horizon,
    response::{FarmStatus, PredictionResponse, Urgency},
    risk::{AeratorSetting, RecoveryBasis, RiskLevel},
    sensor::{Parameter, PredictionRequest},
};

fn predictor() -> Predictor {
    PredictorBuilder::new().build().unwrap()
}

fn request(json: &str) -> PredictionRequest {
    serde_json::from_str(json).unwrap()
}

fn predict(json: &str) -> PredictionResponse {
    predictor().predict(&request(json)).unwrap()
}

const HEALTHY: &str = r#"{"pH": 7.8, "Temperature": 28.5, "DO": 6.2, "Salinity": 20, "Ammonia": 0.05, "Nitrite": 0.02}"#;
const LOW_OXYGEN: &str = r#"{"pH": 7.8, "Temperature": 28.5, "DO": 3.2, "Salinity": 20}"#;

#[test]
fn healthy_pond_is_good_and_safe() {
    let response = predict(HEALTHY);

    assert_eq!(response.current.wqi, 100.0);
    assert_eq!(response.current.wqi_class, WqiClass::Good);
    assert_eq!(response.classification.wqi_class, WqiClass::Good);
    assert_eq!(response.critical_alert_count(), 0);
    assert!(response.alerts.is_empty());
    assert_eq!(response.urgency, Urgency::Normal);

    let danger = response.time_to_danger.as_ref().unwrap();
    assert!(danger.is_safe);
    assert_eq!(danger.hours_remaining, None);
    assert_eq!(danger.status, RiskLevel::Safe);

    // 6.2 mg/L loses 30% overnight: 4.34, which is under 1.5 above the 3.5 floor.
    let night = response.night_safety.as_ref().unwrap();
    assert!(night.is_night_safe);
    assert_eq!(night.predicted_night_do, 4.34);
    assert_eq!(night.safety_margin, 0.84);
    assert_eq!(night.risk_level, RiskLevel::Warning);
    assert_eq!(night.aerator_setting, AeratorSetting::High);

    let titles: Vec<&str> = response.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Night Aeration", "Optimal Conditions"]);
    assert!(!response.recovery.as_ref().unwrap().needs_recovery);
}

#[test]
fn critically_low_oxygen_is_dangerous_now() {
    let response = predict(LOW_OXYGEN);

    assert_eq!(response.current.wqi, 65.0);
    assert_eq!(response.current.wqi_class, WqiClass::Medium);
    assert_eq!(response.urgency, Urgency::Critical);
    assert_eq!(response.critical_parameter, Some(Parameter::DissolvedOxygen));

    let dissolved_oxygen: Vec<_> = response
        .alerts
        .iter()
        .filter(|a| a.parameter == Parameter::DissolvedOxygen)
        .collect();
    assert_eq!(dissolved_oxygen.len(), 1);
    assert_eq!(dissolved_oxygen[0].level, AlertLevel::Critical);
    assert!(dissolved_oxygen[0].horizon.is_none(), "the current alert wins over the forecast one");

    let danger = response.time_to_danger.as_ref().unwrap();
    assert!(!danger.is_safe);
    assert_eq!(danger.hours_remaining, Some(0));
    assert_eq!(danger.critical_parameter, Some(Parameter::DissolvedOxygen));

    let forecast_do: Vec<f64> = response.forecasts.values().map(|s| s.dissolved_oxygen).collect();
    assert_eq!(forecast_do, vec![3.45, 3.7, 4.2]);

    let night = response.night_safety.as_ref().unwrap();
    assert!(!night.is_night_safe);
    assert_eq!(night.aerator_setting, AeratorSetting::Maximum);

    let titles: Vec<&str> = response.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Activate All Aerators", "Night Aeration", "Monitor Closely"]);

    let recovery = response.recovery.as_ref().unwrap();
    assert!(recovery.needs_recovery);
    assert_eq!(recovery.basis, Some(RecoveryBasis::ForecastTrend));
    assert_eq!(recovery.estimated_hours, Some(15));
    assert_eq!(recovery.worst_parameter, Some(Parameter::DissolvedOxygen));
    assert_eq!(recovery.required_actions, vec!["Activate all aerators".to_string()]);
}

#[test]
fn missing_nitrogen_readings_take_defaults() {
    let response = predict(r#"{"pH": 7.9, "Temperature": 27.0, "DO": 5.8, "Salinity": 18}"#);

    assert_eq!(response.current.sensors.ammonia, 0.05);
    assert_eq!(response.current.sensors.nitrite, 0.1);
    assert_eq!(response.current.sensors.turbidity, 30.0);
    assert_eq!(response.classification.model_kind, ModelKind::RuleBased);
    assert_eq!(response.classification.wqi_class, WqiClass::Good);
}

#[test]
fn empty_model_directory_still_returns_everything() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = PredictorBuilder::new().with_model_dir(dir.path()).build().unwrap();
    let response = predictor.predict(&request(LOW_OXYGEN)).unwrap();

    assert!(!response.using_trained_model);
    assert!(!response.classification.using_trained_model);
    assert_eq!(response.model_info.classification_model, "rule_based");
    assert!(response
        .model_info
        .forecast_models
        .values()
        .all(|name| name == "drift_fallback"));

    assert_eq!(response.forecasts.len(), 3);
    assert_eq!(response.predicted_wqi.len(), 3);
    assert_eq!(response.confidence.forecast.len(), 3);
    assert!(response.time_to_danger.is_some());
    assert!(response.night_safety.is_some());
    assert!(response.recovery.is_some());
    assert!(!predictor.model_info().using_trained_model);
}

#[test]
fn horizons_are_reported_in_order() {
    let response = predict(HEALTHY);
    let horizons: Vec<Horizon> = response.forecasts.keys().copied().collect();
    assert_eq!(horizons, vec![Horizon::H6, Horizon::H12, Horizon::H24]);

    let json = serde_json::to_string(&response.forecasts).unwrap();
    let six = json.find("\"6h\"").unwrap();
    let twelve = json.find("\"12h\"").unwrap();
    let twenty_four = json.find("\"24h\"").unwrap();
    assert!(six < twelve && twelve < twenty_four);
}

#[test]
fn repeated_predictions_are_identical() {
    let predictor = predictor();
    let request = request(LOW_OXYGEN);
    let first = predictor.predict(&request).unwrap();
    let second = predictor.predict(&request).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn oxygen_crossing_at_every_horizon_yields_one_alert() {
    let response = predict(r#"{"DO": 2.0}"#);
    assert!(response
        .forecasts
        .values()
        .all(|s| s.dissolved_oxygen < 3.5));
    let count = response
        .alerts
        .iter()
        .filter(|a| a.parameter == Parameter::DissolvedOxygen)
        .count();
    assert_eq!(count, 1);
}

#[test]
fn ph_past_its_critical_bound_is_flagged_now() {
    let response = predict(r#"{"pH": 9.6, "DO": 6.0}"#);
    let ph = response
        .alerts
        .iter()
        .find(|a| a.parameter == Parameter::Ph)
        .unwrap();
    assert_eq!(ph.level, AlertLevel::Critical);
    assert!(ph.horizon.is_none());

    let danger = response.time_to_danger.as_ref().unwrap();
    assert_eq!(danger.hours_remaining, Some(0));
    assert_eq!(danger.critical_parameter, Some(Parameter::Ph));
}

#[test]
fn text_values_are_accepted_and_garbage_rejected() {
    let response = predict(r#"{"DO": "6.1", "pH": " 7.9 "}"#);
    assert_eq!(response.current.sensors.dissolved_oxygen, 6.1);
    assert_eq!(response.current.sensors.ph, 7.9);

    let err = predictor().predict(&request(r#"{"DO": "plenty"}"#)).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("DO"));

    let err = predictor().predict(&request(r#"{"Temperature": 72}"#)).unwrap_err();
    assert!(matches!(err, PondwatchError::Validation { .. }));
}

#[test]
fn history_feeds_trends_and_sensor_health() {
    let response = predict(
        r#"{"DO": 4.2, "history": [{"DO": 6.5}, {"DO": 6.2}, {"DO": 5.9}, {"DO": 5.0}]}"#,
    );
    // Mean of the last three is 5.7; a 1.5 mg/L drop is within the drift limit.
    assert!(response.sensor_health.is_healthy);
    let trend = response.trends.parameters.get(&Parameter::DissolvedOxygen).unwrap();
    assert!(trend.rate < 0.0);
    assert_eq!(
        response.trends.overall,
        pondwatch_schemas::health::OverallTrend::Deteriorating
    );
}

#[test]
fn batch_ranks_ponds_and_lists_rejects() {
    let requests = vec![
        request(r#"{"pond_id": 1, "pH": 7.8, "DO": 6.2}"#),
        request(r#"{"pond_id": 2, "DO": 3.1}"#),
        request(r#"{"pond_id": 3, "DO": "n/a"}"#),
        request(r#"{"pond_id": 4, "DO": 4.4, "Ammonia": 0.2}"#),
    ];
    let batch = predictor().predict_batch(&requests).unwrap();

    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].pond_id, 3);
    let order: Vec<u32> = batch.results.iter().map(|r| r.pond_id).collect();
    assert_eq!(order[0], 2);
    assert_eq!(batch.summary.pond_count, 3);
    assert_eq!(batch.summary.critical_ponds, 1);
    assert_eq!(batch.summary.farm_status, FarmStatus::Critical);
}

#[test]
fn non_numeric_json_rejects_only_its_pond() {
    let requests = vec![
        request(r#"{"pond_id": 1, "DO": 6.0}"#),
        request(r#"{"pond_id": 2, "DO": true}"#),
        request(r#"{"pond_id": 3, "pH": [7.8]}"#),
        request(r#"{"pond_id": 4, "Salinity": {"ppt": 20}}"#),
    ];
    let batch = predictor().predict_batch(&requests).unwrap();

    let results: Vec<u32> = batch.results.iter().map(|r| r.pond_id).collect();
    assert_eq!(results, vec![1]);
    let failed: Vec<u32> = batch.failures.iter().map(|f| f.pond_id).collect();
    assert_eq!(failed, vec![2, 3, 4]);
    assert!(batch.failures[0].error.contains("DO"));
}

#[test]
fn prediction_log_can_be_summarised() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("predictions.csv");
    let predictor = PredictorBuilder::new()
        .with_prediction_log_to_file(log.to_str().unwrap())
        .build()
        .unwrap();

    predictor.predict(&request(&HEALTHY.replacen('{', r#"{"pond_id": 1, "#, 1))).unwrap();
    predictor.predict(&request(&LOW_OXYGEN.replacen('{', r#"{"pond_id": 2, "#, 1))).unwrap();

    let summary = analysis::summarize_log(log.to_str().unwrap()).unwrap();
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.ponds, 2);
    assert_eq!(summary.critical_rows, 1);
    assert_eq!(summary.worst, Some((2, 65.0)));
    assert_eq!(summary.average_wqi, 82.5);
    assert_eq!(summary.by_class.get("Good"), Some(&1));
}

#[cfg(target_os = "linux")]
#[test]
fn failing_prediction_log_keeps_the_response() {
    // Opens fine, but every write fails with "no space left on device".
    let predictor = PredictorBuilder::new()
        .with_prediction_log_to_file("/dev/full")
        .build()
        .unwrap();

    let response = predictor.predict(&request(LOW_OXYGEN)).unwrap();
    assert_eq!(response.current.wqi, 65.0);

    let requests = vec![
        request(r#"{"pond_id": 1, "DO": 6.0}"#),
        request(r#"{"pond_id": 2, "DO": 3.1}"#),
    ];
    let batch = predictor.predict_batch(&requests).unwrap();
    assert_eq!(batch.results.len(), 2);
    assert!(batch.failures.is_empty());
}
