use pondwatch_core::{config::PredictorConfig, normalizer, wqi, PredictorBuilder};
use pondwatch_schemas::{
    sensor::{Parameter, PredictionRequest, SensorReading, SensorSnapshot},
    thresholds::ThresholdTable,
};
use proptest::prelude::*;

fn snapshot_strategy() -> impl Strategy<Value = SensorSnapshot> {
    (
        6.0f64..10.0,
        18.0f64..38.0,
        0.0f64..16.0,
        0.0f64..45.0,
        0.0f64..1.0,
        0.0f64..1.5,
        5.0f64..90.0,
    )
        .prop_map(|(ph, temperature, dissolved_oxygen, salinity, ammonia, nitrite, turbidity)| SensorSnapshot {
            ph,
            temperature,
            dissolved_oxygen,
            salinity,
            ammonia,
            nitrite,
            turbidity,
        })
}

proptest! {
    #[test]
    fn wqi_stays_within_bounds(snapshot in snapshot_strategy()) {
        let config = PredictorConfig::default();
        let score = wqi::compute_wqi(&snapshot, &config.thresholds, &config.wqi_weights);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn raising_oxygen_toward_optimum_never_lowers_wqi(
        snapshot in snapshot_strategy(),
        low in 0.0f64..5.0,
        delta in 0.0f64..5.0,
    ) {
        let config = PredictorConfig::default();
        let optimal_min = config.thresholds.range(Parameter::DissolvedOxygen).optimal_min;
        let high = (low + delta).min(optimal_min);
        let before = wqi::compute_wqi(&snapshot.with(Parameter::DissolvedOxygen, low), &config.thresholds, &config.wqi_weights);
        let after = wqi::compute_wqi(&snapshot.with(Parameter::DissolvedOxygen, high), &config.thresholds, &config.wqi_weights);
        prop_assert!(after >= before, "DO {} -> {}: WQI {} -> {}", low, high, before, after);
    }

    #[test]
    fn sub_scores_are_percentages(value in -10.0f64..60.0) {
        let table = ThresholdTable::default();
        for parameter in Parameter::ALL {
            let score = wqi::sub_score(table.range(parameter), value);
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn any_in_bounds_reading_gets_a_complete_response(snapshot in snapshot_strategy()) {
        let predictor = PredictorBuilder::new().build().unwrap();
        let request = PredictionRequest::new(1, SensorReading::from(&snapshot));
        let response = predictor.predict(&request).unwrap();

        prop_assert_eq!(response.forecasts.len(), 3);
        prop_assert_eq!(response.predicted_wqi.len(), 3);
        prop_assert!(response.time_to_danger.is_some());
        prop_assert!(!response.using_trained_model);
        prop_assert!(response.recommendations.len() <= 4);
        prop_assert!((0.0..=1.0).contains(&response.confidence.overall));
    }

    #[test]
    fn normalisation_keeps_given_values(snapshot in snapshot_strategy()) {
        let config = PredictorConfig::default();
        let normalised = normalizer::normalize(&SensorReading::from(&snapshot), &config.defaults).unwrap();
        prop_assert_eq!(normalised, snapshot);
    }
}
