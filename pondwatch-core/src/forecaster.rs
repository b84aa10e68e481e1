//! Horizon forecasts for pH, DO, Temperature and Salinity.
//!
//! Horizons are independent, so they run in parallel. Parameters the
//! forecasters do not predict carry over from the current snapshot.

use crate::{
    config::{DriftSettings, PredictorConfig},
    error::PondwatchError,
    models::{ForecasterModel, ModelRegistry},
    wqi::round_to,
};
use pondwatch_schemas::{
    classification::ModelKind,
    forecast::{ForecastSet, Horizon, HorizonForecast},
    sensor::{Parameter, SensorSnapshot},
};
use rayon::prelude::*;
use tracing::warn;

pub const FALLBACK_CONFIDENCE: f64 = 0.70;
pub const FALLBACK_MODEL: &str = "drift_fallback";
const HOURS_PER_STEP: u32 = 6;

pub fn forecast_all(
    current: &SensorSnapshot,
    history: &[SensorSnapshot],
    registry: &ModelRegistry,
    config: &PredictorConfig,
) -> ForecastSet {
    Horizon::ALL
        .par_iter()
        .map(|horizon| {
            let forecast = forecast_horizon(*horizon, current, history, registry.forecaster(*horizon), config);
            (*horizon, forecast)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

pub fn forecast_horizon(
    horizon: Horizon,
    current: &SensorSnapshot,
    history: &[SensorSnapshot],
    model: Option<&ForecasterModel>,
    config: &PredictorConfig,
) -> HorizonForecast {
    if let Some(model) = model {
        match forecast_with_model(horizon, current, history, model) {
            Ok(forecast) => return forecast,
            Err(e) => warn!(
                horizon = horizon.label(),
                model = model.model.name(),
                error = %e,
                "Forecaster inference failed, falling back to drift"
            ),
        }
    }
    HorizonForecast {
        snapshot: drift_forecast(current, horizon, &config.drift),
        confidence: round_to(FALLBACK_CONFIDENCE * horizon.confidence_decay(), 3),
        model: FALLBACK_MODEL.to_string(),
        model_kind: ModelKind::DriftFallback,
    }
}

pub fn forecast_with_model(
    horizon: Horizon,
    current: &SensorSnapshot,
    history: &[SensorSnapshot],
    model: &ForecasterModel,
) -> Result<HorizonForecast, PondwatchError> {
    let window = lag_window(current, history, model.n_lags);
    let outputs = model.model.predict(&model.feature_vector(&window))?;

    let snapshot = model
        .targets
        .iter()
        .zip(outputs)
        .fold(*current, |snapshot, (parameter, value)| snapshot.with(*parameter, value));

    Ok(HorizonForecast {
        snapshot,
        confidence: round_to(model.confidence * horizon.confidence_decay(), 3),
        model: model.model.name().to_string(),
        model_kind: model.model.kind(),
    })
}

/// The last `n_lags` readings of history followed by the current one.
/// A short window is padded at the front with its oldest reading.
pub fn lag_window(current: &SensorSnapshot, history: &[SensorSnapshot], n_lags: usize) -> Vec<SensorSnapshot> {
    if n_lags == 0 {
        return Vec::new();
    }
    let mut readings: Vec<SensorSnapshot> = history.iter().copied().chain(std::iter::once(*current)).collect();
    if readings.len() > n_lags {
        readings.drain(..readings.len() - n_lags);
    }
    let oldest = readings[0];
    let mut window = vec![oldest; n_lags - readings.len()];
    window.extend(readings);
    window
}

/// Moves each target toward its baseline by one step per six hours
/// without overshooting.
pub fn drift_forecast(current: &SensorSnapshot, horizon: Horizon, drift: &DriftSettings) -> SensorSnapshot {
    let steps = horizon.hours() / HOURS_PER_STEP;
    Parameter::FORECAST_TARGETS
        .iter()
        .fold(*current, |snapshot, parameter| match drift.rule(*parameter) {
            Some(rule) => {
                let mut value = current.get(*parameter);
                for _ in 0..steps {
                    value = if value < rule.baseline {
                        (value + rule.step).min(rule.baseline)
                    } else {
                        (value - rule.step).max(rule.baseline)
                    };
                }
                snapshot.with(*parameter, round_to(value, 2))
            }
            None => snapshot,
        })
}
