use crate::{
    alerts, analysis, classifier,
    config::PredictorConfig,
    error::PondwatchError,
    forecaster::{self, FALLBACK_MODEL},
    logger::PredictionLogger,
    models::ModelRegistry,
    normalizer, risk, wqi,
};
use pondwatch_schemas::{
    classification::{WaterQualityStatus, WqiClass},
    forecast::{Horizon, PredictedWqi},
    response::{
        BatchFailure, BatchResponse, ConfidenceReport, CurrentStatus, ModelInfo, PredictionResponse,
    },
    sensor::{PredictionRequest, SensorSnapshot},
};
use rayon::prelude::*;
use std::{collections::BTreeMap, sync::Mutex};
use tracing::{debug, info, warn};

/// Runs the full prediction pipeline for one pond at a time.
///
/// Models and configuration are read-only after `PredictorBuilder::build`,
/// so a predictor can be shared across threads.
#[derive(Debug)]
pub struct Predictor {
    pub(super) config: PredictorConfig,
    pub(super) registry: ModelRegistry,
    pub(super) logger: Option<Mutex<PredictionLogger>>,
}

impl Predictor {
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Which models are loaded, independent of any request.
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            using_trained_model: self.registry.is_complete(),
            classification_model: self.registry.classifier_name(),
            forecast_models: Horizon::ALL
                .iter()
                .map(|h| {
                    let name = self
                        .registry
                        .forecaster(*h)
                        .map_or(FALLBACK_MODEL.to_string(), |f| f.model.name().to_string());
                    (*h, name)
                })
                .collect(),
        }
    }

    /// Normalises the request and evaluates it. Only invalid input is an
    /// error; model problems degrade to fallbacks and a failing prediction
    /// log is reported but never costs the caller the response.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, PondwatchError> {
        let current = normalizer::normalize(&request.reading, &self.config.defaults)?;
        let history = normalizer::normalize_history(&request.history, &current)?;
        let response = self.evaluate(request.pond_id, &current, &history);

        if let Err(e) = self.log(&response) {
            warn!(pond_id = response.pond_id, error = %e, "Prediction log write failed");
        }
        Ok(response)
    }

    fn log(&self, response: &PredictionResponse) -> Result<(), PondwatchError> {
        let Some(logger) = &self.logger else {
            return Ok(());
        };
        // Poisoning only means another write panicked; the writer is still usable.
        let mut logger = logger.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        logger.log_prediction(response)?;
        Ok(())
    }

    /// Predicts every pond in parallel. Ponds with invalid input are listed
    /// as failures; the rest are ranked most urgent first.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Result<BatchResponse, PondwatchError> {
        let outcomes: Vec<(u32, Result<PredictionResponse, PondwatchError>)> = requests
            .par_iter()
            .map(|request| (request.pond_id, self.predict(request)))
            .collect();

        let mut results = Vec::new();
        let mut failures = Vec::new();
        for (pond_id, outcome) in outcomes {
            match outcome {
                Ok(response) => results.push(response),
                Err(e) if e.is_validation() => failures.push(BatchFailure {
                    pond_id,
                    error: e.to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        analysis::sort_by_urgency(&mut results);
        let summary = analysis::farm_summary(&results);
        info!(
            ponds = summary.pond_count,
            failures = failures.len(),
            critical_ponds = summary.critical_ponds,
            "Batch prediction complete"
        );

        Ok(BatchResponse {
            results,
            failures,
            summary,
        })
    }

    /// The pipeline on an already normalised snapshot and history.
    pub fn evaluate(&self, pond_id: u32, current: &SensorSnapshot, history: &[SensorSnapshot]) -> PredictionResponse {
        let config = &self.config;
        let thresholds = &config.thresholds;
        let weights = &config.wqi_weights;

        let classification = classifier::classify(current, self.registry.classifier(), config);
        let current_wqi = wqi::compute_wqi(current, thresholds, weights);
        let wqi_class = WqiClass::from_score(current_wqi);

        let forecasts = forecaster::forecast_all(current, history, &self.registry, config);
        let predicted_wqi: BTreeMap<Horizon, PredictedWqi> = forecasts
            .iter()
            .map(|(h, f)| (h, wqi::project(&f.snapshot, thresholds, weights)))
            .collect();

        let alerts = alerts::compose_alerts(
            alerts::current_alerts(current, thresholds),
            alerts::predictive_alerts(&forecasts, thresholds),
        );
        let forecast_flags = alerts::forecast_flags(&forecasts);

        let time_to_danger = risk::time_to_danger(current, &forecasts, thresholds);
        let night_safety = risk::night_safety(current, &forecasts, config);
        let worst = wqi::worst_parameter(current, thresholds, weights);
        let recovery = risk::recovery(current, current_wqi, &predicted_wqi, worst, config);

        let sensor_health = analysis::sensor_health(current, history);
        let trends = analysis::analyze_trends(current, history, thresholds);
        let recommendations = alerts::recommendations(&alerts, Some(&night_safety), wqi_class, &trends);

        let forecast_confidence: BTreeMap<Horizon, f64> = forecasts.iter().map(|(h, f)| (h, f.confidence)).collect();
        let nearest_forecast = forecasts
            .get(Horizon::H6)
            .map_or(forecaster::FALLBACK_CONFIDENCE, |f| f.confidence);
        let confidence = ConfidenceReport {
            sensor: sensor_health.confidence,
            classification: classification.confidence,
            forecast: forecast_confidence,
            overall: wqi::round_to(
                sensor_health
                    .confidence
                    .min(classification.confidence)
                    .min(nearest_forecast),
                3,
            ),
        };
        let urgency = alerts::urgency(&alerts);
        let critical_parameter = alerts::critical_parameter(&alerts);

        let using_trained_model = classification.model_kind.is_trained()
            && forecasts.is_complete()
            && forecasts.iter().all(|(_, f)| f.model_kind.is_trained());

        let model_info = ModelInfo {
            using_trained_model,
            classification_model: classification.model.clone(),
            forecast_models: forecasts.iter().map(|(h, f)| (h, f.model.clone())).collect(),
        };

        debug!(
            pond_id,
            wqi = current_wqi,
            alerts = alerts.len(),
            using_trained_model,
            "Prediction evaluated"
        );

        PredictionResponse {
            pond_id,
            current: CurrentStatus {
                wqi: current_wqi,
                wqi_class,
                status: WaterQualityStatus::from_score(current_wqi),
                sensors: *current,
            },
            forecasts: forecasts.iter().map(|(h, f)| (h, f.snapshot)).collect(),
            predicted_wqi,
            forecast_flags,
            alerts,
            recommendations,
            time_to_danger,
            night_safety: Some(night_safety),
            recovery: Some(recovery),
            sensor_health,
            trends,
            urgency,
            critical_parameter,
            confidence,
            classification,
            model_info,
            using_trained_model,
        }
    }
}

