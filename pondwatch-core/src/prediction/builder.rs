use crate::{
    config::PredictorConfig, error::PondwatchError, logger::PredictionLogger, models::ModelRegistry,
    prediction::engine::Predictor,
};
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::info;

/// A fluent builder for constructing a `Predictor`.
///
/// Every part is optional: without a configuration the defaults are used,
/// and without models every stage runs its fallback.
#[derive(Default)]
pub struct PredictorBuilder {
    config: Option<PredictorConfig>,
    model_dir: Option<PathBuf>,
    registry: Option<ModelRegistry>,
    log_path: Option<String>,
}

impl PredictorBuilder {
    /// Creates a new, empty `PredictorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets thresholds, WQI weights, defaults and the fallback tuning.
    pub fn with_config(mut self, config: PredictorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Loads model artifacts from this directory at build time.
    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.model_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Uses an already assembled registry. Takes precedence over
    /// `with_model_dir`.
    pub fn with_registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends one CSV row per prediction to the specified file.
    pub fn with_prediction_log_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a ready `Predictor`.
    ///
    /// # Errors
    ///
    /// Returns a `PondwatchError` if the configuration is invalid or the
    /// prediction log cannot be created. Missing models are not errors.
    pub fn build(self) -> Result<Predictor, PondwatchError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let registry = match (self.registry, self.model_dir) {
            (Some(registry), _) => registry,
            (None, Some(dir)) => ModelRegistry::load(&dir),
            (None, None) => ModelRegistry::empty(),
        };
        info!(
            trained = registry.is_complete(),
            classifier = %registry.classifier_name(),
            "Predictor ready"
        );

        let logger = match self.log_path {
            Some(path) => Some(Mutex::new(
                PredictionLogger::new(&path).map_err(|e| PondwatchError::FileIO(path.clone(), e))?,
            )),
            None => None,
        };

        Ok(Predictor {
            config,
            registry,
            logger,
        })
    }
}
