//! Loads the classifier and the per-horizon forecasters from a model
//! directory.
//!
//! A missing or unusable artifact is never fatal: it is logged and its slot
//! stays empty, which sends that stage down its fallback path.

use super::LoadedModel;
use crate::error::PondwatchError;
use pondwatch_schemas::{
    classification::{ModelKind, WqiClass},
    file_formats::{forecaster_file_name, ClassifierFile, ClassifierOutput, ForecasterFile, CLASSIFIER_FILE},
    forecast::Horizon,
    sensor::{Parameter, SensorSnapshot},
};
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};
use tracing::{info, warn};

pub const DEFAULT_FORECAST_CONFIDENCE: f64 = 0.85;

/// Where a model input comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureSource {
    Sensor(Parameter),
    /// A training-only column the ponds do not measure, fed its training
    /// median.
    Constant(f64),
}

impl FeatureSource {
    pub fn resolve(name: &str) -> Option<Self> {
        if let Some(parameter) = Parameter::from_feature_name(name) {
            return Some(FeatureSource::Sensor(parameter));
        }
        let stem: String = name
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let median = match stem.as_str() {
            "bod" => 3.5,
            "co2" => 5.0,
            "alkalinity" => 120.0,
            "hardness" => 150.0,
            "calcium" => 50.0,
            "phosphorus" => 0.5,
            "h2s" => 0.01,
            "plankton" => 5000.0,
            _ => return None,
        };
        Some(FeatureSource::Constant(median))
    }

    pub fn value(&self, snapshot: &SensorSnapshot) -> f64 {
        match self {
            FeatureSource::Sensor(parameter) => snapshot.get(*parameter),
            FeatureSource::Constant(value) => *value,
        }
    }
}

fn resolve_features(model: &str, names: &[String]) -> Result<Vec<FeatureSource>, PondwatchError> {
    if names.is_empty() {
        return Err(PondwatchError::ModelUnavailable(
            model.to_string(),
            "artifact declares no features".to_string(),
        ));
    }
    names
        .iter()
        .map(|name| {
            FeatureSource::resolve(name).ok_or_else(|| {
                PondwatchError::ModelUnavailable(model.to_string(), format!("unknown feature '{}'", name))
            })
        })
        .collect()
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PondwatchError> {
    let display = path.display().to_string();
    if !path.is_file() {
        return Err(PondwatchError::ModelUnavailable(display, "file not found".to_string()));
    }
    let content = fs::read_to_string(path).map_err(|e| PondwatchError::FileIO(display.clone(), e))?;
    serde_json::from_str(&content).map_err(|e| PondwatchError::ModelUnavailable(display, e.to_string()))
}

#[derive(Debug)]
pub struct ClassifierModel {
    pub model: LoadedModel,
    pub features: Vec<FeatureSource>,
    /// Class of each model output, in output order.
    pub classes: Vec<WqiClass>,
    pub output: ClassifierOutput,
}

impl ClassifierModel {
    pub fn from_file(file: ClassifierFile) -> Result<Self, PondwatchError> {
        let features = resolve_features(&file.name, &file.features)?;
        let classes = file
            .classes
            .iter()
            .map(|label| {
                WqiClass::from_label(label).ok_or_else(|| {
                    PondwatchError::ModelUnavailable(file.name.clone(), format!("unknown class label '{}'", label))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let model = LoadedModel::new(&file.name, &file.model, file.scaler, features.len())?;
        if model.output_len() != classes.len() {
            return Err(PondwatchError::ModelShape {
                model: file.name,
                expected: classes.len(),
                actual: model.output_len(),
            });
        }

        Ok(Self {
            model,
            features,
            classes,
            output: file.output,
        })
    }

    pub fn load(path: &Path) -> Result<Self, PondwatchError> {
        Self::from_file(read_artifact(path)?)
    }

    pub fn feature_vector(&self, snapshot: &SensorSnapshot) -> Vec<f64> {
        self.features.iter().map(|f| f.value(snapshot)).collect()
    }
}

#[derive(Debug)]
pub struct ForecasterModel {
    pub model: LoadedModel,
    pub horizon: Horizon,
    pub n_lags: usize,
    /// Features of a single reading; the input is `n_lags` of these.
    pub features: Vec<FeatureSource>,
    pub targets: Vec<Parameter>,
    pub confidence: f64,
}

impl ForecasterModel {
    pub fn from_file(file: ForecasterFile) -> Result<Self, PondwatchError> {
        let horizon = Horizon::from_hours(file.horizon_hours).ok_or_else(|| {
            PondwatchError::ModelUnavailable(
                file.name.clone(),
                format!("unsupported horizon {}h", file.horizon_hours),
            )
        })?;
        if file.n_lags == 0 {
            return Err(PondwatchError::ModelUnavailable(
                file.name,
                "n_lags must be at least 1".to_string(),
            ));
        }

        let mut targets = file.targets.clone();
        targets.sort();
        targets.dedup();
        let mut expected = Parameter::FORECAST_TARGETS.to_vec();
        expected.sort();
        if targets != expected || file.targets.len() != expected.len() {
            return Err(PondwatchError::ModelUnavailable(
                file.name,
                "targets must be exactly pH, DO, Temperature and Salinity".to_string(),
            ));
        }

        let confidence = file.confidence.unwrap_or(DEFAULT_FORECAST_CONFIDENCE);
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PondwatchError::ModelUnavailable(
                file.name,
                format!("confidence {} is outside [0, 1]", confidence),
            ));
        }

        let features = resolve_features(&file.name, &file.features)?;
        let model = LoadedModel::new(&file.name, &file.model, file.scaler, features.len() * file.n_lags)?;
        if model.output_len() != file.targets.len() {
            return Err(PondwatchError::ModelShape {
                model: file.name,
                expected: file.targets.len(),
                actual: model.output_len(),
            });
        }

        Ok(Self {
            model,
            horizon,
            n_lags: file.n_lags,
            features,
            targets: file.targets,
            confidence,
        })
    }

    pub fn load(path: &Path) -> Result<Self, PondwatchError> {
        Self::from_file(read_artifact(path)?)
    }

    /// Flattens a lag window, oldest reading first.
    pub fn feature_vector(&self, window: &[SensorSnapshot]) -> Vec<f64> {
        window
            .iter()
            .flat_map(|snapshot| self.features.iter().map(move |f| f.value(snapshot)))
            .collect()
    }
}

/// The models available to a predictor. Read-only once built.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    classifier: Option<Arc<ClassifierModel>>,
    forecasters: BTreeMap<Horizon, Arc<ForecasterModel>>,
}

impl ModelRegistry {
    /// A registry with no models; every stage uses its fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads whatever artifacts in `dir` are usable.
    pub fn load(dir: &Path) -> Self {
        let mut registry = Self::empty();

        match ClassifierModel::load(&dir.join(CLASSIFIER_FILE)) {
            Ok(classifier) => {
                info!(
                    model = classifier.model.name(),
                    kind = ?classifier.model.kind(),
                    "Loaded classification model"
                );
                registry.classifier = Some(Arc::new(classifier));
            }
            Err(e) => warn!(error = %e, "Classification model unavailable, using rule-based classifier"),
        }

        for horizon in Horizon::ALL {
            let path = dir.join(forecaster_file_name(horizon.hours()));
            match ForecasterModel::load(&path) {
                Ok(forecaster) if forecaster.horizon != horizon => warn!(
                    path = %path.display(),
                    declared = forecaster.horizon.label(),
                    "Forecaster horizon does not match its file name, using drift fallback"
                ),
                Ok(forecaster) => {
                    info!(
                        horizon = horizon.label(),
                        model = forecaster.model.name(),
                        kind = ?forecaster.model.kind(),
                        "Loaded forecast model"
                    );
                    registry.forecasters.insert(horizon, Arc::new(forecaster));
                }
                Err(e) => warn!(
                    horizon = horizon.label(),
                    error = %e,
                    "Forecast model unavailable, using drift fallback"
                ),
            }
        }

        registry
    }

    pub fn with_classifier(mut self, classifier: ClassifierModel) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    pub fn with_forecaster(mut self, forecaster: ForecasterModel) -> Self {
        self.forecasters.insert(forecaster.horizon, Arc::new(forecaster));
        self
    }

    pub fn classifier(&self) -> Option<&ClassifierModel> {
        self.classifier.as_deref()
    }

    pub fn forecaster(&self, horizon: Horizon) -> Option<&ForecasterModel> {
        self.forecasters.get(&horizon).map(|f| f.as_ref())
    }

    /// True when the classifier and all three forecasters are loaded.
    pub fn is_complete(&self) -> bool {
        self.classifier.is_some() && Horizon::ALL.iter().all(|h| self.forecasters.contains_key(h))
    }

    pub fn classifier_name(&self) -> String {
        self.classifier
            .as_ref()
            .map_or_else(|| "rule_based".to_string(), |c| c.model.name().to_string())
    }

    pub fn forecaster_kind(&self, horizon: Horizon) -> ModelKind {
        self.forecaster(horizon)
            .map_or(ModelKind::DriftFallback, |f| f.model.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auxiliary_columns_take_training_medians() {
        assert_eq!(FeatureSource::resolve("BOD (mg/L)"), Some(FeatureSource::Constant(3.5)));
        assert_eq!(
            FeatureSource::resolve("Alkalinity (mg L-1 )"),
            Some(FeatureSource::Constant(120.0))
        );
        assert_eq!(FeatureSource::resolve("Plankton (No. L-1)"), Some(FeatureSource::Constant(5000.0)));
        assert_eq!(
            FeatureSource::resolve("DO(mg/L)"),
            Some(FeatureSource::Sensor(Parameter::DissolvedOxygen))
        );
        assert_eq!(FeatureSource::resolve("Chlorophyll"), None);
    }

    #[test]
    fn empty_directory_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::load(dir.path());
        assert!(registry.classifier().is_none());
        assert!(!registry.is_complete());
        assert_eq!(registry.classifier_name(), "rule_based");
        assert_eq!(registry.forecaster_kind(Horizon::H12), ModelKind::DriftFallback);
    }
}
