use anyhow::{Context, Result};
use pondwatch_core::{config::load_yaml, PredictorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Settings read from the YAML config file. The predictor sections sit at
/// the top level next to the application settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_dir: Option<PathBuf>,
    pub log_csv: Option<PathBuf>,
    #[serde(flatten)]
    pub predictor: PredictorConfig,
}

impl AppConfig {
    /// Loads the config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        info!(path = %path.display(), "Loading configuration");
        let config: AppConfig =
            load_yaml(path).with_context(|| format!("Failed to load config from {:?}", path))?;
        config
            .predictor
            .validate()
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        Ok(config)
    }

    /// Command-line flags win over the file.
    pub fn with_overrides(mut self, model_dir: Option<PathBuf>, log_csv: Option<PathBuf>) -> Self {
        if model_dir.is_some() {
            self.model_dir = model_dir;
        }
        if log_csv.is_some() {
            self.log_csv = log_csv;
        }
        self
    }
}
