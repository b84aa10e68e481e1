//! Water-quality prediction for shrimp ponds.
//!
//! A `Predictor` takes one pond's partial sensor reading and returns its
//! WQI and class, 6/12/24 hour forecasts, risk estimates, alerts and
//! recommendations. Trained models are loaded from JSON artifacts when
//! present; every stage has a deterministic fallback.

pub mod alerts;
pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod forecaster;
pub mod logger;
pub mod models;
pub mod normalizer;
pub mod prediction;
pub mod risk;
pub mod wqi;

pub use config::PredictorConfig;
pub use error::PondwatchError;
pub use models::ModelRegistry;
pub use prediction::{builder::PredictorBuilder, engine::Predictor};
