//! Shared data types for pond water-quality prediction: sensor readings,
//! thresholds, classification and forecast results, alerts, and the model
//! artifact file formats.

pub mod alert;
pub mod classification;
pub mod file_formats;
pub mod forecast;
pub mod health;
pub mod response;
pub mod risk;
pub mod sensor;
pub mod thresholds;
