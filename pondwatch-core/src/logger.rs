use csv::Writer;
use pondwatch_schemas::{forecast::Horizon, response::PredictionResponse};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// One row of the prediction log.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub pond_id: u32,
    pub wqi: f64,
    pub wqi_class: String,
    pub urgency: String,
    pub alert_count: usize,
    pub critical_count: usize,
    pub do_now: f64,
    pub do_6h: Option<f64>,
    pub do_12h: Option<f64>,
    pub do_24h: Option<f64>,
    pub hours_to_danger: Option<u32>,
    pub classification_model: String,
    pub using_trained_model: bool,
    pub sensors_json: String,
    pub alerts_json: String,
}

#[derive(Debug)]
pub struct PredictionLogger {
    writer: Writer<fs::File>,
}

impl PredictionLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_prediction(&mut self, response: &PredictionResponse) -> Result<(), anyhow::Error> {
        let forecast_do = |horizon: Horizon| response.forecasts.get(&horizon).map(|s| s.dissolved_oxygen);

        let entry = LogEntry {
            pond_id: response.pond_id,
            wqi: response.current.wqi,
            wqi_class: response.current.wqi_class.label().to_string(),
            urgency: response.urgency.label().to_string(),
            alert_count: response.alerts.len(),
            critical_count: response.critical_alert_count(),
            do_now: response.current.sensors.dissolved_oxygen,
            do_6h: forecast_do(Horizon::H6),
            do_12h: forecast_do(Horizon::H12),
            do_24h: forecast_do(Horizon::H24),
            hours_to_danger: response.time_to_danger.as_ref().and_then(|t| t.hours_remaining),
            classification_model: response.model_info.classification_model.clone(),
            using_trained_model: response.using_trained_model,
            sensors_json: serde_json::to_string(&response.current.sensors)?,
            alerts_json: serde_json::to_string(&response.alerts)?,
        };

        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
