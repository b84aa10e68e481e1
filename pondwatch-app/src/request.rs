//! Reads prediction requests from JSON or CSV files.

use anyhow::{bail, Context, Result};
use pondwatch_schemas::sensor::{Parameter, PredictionRequest, RawValue, SensorReading};
use serde::Deserialize;
use std::{fs, io::Read, path::Path};

/// The shapes a JSON input file may take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Farm { ponds: Vec<PredictionRequest> },
    Many(Vec<PredictionRequest>),
    One(PredictionRequest),
}

/// One CSV row: a pond id and any subset of the seven parameters.
#[derive(Debug, Deserialize)]
struct CsvRow {
    pond_id: Option<u32>,
    #[serde(rename = "pH", alias = "ph", default)]
    ph: Option<String>,
    #[serde(rename = "Temperature", alias = "temperature", default)]
    temperature: Option<String>,
    #[serde(rename = "DO", alias = "dissolved_oxygen", default)]
    dissolved_oxygen: Option<String>,
    #[serde(rename = "Salinity", alias = "salinity", default)]
    salinity: Option<String>,
    #[serde(rename = "Ammonia", alias = "ammonia", default)]
    ammonia: Option<String>,
    #[serde(rename = "Nitrite", alias = "nitrite", default)]
    nitrite: Option<String>,
    #[serde(rename = "Turbidity", alias = "turbidity", default)]
    turbidity: Option<String>,
}

impl CsvRow {
    fn into_request(self, line: usize) -> PredictionRequest {
        let mut reading = SensorReading::default();
        let columns = [
            (Parameter::Ph, self.ph),
            (Parameter::Temperature, self.temperature),
            (Parameter::DissolvedOxygen, self.dissolved_oxygen),
            (Parameter::Salinity, self.salinity),
            (Parameter::Ammonia, self.ammonia),
            (Parameter::Nitrite, self.nitrite),
            (Parameter::Turbidity, self.turbidity),
        ];
        for (parameter, cell) in columns {
            if let Some(text) = cell.filter(|t| !t.trim().is_empty()) {
                reading.set(parameter, RawValue::Text(text));
            }
        }
        PredictionRequest::new(self.pond_id.unwrap_or(line as u32), reading)
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        return Ok(content);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn is_csv(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
}

/// Parses JSON requests: one object, an array, or `{"ponds": [...]}`.
pub fn parse_json(content: &str) -> Result<Vec<PredictionRequest>> {
    let input: JsonInput = serde_json::from_str(content).context("Failed to parse JSON request")?;
    Ok(match input {
        JsonInput::Farm { ponds } => ponds,
        JsonInput::Many(requests) => requests,
        JsonInput::One(request) => vec![request],
    })
}

/// Parses CSV requests, one pond per row. Rows without a `pond_id` are
/// numbered by position, starting at 1.
pub fn parse_csv(content: &str) -> Result<Vec<PredictionRequest>> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            let row = row.with_context(|| format!("Invalid CSV row {}", i + 1))?;
            Ok(row.into_request(i + 1))
        })
        .collect()
}

pub fn load_requests(path: &Path) -> Result<Vec<PredictionRequest>> {
    let content = read_source(path)?;
    let requests = if is_csv(path) {
        parse_csv(&content)?
    } else {
        parse_json(&content)?
    };
    if requests.is_empty() {
        bail!("No pond readings found in {:?}", path);
    }
    Ok(requests)
}

/// Loads exactly one request.
pub fn load_single(path: &Path) -> Result<PredictionRequest> {
    let mut requests = load_requests(path)?;
    if requests.len() > 1 {
        bail!(
            "{:?} holds {} ponds; use the batch command for more than one",
            path,
            requests.len()
        );
    }
    Ok(requests.remove(0))
}
