//! Turns partial, loosely typed readings into complete snapshots.

use crate::{config::SensorDefaults, error::PondwatchError};
use pondwatch_schemas::sensor::{Parameter, RawValue, SensorReading, SensorSnapshot};

/// Physical limits a real probe can report. Anything outside is rejected.
pub fn hard_bounds(parameter: Parameter) -> (f64, f64) {
    match parameter {
        Parameter::Ph => (0.0, 14.0),
        Parameter::Temperature => (0.0, 50.0),
        Parameter::DissolvedOxygen => (0.0, 30.0),
        Parameter::Salinity => (0.0, 60.0),
        Parameter::Ammonia => (0.0, 10.0),
        Parameter::Nitrite => (0.0, 10.0),
        Parameter::Turbidity => (0.0, 500.0),
    }
}

pub fn within_hard_bounds(parameter: Parameter, value: f64) -> bool {
    let (min, max) = hard_bounds(parameter);
    value >= min && value <= max
}

/// Parses one raw value and checks it against the hard bounds.
pub fn parse_value(field: &str, parameter: Parameter, raw: &RawValue) -> Result<f64, PondwatchError> {
    let value = match raw {
        RawValue::Number(n) => *n,
        RawValue::Text(text) => text.trim().parse::<f64>().map_err(|_| {
            PondwatchError::validation(field, format!("'{}' is not a number", text))
        })?,
        RawValue::Other(other) => {
            return Err(PondwatchError::validation(field, format!("{} is not a number", other)));
        }
    };

    if !value.is_finite() {
        return Err(PondwatchError::validation(field, "value must be finite"));
    }
    if !within_hard_bounds(parameter, value) {
        let (min, max) = hard_bounds(parameter);
        return Err(PondwatchError::validation(
            field,
            format!("{} is outside the physical range [{}, {}]", value, min, max),
        ));
    }
    Ok(value)
}

/// Fills every parameter missing from `reading` with its default.
pub fn normalize(reading: &SensorReading, defaults: &SensorDefaults) -> Result<SensorSnapshot, PondwatchError> {
    normalize_onto(reading, defaults.snapshot(), "")
}

/// Normalises a history, oldest first. Gaps in a past reading take the
/// value of the current snapshot rather than the global default.
pub fn normalize_history(
    history: &[SensorReading],
    current: &SensorSnapshot,
) -> Result<Vec<SensorSnapshot>, PondwatchError> {
    history
        .iter()
        .enumerate()
        .map(|(i, reading)| normalize_onto(reading, *current, &format!("history[{}].", i)))
        .collect()
}

fn normalize_onto(
    reading: &SensorReading,
    base: SensorSnapshot,
    field_prefix: &str,
) -> Result<SensorSnapshot, PondwatchError> {
    let mut snapshot = base;
    for parameter in Parameter::ALL {
        if let Some(raw) = reading.get(parameter) {
            let field = format!("{}{}", field_prefix, parameter.key());
            snapshot = snapshot.with(parameter, parse_value(&field, parameter, raw)?);
        }
    }
    Ok(snapshot)
}
