//! Water Quality Index projection.
//!
//! Each weighted parameter gets a sub-score: 100 inside its optimal range,
//! falling linearly to 0 at the critical bound on either side. The WQI is
//! the weighted sum of the sub-scores.

use crate::config::WqiWeights;
use pondwatch_schemas::{
    classification::WqiClass,
    forecast::PredictedWqi,
    sensor::{Parameter, SensorSnapshot},
    thresholds::{ParameterRange, ThresholdTable},
};
use std::collections::BTreeMap;

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn sub_score(range: &ParameterRange, value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if range.is_optimal(value) {
        return 100.0;
    }
    if value < range.optimal_min {
        if value <= range.critical_min {
            return 0.0;
        }
        100.0 * (value - range.critical_min) / (range.optimal_min - range.critical_min)
    } else {
        if value >= range.critical_max {
            return 0.0;
        }
        100.0 * (range.critical_max - value) / (range.critical_max - range.optimal_max)
    }
}

/// Sub-scores of the weighted parameters.
pub fn sub_scores(
    snapshot: &SensorSnapshot,
    thresholds: &ThresholdTable,
    weights: &WqiWeights,
) -> BTreeMap<Parameter, f64> {
    weights
        .entries()
        .into_iter()
        .map(|(parameter, _)| {
            (
                parameter,
                sub_score(thresholds.range(parameter), snapshot.get(parameter)),
            )
        })
        .collect()
}

/// WQI on a 0-100 scale, rounded to one decimal.
pub fn compute_wqi(snapshot: &SensorSnapshot, thresholds: &ThresholdTable, weights: &WqiWeights) -> f64 {
    let total: f64 = weights
        .entries()
        .into_iter()
        .map(|(parameter, weight)| weight * sub_score(thresholds.range(parameter), snapshot.get(parameter)))
        .sum();
    round_to(total.clamp(0.0, 100.0), 1)
}

pub fn project(snapshot: &SensorSnapshot, thresholds: &ThresholdTable, weights: &WqiWeights) -> PredictedWqi {
    let value = compute_wqi(snapshot, thresholds, weights);
    PredictedWqi {
        value,
        class: WqiClass::from_score(value),
    }
}

/// The weighted parameter with the lowest sub-score, if any is below 100.
/// Ties go to the heavier weight.
pub fn worst_parameter(
    snapshot: &SensorSnapshot,
    thresholds: &ThresholdTable,
    weights: &WqiWeights,
) -> Option<Parameter> {
    let mut worst: Option<(Parameter, f64)> = None;
    for (parameter, _) in weights.entries() {
        let score = sub_score(thresholds.range(parameter), snapshot.get(parameter));
        if score >= 100.0 {
            continue;
        }
        match worst {
            Some((_, lowest)) if lowest <= score => {}
            _ => worst = Some((parameter, score)),
        }
    }
    worst.map(|(parameter, _)| parameter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_score_falls_linearly_to_the_critical_bound() {
        let table = ThresholdTable::default();
        let dissolved_oxygen = table.range(Parameter::DissolvedOxygen);
        assert_eq!(sub_score(dissolved_oxygen, 6.0), 100.0);
        assert_eq!(sub_score(dissolved_oxygen, 3.5), 0.0);
        assert!((sub_score(dissolved_oxygen, 4.25) - 50.0).abs() < 1e-9);
        assert_eq!(sub_score(dissolved_oxygen, f64::NAN), 0.0);
    }

    #[test]
    fn round_to_one_decimal() {
        assert_eq!(round_to(64.96, 1), 65.0);
        assert_eq!(round_to(3.456, 2), 3.46);
    }
}
