//! History-based analysis and farm-level aggregation: sensor health,
//! parameter trends, batch summaries and prediction-log summaries.

use crate::{error::PondwatchError, logger::LogEntry, wqi::round_to};
use pondwatch_schemas::{
    health::{
        OverallTrend, ParameterTrend, SensorHealth, SensorIssue, SensorIssueKind, TrendDirection, TrendQuality,
        TrendReport,
    },
    response::{FarmStatus, FarmSummary, PredictionResponse},
    sensor::{Parameter, SensorSnapshot},
    thresholds::ThresholdTable,
};
use std::collections::{BTreeMap, BTreeSet};

const IMPLAUSIBLE_PENALTY: f64 = 30.0;
const SUDDEN_CHANGE_PENALTY: f64 = 15.0;
const DRIFT_WINDOW: usize = 3;
const TREND_WINDOW: usize = 12;
const MIN_TREND_POINTS: usize = 3;
const DIRECTION_EPSILON: f64 = 0.01;

/// Ranges a working probe reports in a shrimp pond. Narrower than the
/// hard bounds the normaliser enforces.
fn plausible_range(parameter: Parameter) -> Option<(f64, f64, &'static str)> {
    match parameter {
        Parameter::Ph => Some((0.0, 14.0, "pH out of possible range")),
        Parameter::DissolvedOxygen => Some((0.0, 20.0, "DO reading impossible")),
        Parameter::Temperature => Some((10.0, 45.0, "Temperature reading unrealistic")),
        Parameter::Salinity => Some((0.0, 50.0, "Salinity reading out of range")),
        Parameter::Ammonia => Some((0.0, 5.0, "Ammonia reading unrealistic")),
        _ => None,
    }
}

fn drift_threshold(parameter: Parameter) -> Option<f64> {
    match parameter {
        Parameter::DissolvedOxygen => Some(2.0),
        Parameter::Ph => Some(0.5),
        Parameter::Temperature => Some(3.0),
        _ => None,
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Flags implausible values, and sudden jumps against the mean of the last
/// three history readings.
pub fn sensor_health(current: &SensorSnapshot, history: &[SensorSnapshot]) -> SensorHealth {
    let mut issues = Vec::new();
    let mut confidence = 100.0;

    for parameter in Parameter::ALL {
        if let Some((min, max, message)) = plausible_range(parameter) {
            let value = current.get(parameter);
            if value < min || value > max {
                issues.push(SensorIssue {
                    parameter,
                    kind: SensorIssueKind::ImplausibleValue,
                    message: message.to_string(),
                });
                confidence -= IMPLAUSIBLE_PENALTY;
            }
        }
    }

    if history.len() >= DRIFT_WINDOW {
        let recent = &history[history.len() - DRIFT_WINDOW..];
        for parameter in Parameter::ALL {
            let Some(threshold) = drift_threshold(parameter) else {
                continue;
            };
            let values: Vec<f64> = recent.iter().map(|s| s.get(parameter)).collect();
            let change = (current.get(parameter) - mean(&values)).abs();
            if change > threshold {
                issues.push(SensorIssue {
                    parameter,
                    kind: SensorIssueKind::SuddenChange,
                    message: format!("{} changed by {:.2} - possible sensor drift", parameter, change),
                });
                confidence -= SUDDEN_CHANGE_PENALTY;
            }
        }
    }

    let is_healthy = issues.is_empty();
    SensorHealth {
        is_healthy,
        confidence: round_to(f64::clamp(confidence, 0.0, 100.0) / 100.0, 2),
        issues,
        recommendation: if is_healthy {
            "Sensors operating normally".to_string()
        } else {
            "Calibrate sensors".to_string()
        },
    }
}

/// Least-squares slope of `values` against their index.
pub fn slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let (num, den) = values.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
        let dx = i as f64 - x_mean;
        (num + dx * (y - y_mean), den + dx * dx)
    });
    num / den
}

fn trend_quality(parameter: Parameter, slope: f64, current: f64, thresholds: &ThresholdTable) -> TrendQuality {
    let range = thresholds.range(parameter);
    let width = range.optimal_max - range.optimal_min;
    let normalized = if width > 0.0 { slope / (width / 10.0) } else { slope };

    match parameter {
        Parameter::DissolvedOxygen => {
            if normalized > 0.05 {
                TrendQuality::Improving
            } else if normalized < -0.05 {
                TrendQuality::Deteriorating
            } else {
                TrendQuality::Stable
            }
        }
        Parameter::Temperature => {
            if current < range.optimal_min {
                if slope > 0.0 {
                    TrendQuality::Improving
                } else {
                    TrendQuality::Deteriorating
                }
            } else if current > range.optimal_max {
                if slope < 0.0 {
                    TrendQuality::Improving
                } else {
                    TrendQuality::Deteriorating
                }
            } else {
                TrendQuality::Stable
            }
        }
        _ => {
            if normalized.abs() < 0.1 {
                TrendQuality::Stable
            } else if normalized.abs() < 0.2 {
                TrendQuality::Changing
            } else {
                TrendQuality::Unstable
            }
        }
    }
}

/// Trends over the last twelve readings, history then current.
pub fn analyze_trends(current: &SensorSnapshot, history: &[SensorSnapshot], thresholds: &ThresholdTable) -> TrendReport {
    let mut points: Vec<SensorSnapshot> = history.to_vec();
    points.push(*current);
    if points.len() > TREND_WINDOW {
        points.drain(..points.len() - TREND_WINDOW);
    }

    if points.len() < MIN_TREND_POINTS {
        return TrendReport {
            overall: OverallTrend::InsufficientData,
            parameters: BTreeMap::new(),
            message: "Need more data points for trend analysis".to_string(),
        };
    }

    let parameters: BTreeMap<Parameter, ParameterTrend> = Parameter::FORECAST_TARGETS
        .iter()
        .map(|parameter| {
            let values: Vec<f64> = points.iter().map(|s| s.get(*parameter)).collect();
            let rate = slope(&values);
            let now = current.get(*parameter);
            let direction = if rate > DIRECTION_EPSILON {
                TrendDirection::Increasing
            } else if rate < -DIRECTION_EPSILON {
                TrendDirection::Decreasing
            } else {
                TrendDirection::Stable
            };
            let trend = ParameterTrend {
                direction,
                rate: round_to(rate, 4),
                quality: trend_quality(*parameter, rate, now, thresholds),
                current: now,
                avg_recent: round_to(mean(&values[values.len() - DRIFT_WINDOW..]), 2),
            };
            (*parameter, trend)
        })
        .collect();

    let qualities: Vec<TrendQuality> = parameters.values().map(|t| t.quality).collect();
    let overall = if qualities.contains(&TrendQuality::Deteriorating) {
        OverallTrend::Deteriorating
    } else if qualities.contains(&TrendQuality::Improving) {
        OverallTrend::Improving
    } else {
        OverallTrend::Stable
    };

    let message = match overall {
        OverallTrend::Improving => "Water quality is improving",
        OverallTrend::Deteriorating => "Water quality is deteriorating - monitor closely",
        _ => "Water quality is stable",
    };

    TrendReport {
        overall,
        parameters,
        message: message.to_string(),
    }
}

/// Most urgent pond first: by critical alerts, then by total alerts.
pub fn sort_by_urgency(results: &mut [PredictionResponse]) {
    results.sort_by(|a, b| {
        b.critical_alert_count()
            .cmp(&a.critical_alert_count())
            .then_with(|| b.alerts.len().cmp(&a.alerts.len()))
    });
}

pub fn farm_summary(results: &[PredictionResponse]) -> FarmSummary {
    let total_alerts: usize = results.iter().map(|r| r.alerts.len()).sum();
    let critical_ponds = results.iter().filter(|r| r.critical_alert_count() > 0).count();
    let average_wqi = if results.is_empty() {
        0.0
    } else {
        round_to(results.iter().map(|r| r.current.wqi).sum::<f64>() / results.len() as f64, 1)
    };

    let (farm_status, farm_message) = if critical_ponds > 0 {
        (
            FarmStatus::Critical,
            format!("{} pond(s) need immediate attention!", critical_ponds),
        )
    } else if total_alerts > 0 {
        (
            FarmStatus::Warning,
            format!("{} alert(s) across farm - monitor closely", total_alerts),
        )
    } else {
        (FarmStatus::Healthy, "All ponds are in good condition".to_string())
    };

    FarmSummary {
        pond_count: results.len(),
        total_alerts,
        critical_ponds,
        average_wqi,
        farm_status,
        farm_message,
    }
}

/// Aggregate view over a prediction log written by `PredictionLogger`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogSummary {
    pub rows: usize,
    pub ponds: usize,
    pub average_wqi: f64,
    /// (pond_id, wqi) of the lowest WQI logged.
    pub worst: Option<(u32, f64)>,
    pub critical_rows: usize,
    pub by_class: BTreeMap<String, usize>,
}

pub fn summarize_log(log_path: &str) -> Result<LogSummary, PondwatchError> {
    let mut reader =
        csv::Reader::from_path(log_path).map_err(|e| PondwatchError::CsvError(log_path.to_string(), e))?;

    let mut summary = LogSummary::default();
    let mut ponds = BTreeSet::new();
    let mut wqi_total = 0.0;

    for result in reader.deserialize() {
        let entry: LogEntry = result.map_err(|e| PondwatchError::CsvError(log_path.to_string(), e))?;
        summary.rows += 1;
        ponds.insert(entry.pond_id);
        wqi_total += entry.wqi;
        if entry.critical_count > 0 {
            summary.critical_rows += 1;
        }
        *summary.by_class.entry(entry.wqi_class.clone()).or_insert(0) += 1;
        if summary.worst.map_or(true, |(_, wqi)| entry.wqi < wqi) {
            summary.worst = Some((entry.pond_id, entry.wqi));
        }
    }

    summary.ponds = ponds.len();
    if summary.rows > 0 {
        summary.average_wqi = round_to(wqi_total / summary.rows as f64, 1);
    }
    Ok(summary)
}
