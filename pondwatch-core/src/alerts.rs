//! Alerts, forecast plausibility flags and farmer-facing recommendations.

use crate::normalizer::{hard_bounds, within_hard_bounds};
use pondwatch_schemas::{
    alert::{Alert, AlertAction, AlertLevel, Recommendation, RecommendationType},
    classification::WqiClass,
    forecast::{ForecastFlag, ForecastSet},
    health::{OverallTrend, TrendReport},
    response::Urgency,
    risk::{NightSafety, RiskLevel},
    sensor::{Parameter, SensorSnapshot},
    thresholds::ThresholdTable,
};
use std::collections::HashSet;

pub const MAX_RECOMMENDATIONS: usize = 4;

fn action_for(parameter: Parameter, level: AlertLevel, low: bool) -> AlertAction {
    match (parameter, level, low) {
        (Parameter::DissolvedOxygen, AlertLevel::Critical, true) => AlertAction::ActivateAerator,
        (Parameter::DissolvedOxygen, AlertLevel::Warning, true) => AlertAction::IncreaseAeration,
        (Parameter::Ph, AlertLevel::Critical, true) => AlertAction::AddLime,
        (Parameter::Ph, AlertLevel::Critical, false) => AlertAction::WaterExchange,
        (Parameter::Temperature, AlertLevel::Critical, false) => AlertAction::EmergencyCooling,
        (Parameter::Ammonia, AlertLevel::Critical, _) => AlertAction::WaterExchange,
        (Parameter::Ammonia, AlertLevel::Warning, _) => AlertAction::ReduceFeeding,
        (Parameter::Nitrite, AlertLevel::Critical, _) => AlertAction::AddSalt,
        (Parameter::Nitrite, AlertLevel::Warning, _) => AlertAction::ReduceFeeding,
        (Parameter::Salinity, _, _) => AlertAction::AdjustSalinity,
        (Parameter::Turbidity, _, _) => AlertAction::ManageTurbidity,
        _ => AlertAction::Monitor,
    }
}

fn format_value(parameter: Parameter, value: f64) -> String {
    let decimals = match parameter {
        Parameter::Ammonia | Parameter::Nitrite => 2,
        _ => 1,
    };
    let unit = parameter.unit();
    if unit.is_empty() {
        format!("{:.*}", decimals, value)
    } else {
        format!("{:.*} {}", decimals, value, unit)
    }
}

/// One alert per parameter outside its acceptable range right now.
pub fn current_alerts(snapshot: &SensorSnapshot, thresholds: &ThresholdTable) -> Vec<Alert> {
    Parameter::ALL
        .iter()
        .filter_map(|parameter| {
            let range = thresholds.range(*parameter);
            let value = snapshot.get(*parameter);
            let low = value < range.optimal_min;
            let name = parameter.display_name();
            let shown = format_value(*parameter, value);

            if range.is_critical(value) {
                let threshold = if low { range.critical_min } else { range.critical_max };
                Some(Alert {
                    level: AlertLevel::Critical,
                    parameter: *parameter,
                    message: format!(
                        "CRITICAL: {} {} at {}",
                        name,
                        if low { "too low" } else { "too high" },
                        shown
                    ),
                    value,
                    threshold: Some(threshold),
                    action: action_for(*parameter, AlertLevel::Critical, low),
                    horizon: None,
                })
            } else if !range.is_acceptable(value) {
                let threshold = if low { range.acceptable_min } else { range.acceptable_max };
                Some(Alert {
                    level: AlertLevel::Warning,
                    parameter: *parameter,
                    message: format!("Warning: {} at {} outside acceptable range", name, shown),
                    value,
                    threshold: Some(threshold),
                    action: action_for(*parameter, AlertLevel::Warning, low),
                    horizon: None,
                })
            } else {
                None
            }
        })
        .collect()
}

/// One critical alert per parameter forecast to cross a critical bound,
/// at the earliest horizon where it does.
pub fn predictive_alerts(forecasts: &ForecastSet, thresholds: &ThresholdTable) -> Vec<Alert> {
    Parameter::ALL
        .iter()
        .filter_map(|parameter| {
            let range = thresholds.range(*parameter);
            forecasts.iter().find_map(|(horizon, forecast)| {
                let value = forecast.snapshot.get(*parameter);
                if !range.is_critical(value) {
                    return None;
                }
                let low = range.is_critical_low(value);
                Some(Alert {
                    level: AlertLevel::Critical,
                    parameter: *parameter,
                    message: format!(
                        "{} expected to reach {} within {}",
                        parameter.display_name(),
                        format_value(*parameter, value),
                        horizon.label()
                    ),
                    value,
                    threshold: Some(if low { range.critical_min } else { range.critical_max }),
                    action: action_for(*parameter, AlertLevel::Critical, low),
                    horizon: Some(horizon),
                })
            })
        })
        .collect()
}

/// Merges current and predictive alerts. At most one alert survives per
/// (parameter, level), and a current alert beats a predictive one.
/// Critical alerts come first.
pub fn compose_alerts(current: Vec<Alert>, predictive: Vec<Alert>) -> Vec<Alert> {
    let mut seen = HashSet::new();
    let mut alerts: Vec<Alert> = current
        .into_iter()
        .chain(predictive)
        .filter(|alert| seen.insert((alert.parameter, alert.level)))
        .collect();
    alerts.sort_by(|a, b| b.level.cmp(&a.level));
    alerts
}

/// Forecast values outside physical bounds. They are reported, not
/// clamped.
pub fn forecast_flags(forecasts: &ForecastSet) -> Vec<ForecastFlag> {
    forecasts
        .iter()
        .flat_map(|(horizon, forecast)| {
            Parameter::FORECAST_TARGETS.into_iter().filter_map(move |parameter| {
                let value = forecast.snapshot.get(parameter);
                if within_hard_bounds(parameter, value) {
                    return None;
                }
                let (min, max) = hard_bounds(parameter);
                Some(ForecastFlag {
                    horizon,
                    parameter,
                    value,
                    message: format!(
                        "{} forecast {} is outside the physical range [{}, {}]",
                        parameter.key(),
                        value,
                        min,
                        max
                    ),
                })
            })
        })
        .collect()
}

pub fn urgency(alerts: &[Alert]) -> Urgency {
    if alerts.iter().any(|a| a.is_critical()) {
        Urgency::Critical
    } else if !alerts.is_empty() {
        Urgency::Warning
    } else {
        Urgency::Normal
    }
}

/// The parameter to highlight: the first critical alert, else the first
/// alert of any level.
pub fn critical_parameter(alerts: &[Alert]) -> Option<Parameter> {
    alerts
        .iter()
        .find(|a| a.is_critical())
        .or_else(|| alerts.first())
        .map(|a| a.parameter)
}

fn action_recommendation(kind: RecommendationType, action: AlertAction) -> Recommendation {
    let (title, description) = match action {
        AlertAction::ActivateAerator => (
            "Activate All Aerators",
            "Run every aerator at full power until DO is back above 5 mg/L.",
        ),
        AlertAction::IncreaseAeration => (
            "Increase Aeration",
            "Turn on additional aerators or increase RPM by 20%.",
        ),
        AlertAction::AddLime => ("Apply Agricultural Lime", "Spread agricultural lime to raise pH."),
        AlertAction::WaterExchange => (
            "Water Exchange",
            "Replace 30% of pond water with fresh pre-treated water.",
        ),
        AlertAction::EmergencyCooling => (
            "Emergency Cooling",
            "Add cool fresh water and shade to bring the temperature down.",
        ),
        AlertAction::ReduceFeeding => (
            "Reduce Feed",
            "Cut feed amount by 50% until nitrogen levels normalize.",
        ),
        AlertAction::AddSalt => ("Add Salt", "Add salt to reduce nitrite toxicity."),
        AlertAction::AdjustSalinity => (
            "Adjust Salinity",
            "Blend in fresh or brackish water to bring salinity back into range.",
        ),
        AlertAction::ManageTurbidity => (
            "Manage Turbidity",
            "Check plankton density and suspended solids; adjust liming or exchange water.",
        ),
        AlertAction::Monitor => ("Monitor Closely", "Increase monitoring frequency for the flagged parameter."),
    };
    Recommendation::new(kind, title, description)
}

fn class_recommendations(class: WqiClass) -> Vec<Recommendation> {
    match class {
        WqiClass::Good => vec![Recommendation::new(
            RecommendationType::Info,
            "Optimal Conditions",
            "Water quality is excellent. Maintain current management practices.",
        )],
        WqiClass::Medium => vec![Recommendation::new(
            RecommendationType::Warning,
            "Monitor Closely",
            "Water quality is acceptable but trending. Increase monitoring frequency.",
        )],
        WqiClass::Bad => vec![
            Recommendation::new(
                RecommendationType::Warning,
                "Intervention Required",
                "Water quality degraded. Consider partial water exchange (20-30%).",
            ),
            Recommendation::new(
                RecommendationType::Action,
                "Reduce Feeding",
                "Reduce feed amount by 30% to decrease organic load.",
            ),
        ],
        WqiClass::VeryBad => vec![
            Recommendation::new(
                RecommendationType::Critical,
                "Emergency Response",
                "Critical water quality! Immediate water exchange (40-50%) recommended.",
            ),
            Recommendation::new(
                RecommendationType::Critical,
                "Activate All Aerators",
                "Run aerators at maximum capacity to improve oxygen levels.",
            ),
        ],
    }
}

/// Ordered: critical alerts, night safety, warning alerts, class tips,
/// then the trend tip. Titles are unique and the list is capped.
pub fn recommendations(
    alerts: &[Alert],
    night: Option<&NightSafety>,
    class: WqiClass,
    trends: &TrendReport,
) -> Vec<Recommendation> {
    let mut candidates = Vec::new();

    for alert in alerts.iter().filter(|a| a.is_critical()) {
        candidates.push(action_recommendation(RecommendationType::Critical, alert.action));
    }

    if let Some(night) = night {
        if night.risk_level != RiskLevel::Safe {
            let kind = if night.risk_level == RiskLevel::Critical {
                RecommendationType::Critical
            } else {
                RecommendationType::Warning
            };
            let description = format!(
                "DO may fall to {:.2} mg/L before dawn. Set aerators to {} overnight.",
                night.predicted_night_do,
                night.aerator_setting.label()
            );
            candidates.push(Recommendation::new(kind, "Night Aeration", &description));
        }
    }

    for alert in alerts.iter().filter(|a| !a.is_critical()) {
        candidates.push(action_recommendation(RecommendationType::Action, alert.action));
    }

    candidates.extend(class_recommendations(class));

    if trends.overall == OverallTrend::Deteriorating {
        candidates.push(Recommendation::new(
            RecommendationType::Warning,
            "Deteriorating Trend",
            "Water quality is declining. Take preventive action now.",
        ));
    }

    let mut titles = HashSet::new();
    candidates
        .into_iter()
        .filter(|r| titles.insert(r.title.clone()))
        .take(MAX_RECOMMENDATIONS)
        .collect()
}
