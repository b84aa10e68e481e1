//! Advisory risk estimates: time to danger, overnight DO, and recovery.
//!
//! None of these fail. A missing input yields `None` or a conservative
//! default.

use crate::{config::PredictorConfig, wqi::round_to};
use pondwatch_schemas::{
    forecast::{ForecastSet, Horizon, PredictedWqi},
    risk::{AeratorSetting, DangerType, NightSafety, RecoveryBasis, RecoveryEstimate, RiskLevel, TimeToDanger},
    sensor::{Parameter, SensorSnapshot},
    thresholds::ThresholdTable,
};
use std::collections::BTreeMap;

/// A crossing at the nearest horizon leaves no time for a later check.
const IMMINENT_HOURS: u32 = 6;
const NIGHT_WARNING_MARGIN: f64 = 1.5;
const EXCHANGE_WQI: f64 = 40.0;
const AERATION_DO: f64 = 5.0;
const FEED_CUT_AMMONIA: f64 = 0.1;

/// The first dangerous condition in `snapshot`. DO is checked first and
/// wins over pH and Temperature.
pub fn danger_in(snapshot: &SensorSnapshot, thresholds: &ThresholdTable) -> Option<(Parameter, DangerType)> {
    let dissolved_oxygen = thresholds.range(Parameter::DissolvedOxygen);
    if dissolved_oxygen.is_critical_low(snapshot.dissolved_oxygen) {
        return Some((Parameter::DissolvedOxygen, DangerType::CriticalLow));
    }
    if thresholds.range(Parameter::Ph).is_critical(snapshot.ph) {
        return Some((Parameter::Ph, DangerType::OutOfRange));
    }
    if thresholds.range(Parameter::Temperature).is_critical_high(snapshot.temperature) {
        return Some((Parameter::Temperature, DangerType::CriticalHigh));
    }
    None
}

pub fn time_to_danger(
    current: &SensorSnapshot,
    forecasts: &ForecastSet,
    thresholds: &ThresholdTable,
) -> Option<TimeToDanger> {
    if let Some((parameter, _)) = danger_in(current, thresholds) {
        return Some(TimeToDanger {
            is_safe: false,
            hours_remaining: Some(0),
            critical_parameter: Some(parameter),
            status: RiskLevel::Critical,
            danger_type: Some(DangerType::AlreadyCritical),
            message: format!("CRITICAL: {} is already dangerous!", parameter.display_name()),
        });
    }

    if !forecasts.is_complete() {
        return None;
    }

    let first_crossing = forecasts
        .iter()
        .find_map(|(horizon, forecast)| danger_in(&forecast.snapshot, thresholds).map(|d| (horizon, d)));

    Some(match first_crossing {
        Some((horizon, (parameter, danger_type))) => {
            let hours = horizon.hours();
            TimeToDanger {
                is_safe: false,
                hours_remaining: Some(hours),
                critical_parameter: Some(parameter),
                status: if hours <= IMMINENT_HOURS {
                    RiskLevel::Critical
                } else {
                    RiskLevel::Warning
                },
                danger_type: Some(danger_type),
                message: format!(
                    "Warning: {} will become dangerous in ~{} hours",
                    parameter.display_name(),
                    hours
                ),
            }
        }
        None => TimeToDanger {
            is_safe: true,
            hours_remaining: None,
            critical_parameter: None,
            status: RiskLevel::Safe,
            danger_type: None,
            message: "Water quality will remain safe for 24+ hours".to_string(),
        },
    })
}

/// Projects the pre-dawn DO trough. Without photosynthesis, respiration
/// takes `night_drop_fraction` of the evening DO.
pub fn night_safety(current: &SensorSnapshot, forecasts: &ForecastSet, config: &PredictorConfig) -> NightSafety {
    let evening_do = forecasts
        .get(Horizon::H6)
        .map_or(current.dissolved_oxygen, |f| f.snapshot.dissolved_oxygen.min(current.dissolved_oxygen));
    let trough = evening_do * (1.0 - config.night_drop_fraction);
    let critical_min = config.thresholds.range(Parameter::DissolvedOxygen).critical_min;
    let margin = trough - critical_min;
    let is_safe = trough >= critical_min;

    let risk_level = if !is_safe {
        RiskLevel::Critical
    } else if margin < NIGHT_WARNING_MARGIN {
        RiskLevel::Warning
    } else {
        RiskLevel::Safe
    };

    let aerator_setting = if !is_safe {
        AeratorSetting::Maximum
    } else if margin < 1.0 {
        AeratorSetting::High
    } else if margin < 2.0 {
        AeratorSetting::Moderate
    } else {
        AeratorSetting::Normal
    };

    let message = match risk_level {
        RiskLevel::Critical => "HIGH RISK: DO will drop critically low tonight. Run aerators at maximum!",
        RiskLevel::Warning => "Moderate risk: Increase aeration during night hours",
        RiskLevel::Safe => "Night safety: DO levels should remain safe",
    };

    NightSafety {
        current_do: current.dissolved_oxygen,
        predicted_night_do: round_to(trough, 2),
        is_night_safe: is_safe,
        safety_margin: round_to(margin, 2),
        risk_level,
        aerator_setting,
        message: message.to_string(),
    }
}

/// The action for the weakest parameter first, then every other triggered
/// action: aeration below 5 mg/L DO, a water exchange below WQI 40 and a
/// feed cut above 0.1 mg/L ammonia. No action is listed twice.
pub fn recovery_actions(
    current: &SensorSnapshot,
    current_wqi: f64,
    worst: Option<Parameter>,
    thresholds: &ThresholdTable,
) -> Vec<String> {
    let mut actions = Vec::new();
    if let Some(parameter) = worst {
        let range = thresholds.range(parameter);
        let low = current.get(parameter) < range.optimal_min;
        let action = match (parameter, low) {
            (Parameter::DissolvedOxygen, _) => "Activate all aerators",
            (Parameter::Ph, true) => "Apply agricultural lime to raise pH",
            (Parameter::Ph, false) => "Exchange water to bring pH down",
            (Parameter::Temperature, true) => "Reduce water exchange to retain heat",
            (Parameter::Temperature, false) => "Add shade or cool fresh water",
            (Parameter::Ammonia, _) => "Reduce feeding by 50%",
            (Parameter::Nitrite, _) => "Add salt to reduce nitrite toxicity",
            (Parameter::Salinity, _) => "Adjust salinity with fresh or brackish water",
            (Parameter::Turbidity, _) => "Manage turbidity with liming or plankton control",
        };
        actions.push(action.to_string());
    }

    let triggered = [
        (current.dissolved_oxygen < AERATION_DO, "Activate all aerators"),
        (current_wqi < EXCHANGE_WQI, "Perform 30% water exchange"),
        (current.ammonia > FEED_CUT_AMMONIA, "Reduce feeding by 50%"),
    ];
    for (_, action) in triggered.iter().filter(|(fired, _)| *fired) {
        if !actions.iter().any(|a| a == action) {
            actions.push(action.to_string());
        }
    }
    actions
}

pub fn recovery(
    current: &SensorSnapshot,
    current_wqi: f64,
    predicted_wqi: &BTreeMap<Horizon, PredictedWqi>,
    worst: Option<Parameter>,
    config: &PredictorConfig,
) -> RecoveryEstimate {
    let target = config.recovery_target_wqi;
    if current_wqi >= target {
        return RecoveryEstimate {
            needs_recovery: false,
            current_wqi,
            target_wqi: target,
            estimated_hours: None,
            recovery_rate: None,
            basis: None,
            worst_parameter: worst,
            required_actions: Vec::new(),
            message: "Water quality is already at target level".to_string(),
        };
    }

    let best_slope = predicted_wqi
        .iter()
        .map(|(horizon, predicted)| (predicted.value - current_wqi) / horizon.hours() as f64)
        .filter(|slope| *slope > 0.0)
        .fold(None, |best: Option<f64>, slope| Some(best.map_or(slope, |b| b.max(slope))));

    let (rate, basis) = match best_slope {
        Some(slope) => (slope, RecoveryBasis::ForecastTrend),
        None => (config.managed_recovery_rate, RecoveryBasis::ManagedIntervention),
    };
    let gap = target - current_wqi;
    let hours = (gap / rate).ceil() as u32;

    let message = match basis {
        RecoveryBasis::ForecastTrend => format!("Estimated {} hours to reach target WQI at the forecast trend", hours),
        RecoveryBasis::ManagedIntervention => {
            format!("Estimated {} hours to reach target WQI with proper intervention", hours)
        }
    };

    RecoveryEstimate {
        needs_recovery: true,
        current_wqi,
        target_wqi: target,
        estimated_hours: Some(hours),
        recovery_rate: Some(round_to(rate, 3)),
        basis: Some(basis),
        worst_parameter: worst,
        required_actions: recovery_actions(current, current_wqi, worst, &config.thresholds),
        message,
    }
}
