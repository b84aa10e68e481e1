use crate::config::AppConfig;
use crate::request;
use anyhow::{Context, Result};
use pondwatch_core::{analysis, Predictor, PredictorBuilder};
use pondwatch_schemas::{
    response::{BatchResponse, ModelInfo, PredictionResponse},
    sensor::Parameter,
};
use serde::Serialize;
use std::path::Path;

/// Builds a predictor from the resolved application config.
pub fn build_predictor(config: &AppConfig) -> Result<Predictor> {
    let mut builder = PredictorBuilder::new().with_config(config.predictor.clone());
    if let Some(dir) = &config.model_dir {
        builder = builder.with_model_dir(dir);
    }
    if let Some(log) = &config.log_csv {
        let log = log.to_str().context("Prediction log path is not valid UTF-8")?;
        builder = builder.with_prediction_log_to_file(log);
    }
    Ok(builder.build()?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Predicts a single pond and prints the response.
pub fn run_predict(config: &AppConfig, input: &Path, report: bool) -> Result<()> {
    let request = request::load_single(input)?;
    let predictor = build_predictor(config)?;
    let response = predictor
        .predict(&request)
        .with_context(|| format!("Prediction failed for pond {}", request.pond_id))?;

    if report {
        print_pond_report(&response);
    } else {
        print_json(&response)?;
    }
    Ok(())
}

/// Predicts every pond in the input and prints the ranked batch.
pub fn run_batch(config: &AppConfig, input: &Path, report: bool) -> Result<()> {
    let requests = request::load_requests(input)?;
    let predictor = build_predictor(config)?;
    let batch = predictor.predict_batch(&requests)?;

    if report {
        print_batch_report(&batch);
    } else {
        print_json(&batch)?;
    }
    Ok(())
}

/// Prints which models the predictor would use and the thresholds and
/// weights in effect.
pub fn run_info(config: &AppConfig) -> Result<()> {
    let predictor = build_predictor(config)?;
    let models: ModelInfo = predictor.model_info();
    print_json(&serde_json::json!({
        "models": models,
        "thresholds": &predictor.config().thresholds,
        "wqi_weights": &predictor.config().wqi_weights,
    }))
}

/// Prints an aggregate view of a prediction log.
pub fn run_summary(log: &Path) -> Result<()> {
    let path = log.to_str().context("Prediction log path is not valid UTF-8")?;
    let summary = analysis::summarize_log(path)?;

    println!("\n--- [Prediction Log Summary] ---");
    println!("========================================");
    println!("Log: {}", log.display());
    println!("  - Predictions:     {}", summary.rows);
    println!("  - Ponds:           {}", summary.ponds);
    println!("  - Average WQI:     {:.1}", summary.average_wqi);
    println!("  - Critical rows:   {}", summary.critical_rows);
    if let Some((pond_id, wqi)) = summary.worst {
        println!("  - Lowest WQI:      {:.1} (pond {})", wqi, pond_id);
    }
    println!("\nBy class:");
    for (class, count) in &summary.by_class {
        println!("  - {:<10} {}", class, count);
    }
    println!("========================================");
    Ok(())
}

fn print_pond_report(response: &PredictionResponse) {
    let current = &response.current;

    println!("\n--- [Pond {} Report] ---", response.pond_id);
    println!("Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("========================================");
    println!(
        "WQI: {:.1} ({}) | Status: {:?} | Urgency: {}",
        current.wqi,
        current.wqi_class.label(),
        current.status,
        response.urgency.label()
    );
    println!(
        "Classifier: {} -> {} ({:.0}% confidence)",
        response.classification.model,
        response.classification.wqi_class.label(),
        response.classification.confidence * 100.0
    );

    println!("\nSensors:");
    for parameter in Parameter::ALL {
        println!(
            "  - {:<18} {:>8.2} {}",
            parameter.display_name(),
            current.sensors.get(parameter),
            parameter.unit()
        );
    }

    println!("\nForecasts:");
    for (horizon, snapshot) in &response.forecasts {
        let projected = response.predicted_wqi.get(horizon);
        println!(
            "  - {:<4} DO {:>5.2} | pH {:>5.2} | Temp {:>5.2} | WQI {}",
            horizon.label(),
            snapshot.get(Parameter::DissolvedOxygen),
            snapshot.get(Parameter::Ph),
            snapshot.get(Parameter::Temperature),
            projected.map_or("n/a".to_string(), |p| format!("{:.1} ({})", p.value, p.class.label()))
        );
    }

    println!("----------------------------------------");
    if let Some(danger) = &response.time_to_danger {
        println!("Time to danger: {}", danger.message);
    }
    if let Some(night) = &response.night_safety {
        println!(
            "Night DO: {:.2} mg/L (margin {:+.2}) | Aerators: {}",
            night.predicted_night_do,
            night.safety_margin,
            night.aerator_setting.label()
        );
    }
    if let Some(recovery) = &response.recovery {
        println!("Recovery: {}", recovery.message);
    }

    println!("\nAlerts:");
    if response.alerts.is_empty() {
        println!("  - None");
    }
    for alert in &response.alerts {
        let when = alert.horizon.map_or("now".to_string(), |h| h.label().to_string());
        println!("  - [{:?}] {} ({})", alert.level, alert.message, when);
    }

    println!("\nRecommendations:");
    for rec in &response.recommendations {
        println!("  - {}: {}", rec.title, rec.description);
    }

    println!(
        "\nConfidence: {:.0}% | Trained models: {}",
        response.confidence.overall * 100.0,
        if response.using_trained_model { "yes" } else { "no" }
    );
    println!("========================================");
}

fn print_batch_report(batch: &BatchResponse) {
    let summary = &batch.summary;

    println!("\n--- [Farm Summary Report] ---");
    println!("Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("========================================");
    println!("Status: {:?} | {}", summary.farm_status, summary.farm_message);
    println!("  - Ponds:            {}", summary.pond_count);
    println!("  - Average WQI:      {:.1}", summary.average_wqi);
    println!("  - Total alerts:     {}", summary.total_alerts);
    println!("  - Critical ponds:   {}", summary.critical_ponds);
    println!("----------------------------------------");

    println!("\nPonds (most urgent first):");
    for response in &batch.results {
        println!(
            "  - Pond {:<4} | WQI {:>5.1} ({:<9}) | {:<8} | {} alert(s){}",
            response.pond_id,
            response.current.wqi,
            response.current.wqi_class.label(),
            response.urgency.label(),
            response.alerts.len(),
            response
                .critical_parameter
                .map_or(String::new(), |p| format!(" | critical: {}", p.display_name()))
        );
    }

    if !batch.failures.is_empty() {
        println!("\nRejected readings:");
        for failure in &batch.failures {
            println!("  - Pond {}: {}", failure.pond_id, failure.error);
        }
    }
    println!("========================================");
}
