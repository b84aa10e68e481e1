use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod request;
mod workflow;

/// Water-quality prediction for shrimp ponds.
#[derive(Parser, Debug)]
#[command(name = "pondwatch", version, about)]
struct Cli {
    /// YAML file with thresholds, WQI weights, defaults and drift rules.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the classifier and forecaster artifacts.
    #[arg(long, global = true)]
    models: Option<PathBuf>,

    /// Append one CSV row per prediction to this file.
    #[arg(long, global = true)]
    log_csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict one pond from a JSON or CSV reading ("-" reads stdin).
    Predict {
        input: PathBuf,
        /// Print a readable report instead of JSON.
        #[arg(long)]
        report: bool,
    },
    /// Predict every pond in the input and rank them by urgency.
    Batch {
        input: PathBuf,
        #[arg(long)]
        report: bool,
    },
    /// Show which models are loaded.
    Info,
    /// Summarise a prediction log written with --log-csv.
    Summary { log: PathBuf },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app_config = config::AppConfig::load(cli.config.as_deref())?.with_overrides(cli.models, cli.log_csv);

    match cli.command {
        Command::Predict { input, report } => workflow::run_predict(&app_config, &input, report),
        Command::Batch { input, report } => workflow::run_batch(&app_config, &input, report),
        Command::Info => workflow::run_info(&app_config),
        Command::Summary { log } => workflow::run_summary(&log),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["pondwatch", "predict", "pond.json", "--models", "models", "--report"]);
        assert_eq!(cli.models, Some(PathBuf::from("models")));
        match cli.command {
            Command::Predict { input, report } => {
                assert_eq!(input, PathBuf::from("pond.json"));
                assert!(report);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
