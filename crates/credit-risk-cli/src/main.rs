use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use credit_risk_cli::serve::{run_server, ServeConfig, DEFAULT_ADDR};
use credit_risk_cli::train::{input, run_training};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or(
            "CREDIT_RISK_LOG",
            "error,credit_risk_core=info,credit_risk_cli=info",
        ))
        .init();

    let config_arg = || {
        Arg::new("config")
            .help("Path to the JSON pipeline configuration file. Defaults are used when omitted.")
            .required(false)
            .value_parser(clap::value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    };

    let matches = Command::new("credit-risk")
        .version(clap::crate_version!())
        .about("Loan default risk: train the model and serve predictions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Run ingestion, feature transformation and model selection")
                .arg(config_arg())
                .arg(
                    Arg::new("raw_data")
                        .short('d')
                        .long("raw-data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the raw dataset CSV. Overrides the raw data file \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for the train/test split, folds and oversampling."),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the prediction web form")
                .arg(config_arg())
                .arg(
                    Arg::new("addr")
                        .short('a')
                        .long("addr")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(format!("Address to listen on [default: {}]", DEFAULT_ADDR))
                        .value_hint(ValueHint::Other),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("serve", sub_m)) => handle_serve(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config = input::from_arguments(matches)?;
    log::info!(
        "[CreditRisk::Train] Experiment '{}'",
        config.experiment_name
    );

    match run_training(&config) {
        Ok(summary) => {
            println!(
                "Model training completed with F1 Score: {}",
                summary.f1_score()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            eprintln!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config = ServeConfig::from_arguments(matches)?;
    log::info!(
        "[CreditRisk::Serve] Artifacts: {} and {}",
        config.preprocessor.display(),
        config.model.display()
    );
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(run_server(config))
}
