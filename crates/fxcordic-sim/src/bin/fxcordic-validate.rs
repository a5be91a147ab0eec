//! Run the fxcordic validation suite.
//!
//! ```text
//! fxcordic-validate [--config PATH] [--json]
//! ```
//!
//! Exits with status 1 on any tolerance violation and 2 on setup errors.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fxcordic_sim::{init_logging, HarnessResult, ValidationConfig, ValidationHarness};

#[derive(Parser, Debug)]
#[command(name = "fxcordic-validate", version, about = "Validate the fixed-point CORDIC engine against a floating-point reference")]
struct Args {
    /// Configuration file (default: search FXCORDIC_CONFIG, ./fxcordic.yaml, user and system config)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ValidationConfig::load_from(path),
        None => ValidationConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fxcordic-validate: {}", e);
            return ExitCode::from(2);
        }
    };

    if args.print_config {
        return match config.to_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("fxcordic-validate: {}", e);
                ExitCode::from(2)
            }
        };
    }

    init_logging(&config.logging);

    match run(&config, args.json) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!(error = %e, "validation aborted");
            eprintln!("fxcordic-validate: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(config: &ValidationConfig, json: bool) -> HarnessResult<bool> {
    let harness = ValidationHarness::from_config(config)?;
    let summary = harness.run_all()?;

    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary);
    }

    let passed = summary.passed();
    if let Err(e) = summary.into_result() {
        tracing::warn!("{}", e);
    }
    Ok(passed)
}
