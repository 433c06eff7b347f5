//! `paypal-standard` command-line tool.
//!
//! Builds payment button fields from an order file, verifies IPN messages
//! against PayPal and reports whether the configured credentials are usable.
//!
//! # Exit codes
//!
//! - `0`: success (for `verify`, PayPal answered `VERIFIED`)
//! - `1`: `verify` got `INVALID`, or `check` found a failing check
//! - `2`: any error

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use paypal_standard::config::IntegrationConfig;
use tokio::io::AsyncReadExt;
use tracing::error;

mod commands;
mod observability;

use commands::CliError;
use observability::{HealthStatus, LogFormat, init_observability};

/// PayPal Website Payments Standard tooling.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the integration configuration file
    #[arg(short, long, global = true, env = "PAYPAL_STANDARD_CONFIG", default_value = "paypal.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the payment form fields for an order as JSON
    Form {
        /// Order file (TOML checkout request)
        #[arg(short, long)]
        order: PathBuf,

        /// Seal the fields into an encrypted button
        #[arg(long)]
        encrypt: bool,
    },
    /// Verify a recurring-payment notification with PayPal
    Verify {
        /// File holding the raw notification body; stdin when absent
        #[arg(short, long)]
        body: Option<PathBuf>,
    },
    /// Report whether the account and credentials are usable
    Check,
}

async fn read_body(path: Option<PathBuf>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) => tokio::fs::read(&path)
            .await
            .map_err(|source| CliError::Io { path: path.display().to_string(), source }),
        None => {
            let mut body = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut body)
                .await
                .map_err(|source| CliError::Io { path: "<stdin>".to_owned(), source })?;
            Ok(body)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, CliError> {
    let config = IntegrationConfig::from_file(&args.config)?;

    match args.command {
        Command::Form { order, encrypt } => {
            println!("{}", commands::form(&config, &order, encrypt)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { body } => {
            let body = read_body(body).await?;
            let outcome = commands::verify(&config, body).await?;
            println!("{}", outcome.output);
            Ok(if outcome.verified { ExitCode::SUCCESS } else { ExitCode::from(1) })
        }
        Command::Check => {
            let report = commands::check(&config);
            println!("{}", report.to_json()?);
            Ok(if report.status == HealthStatus::Unhealthy {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
