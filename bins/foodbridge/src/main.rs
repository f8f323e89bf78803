//! FoodBridge CLI - find nearby donated food and claim it for pickup

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use foodbridge_api_client::{ClientConfig, FoodbridgeClient, HttpRegistry, Session};
use foodbridge_core::config::Config;
use foodbridge_core::error::exit_codes;
use foodbridge_core::{Error, FailureKind};
use foodbridge_geo::Coordinate;
use foodbridge_search::{FinderSettings, FoodFinder};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use output::Status;

/// Find nearby donated food and claim it for pickup
#[derive(Parser)]
#[command(name = "foodbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available food near a location
    Search {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Search radius, clamped to 1-50 (uses the configured default if omitted)
        #[arg(short, long)]
        radius: Option<String>,
    },

    /// Claim a listing and receive a pickup code
    Claim {
        /// Listing id as shown by `search`
        id: String,

        /// Name the donor will see with the claim
        #[arg(short, long)]
        name: Option<String>,
    },
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("foodbridge=debug,foodbridge_core=debug,foodbridge_search=debug,foodbridge_api_client=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_finder(config: &Config) -> Result<FoodFinder<HttpRegistry>> {
    let client_config = ClientConfig::from_settings(&config.schema.api).map_err(Error::from)?;
    let client = FoodbridgeClient::with_config(client_config, Session::from_env())
        .map_err(Error::from)?;
    let settings = FinderSettings::from_config(&config.schema)?;
    Ok(FoodFinder::new(HttpRegistry::new(client), settings))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let finder = build_finder(&config)?;

    match cli.command {
        Commands::Search { lat, lon, radius } => {
            commands::search::run(&finder, Coordinate::new(lat, lon), radius.as_deref(), cli.format)
                .await
        }
        Commands::Claim { id, name } => {
            commands::claim::run(&finder, &id, name.as_deref(), cli.format).await
        }
    }
}

/// Map a failure onto the process exit code
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let Some(err) = err.downcast_ref::<Error>() else {
        return exit_codes::FAILURE;
    };
    match err.kind() {
        FailureKind::Validation => exit_codes::VALIDATION_ERROR,
        FailureKind::NotFound | FailureKind::Conflict => exit_codes::UNAVAILABLE,
        FailureKind::Transport => exit_codes::TRANSPORT_ERROR,
        FailureKind::Internal if err.code.category() == "Configuration" => exit_codes::CONFIG_ERROR,
        FailureKind::Internal => exit_codes::FAILURE,
    }
}

fn report(err: &anyhow::Error, verbose: bool) {
    match err.downcast_ref::<Error>() {
        Some(core) => {
            eprintln!("{} {}", "Error:".red().bold(), core.user_message());
            if let Some(ref suggestion) = core.suggestion {
                Status::warning(suggestion);
            }
            if verbose {
                Status::error(&format!("[{}] {core}", core.code));
            }
        }
        None => eprintln!("{} {err:#}", "Error:".red().bold()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_tracing(verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, verbose);
            ExitCode::from(u8::try_from(exit_code_for(&e)).unwrap_or(1))
        }
    }
}
