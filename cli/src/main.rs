#![deny(missing_docs)]

//! # OAS Synth CLI
//!
//! Command Line Interface for synthesizing OpenAPI documents from API
//! definitions.
//!
//! Supported Commands:
//! - `generate`: API definition -> OpenAPI 3.0 (JSON or YAML).
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use oas_synth_core::AppResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI synthesis CLI")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize an OpenAPI document from an API definition.
    Generate(generate::GenerateArgs),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> AppResult<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
    }

    Ok(())
}
