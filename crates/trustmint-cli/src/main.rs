//! # trustmint CLI entry point
//!
//! Parses command-line arguments, loads engine configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trustmint_cli::decode::{run_decode, DecodeArgs};
use trustmint_cli::issue::{run_issue, IssueArgs};
use trustmint_cli::keygen::{run_keygen, KeygenArgs};
use trustmint_cli::pubkey::{run_pubkey, PubkeyArgs};
use trustmint_claims::EngineConfig;

/// trustmint: tiered seeds in, signed identity tokens out.
///
/// Generates top, org, and user seeds, resolves their public identifiers,
/// and issues signed tokens under the top → org → user hierarchy.
#[derive(Parser, Debug)]
#[command(name = "trustmint", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the YAML engine configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a seed for a tier, or re-derive the view of an existing one.
    Keygen(KeygenArgs),

    /// Print the public identifier for a seed.
    Pubkey(PubkeyArgs),

    /// Issue a signed token.
    Issue(IssueArgs),

    /// Print the header and payload of a token.
    Decode(DecodeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::from(1);
            }
        },
        None => EngineConfig::default(),
    };
    tracing::debug!(
        allow_direct_user_issuance = config.hierarchy.allow_direct_user_issuance,
        extra_rules = config.hierarchy.extra_rules.len(),
        "loaded engine config"
    );

    let result = match cli.command {
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Pubkey(args) => run_pubkey(&args),
        Commands::Issue(args) => run_issue(&args, &config),
        Commands::Decode(args) => run_decode(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
