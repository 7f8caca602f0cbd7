//! # Pubkey Subcommand
//!
//! Resolves a seed to its public identifier. Public identifier input is
//! accepted too and echoed back after validation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use trustmint_crypto::public_identifier_of;

/// Arguments for `trustmint pubkey`.
#[derive(Args, Debug)]
pub struct PubkeyArgs {
    /// Seed text.
    #[arg(value_name = "SEED", required_unless_present = "file", conflicts_with = "file")]
    pub seed: Option<String>,

    /// Read the seed from FILE instead of the command line.
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

/// Execute the pubkey subcommand.
pub fn run_pubkey(args: &PubkeyArgs) -> Result<u8> {
    println!("{}", resolve(args)?);
    Ok(0)
}

fn resolve(args: &PubkeyArgs) -> Result<String> {
    let text = match (&args.seed, &args.file) {
        (Some(seed), _) => seed.trim().to_string(),
        (None, Some(path)) => crate::read_trimmed(path)?,
        (None, None) => anyhow::bail!("a seed or --file is required"),
    };
    let id = public_identifier_of(&text).context("not a valid seed or public identifier")?;
    tracing::debug!(tier = %id.tier(), "resolved public identifier");
    Ok(id.encode())
}
