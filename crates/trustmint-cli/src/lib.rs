//! # trustmint-cli — Command-Line Interface
//!
//! ## Subcommands
//!
//! - `keygen`: generate a seed for a tier, or re-derive an existing one
//! - `pubkey`: resolve a seed to its public identifier
//! - `issue`: issue a signed token from flags or a JSON request file
//! - `decode`: print a token's header and payload, optionally checking
//!   the signature against a known public identifier
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the work; each subcommand has a
//!   `run_*` handler returning the process exit code.
//! - Handlers delegate to the library crates. Errors carry `anyhow`
//!   context and end the process with exit code 1.
//! - Secrets (seeds, private keys) go to stdout only when the command's
//!   purpose is to print them, and never to logs.

pub mod decode;
pub mod issue;
pub mod keygen;
pub mod pubkey;

use std::path::Path;

use anyhow::{Context, Result};

/// Read a text file and trim surrounding whitespace.
pub(crate) fn read_trimmed(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text.trim().to_string())
}
