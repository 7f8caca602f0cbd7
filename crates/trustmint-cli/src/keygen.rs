//! # Keygen Subcommand
//!
//! Generates a fresh seed for a tier and prints everything a caller needs
//! to store it. With `--from-seed`, re-derives the same view from a stored
//! seed instead, which is how an existing key is imported.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use trustmint_core::Tier;
use trustmint_crypto::{generate, GeneratedKey};

/// Arguments for `trustmint keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Tier of the new seed: top, org, or user.
    #[arg(long, required_unless_present = "from_seed", conflicts_with = "from_seed")]
    pub tier: Option<Tier>,

    /// Re-derive the view of the seed stored in FILE instead of generating.
    #[arg(long, value_name = "FILE")]
    pub from_seed: Option<PathBuf>,

    /// Print as a JSON object.
    #[arg(long)]
    pub json: bool,

    /// Also write the seed text to FILE.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let key = resolve_key(args)?;
    if let Some(path) = &args.output {
        write_seed(path, &key.seed)?;
        tracing::info!(path = %path.display(), "wrote seed");
    }
    println!("{}", render(&key, args.json)?);
    Ok(0)
}

fn resolve_key(args: &KeygenArgs) -> Result<GeneratedKey> {
    match (&args.from_seed, args.tier) {
        (Some(path), _) => {
            let text = crate::read_trimmed(path)?;
            GeneratedKey::from_seed(&text)
                .with_context(|| format!("invalid seed in {}", path.display()))
        }
        (None, Some(tier)) => {
            generate(tier).with_context(|| format!("failed to generate a {tier} seed"))
        }
        (None, None) => anyhow::bail!("either --tier or --from-seed is required"),
    }
}

fn render(key: &GeneratedKey, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(key).context("failed to serialize key");
    }
    Ok(format!(
        "tier:              {}\n\
         seed:              {}\n\
         public identifier: {}\n\
         public key:        {}\n\
         private key:       {}",
        key.tier, key.seed, key.public_identifier, key.public_key, key.private_key
    ))
}

fn write_seed(path: &Path, seed: &str) -> Result<()> {
    std::fs::write(path, format!("{seed}\n"))
        .with_context(|| format!("failed to write seed: {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed to restrict permissions: {}", path.display()))?;
    }
    Ok(())
}
