//! # Issue Subcommand
//!
//! Builds an issue request from flags or a JSON request file and prints
//! the signed token. The hierarchy policy comes from the engine config.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use trustmint_claims::{EngineConfig, IssueRequest, Issuer, Token};

/// Arguments for `trustmint issue`.
#[derive(Args, Debug)]
pub struct IssueArgs {
    /// JSON request file with `iss`, `sub`, `name`, and optional fields.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["iss", "iss_file", "sub", "name"])]
    pub request: Option<PathBuf>,

    /// Issuer seed.
    #[arg(long, conflicts_with = "iss_file")]
    pub iss: Option<String>,

    /// Read the issuer seed from FILE.
    #[arg(long, value_name = "FILE")]
    pub iss_file: Option<PathBuf>,

    /// Subject seed or public identifier.
    #[arg(long)]
    pub sub: Option<String>,

    /// Subject name.
    #[arg(long)]
    pub name: Option<String>,

    /// Audience.
    #[arg(long)]
    pub aud: Option<String>,

    /// Expiry: unix seconds or RFC 3339.
    #[arg(long)]
    pub exp: Option<String>,

    /// Not-before: unix seconds or RFC 3339.
    #[arg(long)]
    pub nbf: Option<String>,

    /// Issue time: unix seconds or RFC 3339. Defaults to now.
    #[arg(long)]
    pub iat: Option<String>,

    /// Extension JSON for the subject's payload.
    #[arg(long)]
    pub nats: Option<String>,

    /// Print `{"jti": ..., "token": ...}` instead of the bare token.
    #[arg(long)]
    pub json: bool,
}

/// Execute the issue subcommand.
pub fn run_issue(args: &IssueArgs, config: &EngineConfig) -> Result<u8> {
    let token = issue_token(args, config)?;
    if args.json {
        let out = serde_json::json!({"jti": token.id(), "token": token.to_string()});
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{token}");
    }
    Ok(0)
}

fn issue_token(args: &IssueArgs, config: &EngineConfig) -> Result<Token> {
    let request = build_request(args)?;
    let issuer = Issuer::new(config.policy());
    let token = issuer.issue_request(&request).context("issuance failed")?;
    tracing::info!(jti = %token.id(), "issued token");
    Ok(token)
}

fn build_request(args: &IssueArgs) -> Result<IssueRequest> {
    if let Some(path) = &args.request {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request: {}", path.display()))?;
        return IssueRequest::from_json_str(&text)
            .with_context(|| format!("invalid request in {}", path.display()));
    }

    let iss = match &args.iss_file {
        Some(path) => Some(crate::read_trimmed(path)?),
        None => args.iss.clone(),
    };
    let fields = [
        ("iss", iss),
        ("sub", args.sub.clone()),
        ("name", args.name.clone()),
        ("aud", args.aud.clone()),
        ("exp", args.exp.clone()),
        ("nbf", args.nbf.clone()),
        ("iat", args.iat.clone()),
        ("nats", args.nats.clone()),
    ];
    let map: BTreeMap<String, String> = fields
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect();
    IssueRequest::from_flat_map(&map).context("invalid issue arguments")
}
