//! # Decode Subcommand
//!
//! Prints a token's header and payload as JSON. The signature is only
//! checked when `--key` names the expected signer; without it nothing is
//! verified.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use trustmint_claims::DecodedToken;
use trustmint_core::PublicIdentifier;
use trustmint_crypto::{verify, Signature};

/// Arguments for `trustmint decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Token text.
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Check the signature against this public identifier.
    #[arg(long, value_name = "PUBLIC_ID")]
    pub key: Option<String>,
}

/// Execute the decode subcommand.
pub fn run_decode(args: &DecodeArgs) -> Result<u8> {
    let (out, valid) = decode(args)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(if valid == Some(false) { 1 } else { 0 })
}

/// Decoded JSON, and the signature check result when a key was given.
fn decode(args: &DecodeArgs) -> Result<(Value, Option<bool>)> {
    let decoded = DecodedToken::parse(&args.token).context("malformed token")?;
    let mut out = json!({"header": decoded.header, "payload": decoded.payload});

    let valid = match &args.key {
        None => None,
        Some(text) => {
            let signer: PublicIdentifier = text.parse().context("invalid public identifier")?;
            let (input, segment) = DecodedToken::signing_input(&args.token)?;
            let signature = Signature::from_segment(&segment).context("malformed signature")?;
            let ok = match verify(&input, &signature, &signer) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("{e}");
                    false
                }
            };
            out["signature_valid"] = Value::Bool(ok);
            Some(ok)
        }
    };
    Ok((out, valid))
}
