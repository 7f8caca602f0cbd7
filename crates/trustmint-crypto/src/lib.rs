//! # trustmint-crypto — Keys and Signatures
//!
//! - **Key derivation** (`keys.rs`): a seed's 32 entropy bytes are the
//!   Ed25519 secret seed. Derivation is pure, so the same seed always yields
//!   the same public identifier and the same signatures.
//! - **Signing** (`keys.rs`): Ed25519 over a `SigningInput` only.
//! - **Generation** (`generate.rs`): fresh seeds from the OS CSPRNG and the
//!   exported key view (seed, public identifier, raw key bytes).
//!
//! ## Crate Policy
//!
//! - Depends only on `trustmint-core` internally.
//! - Private key material is never serialized by `KeyPair` and never
//!   printed by any `Debug` impl.
//! - Tests use real Ed25519; nothing is mocked.

pub mod error;
pub mod generate;
pub mod keys;

pub use error::CryptoError;
pub use generate::{generate, GeneratedKey};
pub use keys::{public_identifier_of, verify, KeyPair, Signature};
