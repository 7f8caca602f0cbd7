//! # trustmint-core — Foundational Types
//!
//! The leaf crate of the trustmint workspace. It defines the primitives that
//! every other crate builds on:
//!
//! - **`Tier`**: the three-level trust hierarchy (top → org → user) plus the
//!   `Unknown` tag, with the prefix bytes used in textual key encodings.
//! - **`Seed`**: tier-tagged, checksummed 32-byte key entropy and its
//!   textual codec.
//! - **`PublicIdentifier`**: tier-tagged, checksummed public key text used
//!   as `sub`/`iss` references inside claims.
//! - **`CanonicalBytes`**: the only construction path for bytes that get
//!   hashed or signed. Sorted keys, compact separators.
//! - **`ClaimDigest`**: SHA-512/256 over `CanonicalBytes`, rendered in
//!   base32 as the claim ID.
//! - **`Segment` / `SigningInput`**: base64url token segments and the exact
//!   byte sequence a token signature covers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `trustmint-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Codecs are plain functions; there is no process-wide encoder state.

pub mod canonical;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod identifier;
pub mod seed;
pub mod segment;
pub mod tier;

pub use canonical::CanonicalBytes;
pub use digest::{claim_digest, ClaimDigest};
pub use error::{CanonicalizationError, SeedError, SegmentError};
pub use identifier::PublicIdentifier;
pub use seed::{decode_seed, encode_seed, Seed, ENTROPY_LEN};
pub use segment::{Segment, SigningInput};
pub use tier::Tier;
