//! # trustmint-claims — Claims and Token Issuance
//!
//! Turns claim data into a signed `header.payload.signature` token:
//!
//! - **Claims** (`claims.rs`): the common envelope (`jti`, `iss`, `sub`,
//!   `name`, `iat`, `exp`, `nbf`, `aud`) and the builder that selects the
//!   payload variant from the subject's tier.
//! - **Payload** (`payload.rs`): the closed set of tier payloads (top, org,
//!   user) and decoding of caller-supplied extension JSON into them,
//!   including delegated signing keys.
//! - **Hierarchy** (`hierarchy.rs`): which issuer tier may sign for which
//!   subject tier. The table is a value, loaded from configuration.
//! - **Token** (`token.rs`): header/payload segments, claim ID assignment,
//!   signing, and the `Issuer` that runs the whole sequence.
//! - **Request** (`request.rs`): the external input shape, as a flat string
//!   map or a structured JSON object.
//! - **Config** (`config.rs`): YAML engine configuration.
//!
//! ## Issuance order
//!
//! Hierarchy check, blank the ID and set `iss`/`sub`, compute the ID,
//! encode header and payload, sign `header.payload`, join. Any failure
//! aborts; a partial token is never returned.
//!
//! ## Crate Policy
//!
//! - Depends on `trustmint-core` and `trustmint-crypto` internally.
//! - Everything is synchronous and free of shared mutable state; issuance
//!   calls may run on any number of threads at once.

pub mod claims;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod payload;
pub mod request;
pub mod token;

pub use claims::{Claims, ClaimsBuilder};
pub use config::EngineConfig;
pub use error::{ConfigError, IssueError, TokenDecodeError};
pub use hierarchy::HierarchyPolicy;
pub use payload::{OrgPayload, Payload, TopPayload, UserPayload};
pub use request::IssueRequest;
pub use token::{DecodedToken, Header, Issuer, Token};
