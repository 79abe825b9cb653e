//! # JSON Web Proofs
//!
//! A JSON Web Proof (JWP) is a container for many payloads protected by a
//! single proof value. Unlike a JWT, a holder can later present a subset of
//! the payloads without invalidating the issuer's proof.
//!
//! A proof moves through three stages:
//!
//! 1. An issuer creates an *issued form* JWP with [`ProofAlgorithm::issue`].
//! 2. The holder derives a *presentation form* JWP that discloses only some
//!    payloads with [`ProofAlgorithm::derive`].
//! 3. A verifier parses the compact text with [`Jwp::parse`] and checks it
//!    with [`ProofAlgorithm::verify`].
//!
//! Parsing is purely structural. Nothing about a parsed JWP should be trusted
//! until it has been verified.
//!
//! This crate defines the container, its compact serialization and the
//! algorithm abstraction. Proof algorithms live in their own crates (see
//! `credibil-jwp-su` for the single-use algorithm).

mod blocks;
mod error;
pub mod json;
mod jwp;
mod payload;
mod registry;
mod split;

pub use crate::blocks::SignatureBlocks;
pub use crate::error::{Error, Result};
pub use crate::jwp::{ALG, Header, Jwp};
pub use crate::payload::Payload;
pub use crate::registry::{Registry, Resolver};
pub use crate::split::split;

/// A JSON proof algorithm: issues, derives and verifies proof values for
/// [`Jwp`] containers.
///
/// Implementations must be usable from multiple threads.
pub trait ProofAlgorithm: Send + Sync {
    /// Whether the implementation can handle JWPs with the given `alg`
    /// identifier.
    fn handles(&self, alg: &str) -> bool;

    /// Create an issued-form JWP over `payloads`.
    ///
    /// # Errors
    ///
    /// Returns an argument error if `payloads` is empty, a configuration error
    /// if the algorithm lacks the keys needed to issue, or a provider error if
    /// signing fails.
    fn issue(&self, payloads: &[Payload]) -> Result<Jwp>;

    /// Derive a presentation-form JWP from an issued-form JWP, disclosing only
    /// the payloads at `include` indexes.
    ///
    /// # Errors
    ///
    /// Returns an argument error if `issued` is not a valid issued-form JWP for
    /// this algorithm, or a configuration error if the holder's secret key is
    /// not available.
    fn derive(&self, issued: &Jwp, include: &[usize]) -> Result<Jwp>;

    /// Verify the proof value of `jwp`, taking its form into account.
    ///
    /// # Errors
    ///
    /// Returns an unverifiable-proof error if this algorithm cannot verify the
    /// JWP's `alg`, or an invalid-proof error if any signature does not match.
    fn verify(&self, jwp: &Jwp) -> Result<()>;
}
