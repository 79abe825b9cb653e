//! # Single-Use Proof Algorithm
//!
//! The single-use (`SU-*`) JSON proof algorithm signs every payload with its
//! own JWS signature so that any subset of payloads can later be disclosed.
//!
//! On issuance a fresh, single-use *ephemeral* key pair is generated. The
//! issuer signs a header embedding the ephemeral public key (`proof_jwk`) and
//! the holder's public key (`presentation_jwk`) with its long-term key, then
//! signs each payload with the ephemeral key. The proof value is the
//! concatenation of those signatures:
//!
//! ```text
//! issued:       sig(issuer header) || sig(p0) || sig(p1) || ... || sig(pn)
//! presentation: sig(issuer header) || sig(presentation header) || sig(pi) ...
//! ```
//!
//! A holder derives a presentation by copying the issuer's signatures for the
//! payloads it chooses to disclose and signing a presentation header carrying
//! a random nonce with its own key.
//!
//! The algorithm identifier is `SU-` followed by a JWS algorithm, for example
//! `SU-ES256` or `SU-RS256`.

mod builder;
mod derive;
mod issue;
mod verify;

use std::fmt::{self, Debug};
use std::sync::Arc;

pub use credibil_jwa::{Algorithm, KeyPair, PublicKeyJwk, RustCrypto, SecretKey, SignatureProvider};
use credibil_jwp::{Error, Jwp, Payload, ProofAlgorithm, Result};

pub use crate::builder::Builder;

/// Identifier prefix shared by every single-use algorithm.
pub const PREFIX: &str = "SU-";

/// Issuer header parameter holding the ephemeral public key.
pub const PROOF_JWK: &str = "proof_jwk";

/// Issuer header parameter holding the holder's public key.
pub const PRESENTATION_JWK: &str = "presentation_jwk";

/// Presentation header parameter holding the per-presentation nonce.
pub const NONCE: &str = "nonce";

/// The single-use JSON proof algorithm.
///
/// Which operations an instance can perform depends on the keys it holds:
///
/// | Operation | Requires                                  |
/// |-----------|-------------------------------------------|
/// | `issue`   | issuer secret key, holder public key      |
/// | `derive`  | holder secret key                         |
/// | `verify`  | issuer public key                         |
pub struct SingleUse {
    alg: Algorithm,
    issuer: Option<PublicKeyJwk>,
    issuer_secret: Option<SecretKey>,
    holder: Option<PublicKeyJwk>,
    holder_secret: Option<SecretKey>,
    provider: Arc<dyn SignatureProvider>,
}

impl SingleUse {
    /// Start configuring an algorithm instance that issues with `alg`.
    #[must_use]
    pub fn builder(alg: Algorithm) -> Builder {
        Builder::new(alg)
    }

    /// The full proof algorithm identifier, e.g. `SU-ES256`.
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{PREFIX}{}", self.alg)
    }
}

impl ProofAlgorithm for SingleUse {
    fn handles(&self, alg: &str) -> bool {
        alg.starts_with(PREFIX)
    }

    fn issue(&self, payloads: &[Payload]) -> Result<Jwp> {
        issue::issue(self, payloads)
    }

    fn derive(&self, issued: &Jwp, include: &[usize]) -> Result<Jwp> {
        derive::derive(self, issued, include)
    }

    fn verify(&self, jwp: &Jwp) -> Result<()> {
        verify::verify(self, jwp)
    }
}

impl Debug for SingleUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleUse")
            .field("alg", &self.alg)
            .field("issuer", &self.issuer)
            .field("issuer_secret", &self.issuer_secret.is_some())
            .field("holder", &self.holder)
            .field("holder_secret", &self.holder_secret.is_some())
            .finish_non_exhaustive()
    }
}

/// The JWS algorithm named by a single-use identifier's suffix.
fn signature_algorithm(alg: &str) -> Result<Algorithm> {
    let Some(suffix) = alg.strip_prefix(PREFIX) else {
        return Err(Error::Argument(format!("'{alg}' is not a single-use algorithm")));
    };
    suffix.parse().map_err(|e| Error::Argument(format!("{e}")))
}
