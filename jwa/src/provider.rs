//! # Signature Provider
//!
//! Proof algorithms never touch key material directly. Every signature they
//! create or check goes through a [`SignatureProvider`], so an implementation
//! backed by a hardware module or remote key service can be swapped in for
//! the default in-process [`RustCrypto`] provider.

use anyhow::Result;

use crate::{Algorithm, KeyPair, PublicKeyJwk, SecretKey};

/// Signing, verification and key generation for a named algorithm.
pub trait SignatureProvider: Send + Sync {
    /// Sign `msg` with `secret` using `alg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is incompatible with the algorithm or the
    /// signature cannot be created.
    fn sign(&self, alg: Algorithm, secret: &SecretKey, msg: &[u8]) -> Result<Vec<u8>>;

    /// Check `sig` over `msg` using `public`.
    ///
    /// # Errors
    ///
    /// Returns an error if the public key is malformed or incompatible with
    /// the algorithm. A signature mismatch is `Ok(false)`.
    fn verify(&self, alg: Algorithm, public: &PublicKeyJwk, msg: &[u8], sig: &[u8])
    -> Result<bool>;

    /// Generate a key pair for `alg`.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    fn generate(&self, alg: Algorithm) -> Result<KeyPair>;
}

/// In-process provider built on the `RustCrypto` curve and RSA crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCrypto;

impl SignatureProvider for RustCrypto {
    fn sign(&self, alg: Algorithm, secret: &SecretKey, msg: &[u8]) -> Result<Vec<u8>> {
        alg.try_sign(msg, secret)
    }

    fn verify(
        &self, alg: Algorithm, public: &PublicKeyJwk, msg: &[u8], sig: &[u8],
    ) -> Result<bool> {
        alg.verify(msg, sig, public)
    }

    fn generate(&self, alg: Algorithm) -> Result<KeyPair> {
        alg.generate()
    }
}
