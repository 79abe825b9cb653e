//! # Single-Use Algorithm Builder

use std::sync::Arc;

use credibil_jwa::{Algorithm, KeyPair, PublicKeyJwk, RustCrypto, SecretKey, SignatureProvider};

use crate::SingleUse;

/// Configures a [`SingleUse`] instance.
///
/// Every key is optional; operations that need a missing key fail with a
/// configuration error.
pub struct Builder {
    alg: Algorithm,
    issuer: Option<PublicKeyJwk>,
    issuer_secret: Option<SecretKey>,
    holder: Option<PublicKeyJwk>,
    holder_secret: Option<SecretKey>,
    provider: Arc<dyn SignatureProvider>,
}

impl Builder {
    pub(crate) fn new(alg: Algorithm) -> Self {
        Self {
            alg,
            issuer: None,
            issuer_secret: None,
            holder: None,
            holder_secret: None,
            provider: Arc::new(RustCrypto),
        }
    }

    /// The issuer's long-term public key, used to verify issuer headers.
    #[must_use]
    pub fn issuer(mut self, public: PublicKeyJwk) -> Self {
        self.issuer = Some(public);
        self
    }

    /// The issuer's long-term secret key, used to sign issuer headers.
    #[must_use]
    pub fn issuer_secret(mut self, secret: SecretKey) -> Self {
        self.issuer_secret = Some(secret);
        self
    }

    /// Both halves of the issuer's long-term key pair.
    #[must_use]
    pub fn issuer_keys(self, keys: KeyPair) -> Self {
        self.issuer(keys.public).issuer_secret(keys.secret)
    }

    /// The holder's public key, embedded in issued headers.
    #[must_use]
    pub fn holder(mut self, public: PublicKeyJwk) -> Self {
        self.holder = Some(public);
        self
    }

    /// The holder's secret key, used to sign presentation headers.
    #[must_use]
    pub fn holder_secret(mut self, secret: SecretKey) -> Self {
        self.holder_secret = Some(secret);
        self
    }

    /// Both halves of the holder's key pair.
    #[must_use]
    pub fn holder_keys(self, keys: KeyPair) -> Self {
        self.holder(keys.public).holder_secret(keys.secret)
    }

    /// Use `provider` instead of the default in-process provider.
    #[must_use]
    pub fn provider(mut self, provider: impl SignatureProvider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Build the algorithm instance.
    #[must_use]
    pub fn build(self) -> SingleUse {
        SingleUse {
            alg: self.alg,
            issuer: self.issuer,
            issuer_secret: self.issuer_secret,
            holder: self.holder,
            holder_secret: self.holder_secret,
            provider: self.provider,
        }
    }
}
