//! # Algorithm Registry
//!
//! Parsing a compact JWP needs to know which proof algorithm the issuer
//! header names. A [`Resolver`] answers that question; [`Registry`] is the
//! standard resolver, mapping identifier prefixes (such as `SU-`) to handlers.

use std::fmt::{self, Debug};

use crate::{Error, Jwp, ProofAlgorithm, Result};

/// Resolves a proof algorithm handler from an `alg` identifier.
pub trait Resolver {
    /// Return a handler for `alg`, if one is known.
    fn resolve(&self, alg: &str) -> Option<&dyn ProofAlgorithm>;
}

/// Prefix-keyed registry of proof algorithm handlers.
///
/// The first registered prefix matching an identifier wins.
#[derive(Default)]
pub struct Registry {
    handlers: Vec<(String, Box<dyn ProofAlgorithm>)>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for identifiers starting with `prefix`.
    pub fn register(&mut self, prefix: impl Into<String>, handler: impl ProofAlgorithm + 'static) {
        self.handlers.push((prefix.into(), Box::new(handler)));
    }

    /// Builder-style [`Registry::register`].
    #[must_use]
    pub fn with(mut self, prefix: impl Into<String>, handler: impl ProofAlgorithm + 'static) -> Self {
        self.register(prefix, handler);
        self
    }

    /// Verify `jwp` with the handler registered for its `alg`.
    ///
    /// # Errors
    ///
    /// Returns an unverifiable-proof error if no registered handler accepts
    /// the container's `alg`, otherwise the handler's verification result.
    pub fn verify(&self, jwp: &Jwp) -> Result<()> {
        let alg = jwp.alg().unwrap_or_default();
        match self.resolve(alg) {
            Some(handler) if handler.handles(alg) => handler.verify(jwp),
            _ => Err(Error::UnverifiableProof(format!("no handler can verify alg '{alg}'"))),
        }
    }
}

impl Resolver for Registry {
    fn resolve(&self, alg: &str) -> Option<&dyn ProofAlgorithm> {
        self.handlers
            .iter()
            .find(|(prefix, _)| alg.starts_with(prefix.as_str()))
            .map(|(_, handler)| handler.as_ref())
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handlers.iter().map(|(prefix, _)| prefix)).finish()
    }
}

/// Resolver that always offers a single algorithm.
pub(crate) struct Single<'a>(pub(crate) &'a dyn ProofAlgorithm);

impl Resolver for Single<'_> {
    fn resolve(&self, _: &str) -> Option<&dyn ProofAlgorithm> {
        Some(self.0)
    }
}
