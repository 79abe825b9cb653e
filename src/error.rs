//! # JWP Errors

/// Result type for JSON Web Proof operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// JSON Web Proof errors.
///
/// Every error is fatal to the operation that raised it. Verification in
/// particular either succeeds or fails with exactly one of these.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The caller supplied invalid input, such as an empty payload list or a
    /// container in the wrong form.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The algorithm instance lacks a key needed for the requested operation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Compact text or proof bytes are structurally malformed.
    #[error("format error: {0}")]
    Format(String),

    /// A signature did not match, or embedded key material is malformed.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// No algorithm handler could be resolved for the declared `alg`.
    #[error("unresolvable algorithm: {0}")]
    UnresolvableAlgorithm(String),

    /// The handler cannot validate proofs for the declared `alg`.
    #[error("unverifiable proof: {0}")]
    UnverifiableProof(String),

    /// The signature provider failed.
    #[error("signature provider failed {context}")]
    Provider {
        /// What was being signed or generated.
        context: String,

        /// Underlying provider error.
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    /// Wrap a signature provider error with context.
    #[must_use]
    pub fn provider(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Argument(_) => "invalid_argument",
            Self::Configuration(_) => "configuration",
            Self::Format(_) => "format",
            Self::InvalidProof(_) => "invalid_proof",
            Self::UnresolvableAlgorithm(_) => "unresolvable_algorithm",
            Self::UnverifiableProof(_) => "unverifiable_proof",
            Self::Provider { .. } => "provider",
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn provider_context() {
        let err = Error::provider("signing payload 2", anyhow!("bad key"));
        assert_eq!(err.to_string(), "signature provider failed signing payload 2");
        assert_eq!(err.code(), "provider");

        let source = std::error::Error::source(&err).expect("should have source");
        assert_eq!(source.to_string(), "bad key");
    }

    #[test]
    fn codes() {
        assert_eq!(Error::Format("x".into()).code(), "format");
        assert_eq!(Error::InvalidProof("x".into()).to_string(), "invalid proof: x");
    }
}
