//! # JSON Web Algorithms for Credibil
//!
//! Key generation, signing and verification for the JWS algorithms used to
//! build JSON Web Proofs.
//!
//! This crate provides common utilities for the Credibil project and is not
//! intended to be used directly.

mod algorithm;
mod key;
mod provider;

pub use self::algorithm::*;
pub use self::key::*;
pub use self::provider::*;
