//! # Test Utilities
//!
//! Shared fixtures for JWP tests. Key generation (RSA in particular) is slow,
//! so key pairs are generated once per algorithm and role and reused.
//!
//! This crate is not intended to be used outside of tests.

use std::sync::{LazyLock, Once};

use credibil_jwa::{Algorithm, KeyPair};
use dashmap::DashMap;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

// initalise tracing once for all tests
static INIT: Once = Once::new();

static KEYS: LazyLock<DashMap<(Algorithm, String), KeyPair>> = LazyLock::new(DashMap::new);

/// Initialise tracing for tests.
///
/// # Panics
///
/// Panics if the tracing subscriber cannot be set.
pub fn init_tracer() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber).expect("subscriber set");
    });
}

/// Key pair for `role` (e.g. "issuer" or "holder") using `alg`.
///
/// The same pair is returned for every call with the same arguments.
///
/// # Panics
///
/// Panics if key generation fails.
#[must_use]
pub fn keypair(alg: Algorithm, role: &str) -> KeyPair {
    KEYS.entry((alg, role.to_string()))
        .or_insert_with(|| alg.generate().expect("should generate key pair"))
        .clone()
}
