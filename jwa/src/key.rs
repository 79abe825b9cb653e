//! # Key Material
//!
//! Public keys are carried as JSON Web Keys ([RFC7517]) so they can be
//! embedded in proof headers. Secret keys never leave the process in any
//! serialized form and are wiped on drop.
//!
//! [RFC7517]: https://www.rfc-editor.org/rfc/rfc7517

use std::fmt::{self, Debug, Display};

use anyhow::{Result, anyhow, bail};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Algorithm;

/// Prefix byte (tag) to indicate an uncompressed SEC1 public key.
pub const TAG_PUBKEY_FULL: u8 = 0x04;

/// Length of an Ed25519 public or secret key.
pub const ED25519_KEY_LENGTH: usize = 32;

/// Cryptographic key type (the JWK `kty` parameter).
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum KeyType {
    /// Octet key pair (Edwards curve)
    #[serde(rename = "OKP")]
    Okp,

    /// Elliptic curve key pair
    #[default]
    #[serde(rename = "EC")]
    Ec,

    /// RSA key pair
    #[serde(rename = "RSA")]
    Rsa,
}

/// Cryptographic curve type (the JWK `crv` parameter).
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum Curve {
    /// NIST P-256 (secp256r1).
    #[serde(rename = "P-256")]
    P256,

    /// NIST P-384 (secp384r1).
    #[serde(rename = "P-384")]
    P384,

    /// NIST P-521 (secp521r1).
    #[serde(rename = "P-521")]
    P521,

    /// secp256k1 curve.
    #[serde(rename = "secp256k1")]
    Es256K,

    /// Ed25519 signature (DSA) key pairs.
    Ed25519,
}

impl Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::P256 => write!(f, "P-256"),
            Self::P384 => write!(f, "P-384"),
            Self::P521 => write!(f, "P-521"),
            Self::Es256K => write!(f, "secp256k1"),
            Self::Ed25519 => write!(f, "Ed25519"),
        }
    }
}

/// A public key in JSON Web Key form.
///
/// Elliptic curve keys use `crv`, `x` and `y`; Edwards curve keys use `crv`
/// and `x`; RSA keys use `n` and `e`. Field order matches serialization order,
/// which matters once the key is embedded in a signed header.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    /// Key type.
    pub kty: KeyType,

    /// Curve for `EC` and `OKP` keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<Curve>,

    /// Base64url-encoded x coordinate (or Edwards public key).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// Base64url-encoded y coordinate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    /// Base64url-encoded RSA modulus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// Base64url-encoded RSA public exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl PublicKeyJwk {
    /// Build an `EC` key from an uncompressed SEC1 encoded point.
    ///
    /// # Errors
    ///
    /// Returns an error if the point is not uncompressed.
    pub fn from_sec1(crv: Curve, point: &[u8]) -> Result<Self> {
        let Some((&TAG_PUBKEY_FULL, coords)) = point.split_first() else {
            bail!("expected an uncompressed SEC1 point");
        };
        if coords.is_empty() || coords.len() % 2 != 0 {
            bail!("invalid SEC1 point length");
        }
        let (x, y) = coords.split_at(coords.len() / 2);

        Ok(Self {
            kty: KeyType::Ec,
            crv: Some(crv),
            x: Some(Base64UrlUnpadded::encode_string(x)),
            y: Some(Base64UrlUnpadded::encode_string(y)),
            ..Self::default()
        })
    }

    /// Build an `OKP` key from raw Ed25519 public key bytes.
    #[must_use]
    pub fn from_ed25519(x: &[u8; ED25519_KEY_LENGTH]) -> Self {
        Self {
            kty: KeyType::Okp,
            crv: Some(Curve::Ed25519),
            x: Some(Base64UrlUnpadded::encode_string(x)),
            ..Self::default()
        }
    }

    /// Build an `RSA` key from big-endian modulus and exponent bytes.
    #[must_use]
    pub fn from_rsa(n: &[u8], e: &[u8]) -> Self {
        Self {
            kty: KeyType::Rsa,
            n: Some(Base64UrlUnpadded::encode_string(n)),
            e: Some(Base64UrlUnpadded::encode_string(e)),
            ..Self::default()
        }
    }

    /// Whether this key can verify signatures made with `alg`.
    #[must_use]
    pub fn supports(&self, alg: Algorithm) -> bool {
        self.kty == alg.key_type() && self.crv == alg.curve()
    }

    /// Uncompressed SEC1 encoding (`0x04 || x || y`) of an `EC` key.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is missing or not base64url.
    pub fn sec1(&self) -> Result<Vec<u8>> {
        let x = self.x.as_ref().ok_or_else(|| anyhow!("JWK 'x' is missing"))?;
        let y = self.y.as_ref().ok_or_else(|| anyhow!("JWK 'y' is missing"))?;

        let mut sec1 = vec![TAG_PUBKEY_FULL];
        sec1.append(&mut decode_param("x", x)?);
        sec1.append(&mut decode_param("y", y)?);
        Ok(sec1)
    }

    /// Raw public key bytes of an `OKP` key.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` is missing, not base64url, or the wrong length.
    pub fn okp(&self) -> Result<[u8; ED25519_KEY_LENGTH]> {
        let x = self.x.as_ref().ok_or_else(|| anyhow!("JWK 'x' is missing"))?;
        decode_param("x", x)?.try_into().map_err(|_| anyhow!("invalid public key length"))
    }

    /// Big-endian modulus and exponent of an `RSA` key.
    ///
    /// # Errors
    ///
    /// Returns an error if either parameter is missing or not base64url.
    pub fn rsa(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let n = self.n.as_ref().ok_or_else(|| anyhow!("JWK 'n' is missing"))?;
        let e = self.e.as_ref().ok_or_else(|| anyhow!("JWK 'e' is missing"))?;
        Ok((decode_param("n", n)?, decode_param("e", e)?))
    }
}

fn decode_param(name: &str, value: &str) -> Result<Vec<u8>> {
    Base64UrlUnpadded::decode_vec(value)
        .map_err(|e| anyhow!("unable to base64 decode JWK '{name}': {e}"))
}

/// A secret (signing) key.
///
/// Elliptic and Edwards curve keys hold the raw scalar; RSA keys hold the
/// PKCS#8 DER document. The bytes are wiped when the key is dropped and are
/// never included in `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    kty: KeyType,
    #[zeroize(skip)]
    crv: Option<Curve>,
    bytes: Vec<u8>,
}

impl SecretKey {
    pub(crate) const fn new(kty: KeyType, crv: Option<Curve>, bytes: Vec<u8>) -> Self {
        Self { kty, crv, bytes }
    }

    /// Key type of the secret key.
    #[must_use]
    pub const fn key_type(&self) -> KeyType {
        self.kty
    }

    /// Curve of the secret key, if any.
    #[must_use]
    pub const fn curve(&self) -> Option<Curve> {
        self.crv
    }

    /// Whether this key can produce signatures for `alg`.
    #[must_use]
    pub fn supports(&self, alg: Algorithm) -> bool {
        self.kty == alg.key_type() && self.crv == alg.curve()
    }

    /// Return the secret key as a byte slice.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("kty", &self.kty)
            .field("crv", &self.crv)
            .finish_non_exhaustive()
    }
}

/// A generated key pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// Public half, shareable as a JWK.
    pub public: PublicKeyJwk,

    /// Secret half.
    pub secret: SecretKey,
}
