//! # Signing Algorithms
//!
//! JWS algorithm identifiers ([RFC7518]) and the key generation, signing and
//! verification operations behind each of them.
//!
//! Elliptic curve signatures use the fixed-size `r || s` encoding, so every
//! signature produced for a given algorithm (and, for RSA, a given modulus)
//! has the same length.
//!
//! [RFC7518]: https://www.rfc-editor.org/rfc/rfc7518

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use ecdsa::signature::{Signer as _, Verifier as _};
use rand::rngs::OsRng;
use rsa::pkcs1v15;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::signature::SignatureEncoding;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha384, Sha512};

use crate::key::{Curve, ED25519_KEY_LENGTH, KeyPair, KeyType, PublicKeyJwk, SecretKey};

/// Modulus size used when generating RSA keys.
pub const RSA_MODULUS_BITS: usize = 2048;

/// The signing algorithm used by the signer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// ECDSA using P-256 and SHA-256
    ES256,

    /// ECDSA using P-384 and SHA-384
    ES384,

    /// ECDSA using P-521 and SHA-512
    ES512,

    /// ECDSA using secp256k1 and SHA-256
    ES256K,

    /// `EdDSA` using Ed25519
    EdDSA,

    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,

    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,

    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            "ES512" => Ok(Self::ES512),
            "ES256K" => Ok(Self::ES256K),
            "EdDSA" => Ok(Self::EdDSA),
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            _ => Err(anyhow!("unsupported JWS algorithm {s}")),
        }
    }
}

impl Algorithm {
    /// The key type this algorithm signs with.
    #[must_use]
    pub const fn key_type(self) -> KeyType {
        match self {
            Self::ES256 | Self::ES384 | Self::ES512 | Self::ES256K => KeyType::Ec,
            Self::EdDSA => KeyType::Okp,
            Self::RS256 | Self::RS384 | Self::RS512 => KeyType::Rsa,
        }
    }

    /// The curve this algorithm signs with, if it is curve based.
    #[must_use]
    pub const fn curve(self) -> Option<Curve> {
        match self {
            Self::ES256 => Some(Curve::P256),
            Self::ES384 => Some(Curve::P384),
            Self::ES512 => Some(Curve::P521),
            Self::ES256K => Some(Curve::Es256K),
            Self::EdDSA => Some(Curve::Ed25519),
            Self::RS256 | Self::RS384 | Self::RS512 => None,
        }
    }
}

/// Key generation
impl Algorithm {
    /// Generate a new key pair suitable for this algorithm using the operating
    /// system's random number generator.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation or encoding fails.
    pub fn generate(self) -> Result<KeyPair> {
        tracing::debug!(alg = %self, "generate");

        let (point, scalar) = match self {
            Self::ES256 => {
                let signing_key = p256::ecdsa::SigningKey::random(&mut OsRng);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (point.as_bytes().to_vec(), signing_key.to_bytes().to_vec())
            }
            Self::ES384 => {
                let signing_key = p384::ecdsa::SigningKey::random(&mut OsRng);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (point.as_bytes().to_vec(), signing_key.to_bytes().to_vec())
            }
            Self::ES512 => {
                let signing_key = p521::ecdsa::SigningKey::random(&mut OsRng);
                let point =
                    p521::ecdsa::VerifyingKey::from(&signing_key).to_encoded_point(false);
                (point.as_bytes().to_vec(), signing_key.to_bytes().to_vec())
            }
            Self::ES256K => {
                let signing_key = k256::ecdsa::SigningKey::random(&mut OsRng);
                let point = signing_key.verifying_key().to_encoded_point(false);
                (point.as_bytes().to_vec(), signing_key.to_bytes().to_vec())
            }
            Self::EdDSA => {
                let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                return Ok(KeyPair {
                    public: PublicKeyJwk::from_ed25519(&signing_key.verifying_key().to_bytes()),
                    secret: SecretKey::new(
                        KeyType::Okp,
                        Some(Curve::Ed25519),
                        signing_key.to_bytes().to_vec(),
                    ),
                });
            }
            Self::RS256 | Self::RS384 | Self::RS512 => {
                let private = RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS)
                    .map_err(|e| anyhow!("issue generating RSA key: {e}"))?;
                let public = private.to_public_key();
                let der = private
                    .to_pkcs8_der()
                    .map_err(|e| anyhow!("issue encoding RSA key: {e}"))?;
                return Ok(KeyPair {
                    public: PublicKeyJwk::from_rsa(
                        &public.n().to_bytes_be(),
                        &public.e().to_bytes_be(),
                    ),
                    secret: SecretKey::new(KeyType::Rsa, None, der.as_bytes().to_vec()),
                });
            }
        };

        let crv = self.curve().ok_or_else(|| anyhow!("{self} has no curve"))?;
        Ok(KeyPair {
            public: PublicKeyJwk::from_sec1(crv, &point)?,
            secret: SecretKey::new(KeyType::Ec, Some(crv), scalar),
        })
    }
}

/// Signing
impl Algorithm {
    /// Sign `msg` with `secret`.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key does not belong to this algorithm's
    /// key family or cannot be parsed, or if signing fails.
    pub fn try_sign(self, msg: &[u8], secret: &SecretKey) -> Result<Vec<u8>> {
        if !secret.supports(self) {
            bail!("{self} cannot sign with a {:?} key", secret.key_type());
        }
        let bytes = secret.as_bytes();

        let signature = match self {
            Self::ES256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let signature: p256::ecdsa::Signature = signing_key.try_sign(msg)?;
                signature.to_bytes().to_vec()
            }
            Self::ES384 => {
                let signing_key = p384::ecdsa::SigningKey::from_slice(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let signature: p384::ecdsa::Signature = signing_key.try_sign(msg)?;
                signature.to_bytes().to_vec()
            }
            Self::ES512 => {
                let signing_key = p521::ecdsa::SigningKey::from_slice(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let signature: p521::ecdsa::Signature = signing_key.try_sign(msg)?;
                signature.to_bytes().to_vec()
            }
            Self::ES256K => {
                let signing_key = k256::ecdsa::SigningKey::from_slice(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let signature: k256::ecdsa::Signature = signing_key.try_sign(msg)?;
                signature.to_bytes().to_vec()
            }
            Self::EdDSA => {
                let bytes: &[u8; ED25519_KEY_LENGTH] =
                    bytes.try_into().map_err(|_| anyhow!("invalid secret key length"))?;
                let signing_key = ed25519_dalek::SigningKey::from_bytes(bytes);
                signing_key.try_sign(msg)?.to_bytes().to_vec()
            }
            Self::RS256 | Self::RS384 | Self::RS512 => {
                let private = RsaPrivateKey::from_pkcs8_der(bytes)
                    .map_err(|e| anyhow!("issue parsing secret key: {e}"))?;
                let signature = match self {
                    Self::RS256 => pkcs1v15::SigningKey::<Sha256>::new(private).try_sign(msg)?,
                    Self::RS384 => pkcs1v15::SigningKey::<Sha384>::new(private).try_sign(msg)?,
                    _ => pkcs1v15::SigningKey::<Sha512>::new(private).try_sign(msg)?,
                };
                signature.to_vec()
            }
        };

        Ok(signature)
    }
}

/// Verifications
impl Algorithm {
    /// Verify the signature of a signed message.
    ///
    /// Returns `Ok(false)` when the signature does not match (including a
    /// signature of the wrong length).
    ///
    /// # Errors
    ///
    /// Will return an error if the verifying key is malformed or is not
    /// correct for the type of algorithm.
    pub fn verify(self, msg: &[u8], sig: &[u8], public: &PublicKeyJwk) -> Result<bool> {
        if !public.supports(self) {
            bail!("{self} cannot verify with a {:?} key", public.kty);
        }

        let verified = match self {
            Self::ES256 => {
                let verifying_key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&public.sec1()?)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let Ok(signature) = p256::ecdsa::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                verifying_key.verify(msg, &signature).is_ok()
            }
            Self::ES384 => {
                let verifying_key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&public.sec1()?)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let Ok(signature) = p384::ecdsa::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                verifying_key.verify(msg, &signature).is_ok()
            }
            Self::ES512 => {
                let verifying_key = p521::ecdsa::VerifyingKey::from_sec1_bytes(&public.sec1()?)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let Ok(signature) = p521::ecdsa::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                verifying_key.verify(msg, &signature).is_ok()
            }
            Self::ES256K => {
                let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&public.sec1()?)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let Ok(signature) = k256::ecdsa::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                let normalised = signature.normalize_s().unwrap_or(signature);
                verifying_key.verify(msg, &normalised).is_ok()
            }
            Self::EdDSA => {
                let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&public.okp()?)
                    .map_err(|e| anyhow!("unable to build verifying key: {e}"))?;
                let Ok(signature) = ed25519_dalek::Signature::from_slice(sig) else {
                    return Ok(false);
                };
                verifying_key.verify(msg, &signature).is_ok()
            }
            Self::RS256 | Self::RS384 | Self::RS512 => {
                let (n, e) = public.rsa()?;
                let key = RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
                    .map_err(|err| anyhow!("unable to build verifying key: {err}"))?;
                let Ok(signature) = pkcs1v15::Signature::try_from(sig) else {
                    return Ok(false);
                };
                let result = match self {
                    Self::RS256 => pkcs1v15::VerifyingKey::<Sha256>::new(key).verify(msg, &signature),
                    Self::RS384 => pkcs1v15::VerifyingKey::<Sha384>::new(key).verify(msg, &signature),
                    _ => pkcs1v15::VerifyingKey::<Sha512>::new(key).verify(msg, &signature),
                };
                result.is_ok()
            }
        };

        Ok(verified)
    }
}
