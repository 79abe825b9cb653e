//! # JSON Web Proof Container
//!
//! A [`Jwp`] holds an issuer header, an optional presentation header, an
//! ordered list of payloads and a proof value. Its compact serialization is
//!
//! ```text
//! b64(issuer) '.' [ b64(presentation) '.' ] b64(p0) '~' b64(p1) '~' ... '.' b64(proof)
//! ```
//!
//! Three segments is the issued form, four the presentation form. An absent
//! payload has no canonical text, so its payload segment is empty; a disclosed
//! empty string encodes as `""` and is never empty.
//!
//! Headers keep the exact JSON bytes they were created or parsed from.
//! Signatures are always checked against those bytes, never against a
//! re-serialization of the decoded members.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use base64ct::{Base64UrlUnpadded, Encoding};

use crate::json::Object;
use crate::registry::{Resolver, Single};
use crate::split::split;
use crate::{Error, Payload, ProofAlgorithm, Result};

/// Issuer header parameter naming the proof algorithm.
pub const ALG: &str = "alg";

/// A JSON header together with the exact bytes it was encoded from.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    members: Object,
    json: Vec<u8>,
    encoded: String,
}

impl Header {
    /// Encode `members` as a new header.
    ///
    /// # Errors
    ///
    /// Returns a format error if the members cannot be serialized.
    pub fn new(members: Object) -> Result<Self> {
        let json = members.to_json()?;
        let encoded = Base64UrlUnpadded::encode_string(&json);
        Ok(Self {
            members,
            json,
            encoded,
        })
    }

    /// Decode a base64url header segment, keeping its original bytes.
    ///
    /// # Errors
    ///
    /// Returns a format error if the segment is not base64url or not a JSON
    /// object with unique keys.
    pub fn decode(encoded: &str) -> Result<Self> {
        let json = Base64UrlUnpadded::decode_vec(encoded)
            .map_err(|e| Error::Format(format!("issue decoding header: {e}")))?;
        let members = Object::from_json(&json)?;
        Ok(Self {
            members,
            json,
            encoded: encoded.to_string(),
        })
    }

    /// Header members, in order.
    #[must_use]
    pub const fn members(&self) -> &Object {
        &self.members
    }

    /// The JSON bytes the header was built or parsed from. This is the signing
    /// input for the header.
    #[must_use]
    pub fn signing_input(&self) -> &[u8] {
        &self.json
    }

    /// The base64url-encoded header segment.
    #[must_use]
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}

/// A JSON Web Proof.
///
/// Immutable once constructed; the compact serialization is computed at most
/// once and cached.
#[derive(Clone, Debug)]
pub struct Jwp {
    issuer_header: Header,
    presentation_header: Option<Header>,
    payloads: Vec<Payload>,
    proof: Vec<u8>,
    compact: OnceLock<String>,
}

impl Jwp {
    /// Assemble a proof container.
    ///
    /// Containers with a presentation header are in presentation form. This
    /// performs no cryptographic checks; proof algorithms are responsible for
    /// producing a valid `proof`.
    #[must_use]
    pub const fn new(
        issuer_header: Header, presentation_header: Option<Header>, payloads: Vec<Payload>,
        proof: Vec<u8>,
    ) -> Self {
        Self {
            issuer_header,
            presentation_header,
            payloads,
            proof,
            compact: OnceLock::new(),
        }
    }

    /// Parse a compact serialized JWP, resolving its algorithm with `resolver`.
    ///
    /// The proof is not verified.
    ///
    /// # Errors
    ///
    /// Returns a format error if the text is structurally malformed and an
    /// unresolvable-algorithm error if no handler accepts the `alg` header.
    pub fn parse(compact: &str, resolver: &(impl Resolver + ?Sized)) -> Result<Self> {
        tracing::debug!("parse");

        let parts = split(compact, '.');
        if parts.len() != 3 && parts.len() != 4 {
            return Err(Error::Format(format!(
                "expected 3 or 4 parts in compact serialized form, got {}",
                parts.len()
            )));
        }

        let issuer_header = Header::decode(parts[0])?;
        let Some(alg) = issuer_header.members().get_str(ALG)? else {
            return Err(Error::Format(
                "missing 'alg' in issuer header; unable to determine algorithm".into(),
            ));
        };

        let Some(algorithm) = resolver.resolve(alg) else {
            return Err(Error::UnresolvableAlgorithm(format!(
                "unable to resolve proof algorithm for {alg}"
            )));
        };
        if !algorithm.handles(alg) {
            return Err(Error::UnresolvableAlgorithm(format!(
                "resolved proof algorithm can't handle {alg}"
            )));
        }

        let presentation_header =
            if parts.len() == 4 { Some(Header::decode(parts[1])?) } else { None };

        let payloads = split(parts[parts.len() - 2], '~')
            .into_iter()
            .map(|segment| {
                let text = Base64UrlUnpadded::decode_vec(segment)
                    .map_err(|e| Error::Format(format!("issue decoding payload: {e}")))?;
                let text = String::from_utf8(text)
                    .map_err(|e| Error::Format(format!("payload is not UTF-8: {e}")))?;
                Payload::from_text(&text)
            })
            .collect::<Result<Vec<_>>>()?;
        if presentation_header.is_none() && payloads.iter().any(Payload::is_absent) {
            return Err(Error::Format("issued form cannot contain absent payloads".into()));
        }

        let proof = Base64UrlUnpadded::decode_vec(parts[parts.len() - 1])
            .map_err(|e| Error::Format(format!("issue decoding proof: {e}")))?;

        Ok(Self {
            issuer_header,
            presentation_header,
            payloads,
            proof,
            compact: OnceLock::from(compact.to_string()),
        })
    }

    /// Parse a compact serialized JWP that must be handled by `algorithm`.
    ///
    /// # Errors
    ///
    /// As for [`Jwp::parse`].
    pub fn parse_with(compact: &str, algorithm: &dyn ProofAlgorithm) -> Result<Self> {
        Self::parse(compact, &Single(algorithm))
    }

    /// The compact serialization.
    ///
    /// Parsed containers return the text they were parsed from.
    pub fn serialize(&self) -> &str {
        self.compact.get_or_init(|| {
            tracing::debug!("serialize");

            let payloads = self
                .payloads
                .iter()
                .map(|p| Base64UrlUnpadded::encode_string(p.to_text().as_bytes()))
                .collect::<Vec<_>>()
                .join("~");
            let proof = Base64UrlUnpadded::encode_string(&self.proof);

            let mut parts = vec![self.issuer_header.encoded()];
            if let Some(presentation) = &self.presentation_header {
                parts.push(presentation.encoded());
            }
            parts.push(&payloads);
            parts.push(&proof);
            parts.join(".")
        })
    }

    /// Whether the container is in presentation form.
    #[must_use]
    pub const fn is_presentation(&self) -> bool {
        self.presentation_header.is_some()
    }

    /// The proof algorithm identifier from the issuer header, if it is a
    /// string.
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.issuer_header.members().get(ALG).and_then(|v| v.as_str())
    }

    /// The issuer header.
    #[must_use]
    pub const fn issuer_header(&self) -> &Header {
        &self.issuer_header
    }

    /// The presentation header, present only in presentation form.
    #[must_use]
    pub const fn presentation_header(&self) -> Option<&Header> {
        self.presentation_header.as_ref()
    }

    /// All payload positions, including absent ones.
    #[must_use]
    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// Payloads that carry a signature block, in order.
    pub fn disclosed(&self) -> impl Iterator<Item = &Payload> {
        self.payloads.iter().filter(|p| p.is_disclosed())
    }

    /// The raw proof value.
    #[must_use]
    pub fn proof(&self) -> &[u8] {
        &self.proof
    }
}

impl Display for Jwp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.serialize())
    }
}
