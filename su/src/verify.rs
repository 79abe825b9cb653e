//! # Verify

use credibil_jwa::{Algorithm, PublicKeyJwk};
use credibil_jwp::json::Object;
use credibil_jwp::{Error, Jwp, Payload, ProofAlgorithm, Result, SignatureBlocks};

use crate::{PRESENTATION_JWK, PROOF_JWK, SingleUse, signature_algorithm};

pub fn verify(su: &SingleUse, jwp: &Jwp) -> Result<()> {
    let alg = jwp.alg().unwrap_or_default();
    tracing::debug!(alg, presentation = jwp.is_presentation(), "verifying JWP");

    if !su.handles(alg) {
        return Err(Error::UnverifiableProof(format!("cannot verify '{alg}' proofs")));
    }
    let signature_alg =
        signature_algorithm(alg).map_err(|e| Error::UnverifiableProof(e.to_string()))?;
    let Some(issuer) = &su.issuer else {
        return Err(Error::UnverifiableProof("issuer public key is not configured".into()));
    };

    // absent positions exist only in presentations
    if !jwp.is_presentation() && jwp.payloads().iter().any(Payload::is_absent) {
        return Err(Error::InvalidProof("issued form contains an absent payload".into()));
    }

    let disclosed = jwp.disclosed().collect::<Vec<_>>();
    let headers = if jwp.is_presentation() { 2 } else { 1 };
    let blocks = SignatureBlocks::new(jwp.proof(), disclosed.len() + headers)
        .map_err(|e| Error::InvalidProof(e.to_string()))?;

    let members = jwp.issuer_header().members();
    let ephemeral = embedded_key(members, PROOF_JWK)?;
    let holder = embedded_key(members, PRESENTATION_JWK)?;

    let verifier = Verifier { su, alg: signature_alg };
    verifier.check(issuer, jwp.issuer_header().signing_input(), blocks.block(0)?, "issuer header")?;

    if let Some(presentation) = jwp.presentation_header() {
        verifier.check(
            &holder,
            presentation.signing_input(),
            blocks.block(1)?,
            "presentation header",
        )?;
    }

    for (index, payload) in disclosed.iter().enumerate() {
        let block = blocks.block(index + headers)?;
        verifier.check(&ephemeral, payload.to_text().as_bytes(), block, "payload")?;
    }

    Ok(())
}

struct Verifier<'a> {
    su: &'a SingleUse,
    alg: Algorithm,
}

impl Verifier<'_> {
    fn check(&self, key: &PublicKeyJwk, msg: &[u8], signature: &[u8], what: &str) -> Result<()> {
        match self.su.provider.verify(self.alg, key, msg, signature) {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!(alg = %self.alg, "{what} signature does not match");
                Err(Error::InvalidProof(format!("{what} signature does not match")))
            }
            Err(e) => {
                tracing::warn!(alg = %self.alg, "unable to verify {what}: {e}");
                Err(Error::InvalidProof(format!("unable to verify {what}: {e}")))
            }
        }
    }
}

fn embedded_key(members: &Object, name: &str) -> Result<PublicKeyJwk> {
    let jwk = members
        .get_object(name)
        .map_err(|e| Error::InvalidProof(e.to_string()))?
        .ok_or_else(|| Error::InvalidProof(format!("issuer header is missing '{name}'")))?;
    jwk.deserialize_into().map_err(|e| Error::InvalidProof(format!("malformed '{name}': {e}")))
}
