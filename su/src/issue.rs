//! # Issue
//!
//! Issued-form proof:
//!
//! ```text
//! sig_issuer(issuer header) || sig_ephemeral(p0) || ... || sig_ephemeral(pn)
//! ```

use anyhow::anyhow;
use credibil_jwp::json::Object;
use credibil_jwp::{ALG, Error, Header, Jwp, Payload, Result};

use crate::{PRESENTATION_JWK, PROOF_JWK, SingleUse};

pub fn issue(su: &SingleUse, payloads: &[Payload]) -> Result<Jwp> {
    tracing::debug!(alg = %su.alg, payloads = payloads.len(), "issuing JWP");

    if payloads.is_empty() {
        return Err(Error::Argument("at least one payload is required".into()));
    }
    if let Some(index) = payloads.iter().position(|p| !p.is_issuable()) {
        return Err(Error::Argument(format!("payload {index} cannot be issued")));
    }

    let Some(issuer_secret) = &su.issuer_secret else {
        return Err(Error::Configuration("issuer secret key is required to issue".into()));
    };
    let Some(holder) = &su.holder else {
        return Err(Error::Configuration("holder public key is required to issue".into()));
    };

    let ephemeral = su
        .provider
        .generate(su.alg)
        .map_err(|e| Error::provider("generating the ephemeral key", e))?;

    let members = Object::new()
        .with(ALG, su.identifier())?
        .with(PROOF_JWK, Object::from_serialize(&ephemeral.public)?)?
        .with(PRESENTATION_JWK, Object::from_serialize(holder)?)?;
    let header = Header::new(members)?;

    let mut proof = su
        .provider
        .sign(su.alg, issuer_secret, header.signing_input())
        .map_err(|e| Error::provider("signing the issuer header", e))?;
    let block_size = proof.len();

    for (index, payload) in payloads.iter().enumerate() {
        let signature = su
            .provider
            .sign(su.alg, &ephemeral.secret, payload.to_text().as_bytes())
            .map_err(|e| Error::provider(format!("signing payload {index}"), e))?;

        // blocks are located by position alone
        if signature.len() != block_size {
            return Err(Error::provider(
                format!("signing payload {index}"),
                anyhow!("signature is {} bytes, expected {block_size}", signature.len()),
            ));
        }
        proof.extend(signature);
    }

    Ok(Jwp::new(header, None, payloads.to_vec(), proof))
}
