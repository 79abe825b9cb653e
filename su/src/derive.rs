//! # Derive
//!
//! A presentation keeps the issuer header and its signature untouched, adds a
//! presentation header signed by the holder, and carries only the blocks of
//! disclosed payloads:
//!
//! ```text
//! sig_issuer(issuer header) || sig_holder(presentation header) || sig(pi) ...
//! ```

use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_jwp::json::Object;
use credibil_jwp::{Error, Header, Jwp, Payload, ProofAlgorithm, Result, SignatureBlocks};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::{NONCE, SingleUse, signature_algorithm};

const NONCE_LENGTH: usize = 32;

pub fn derive(su: &SingleUse, issued: &Jwp, include: &[usize]) -> Result<Jwp> {
    tracing::debug!(disclose = ?include, "deriving presentation");

    if issued.is_presentation() {
        return Err(Error::Argument("JWP is already in presentation form".into()));
    }
    if issued.issuer_header().members().is_empty() {
        return Err(Error::Argument("JWP has an empty issuer header".into()));
    }
    let alg = issued.alg().unwrap_or_default();
    if !su.handles(alg) {
        return Err(Error::Argument(format!("JWP uses another proof algorithm: '{alg}'")));
    }
    if issued.proof().is_empty() {
        return Err(Error::Argument("JWP has no issued proof".into()));
    }

    let Some(holder_secret) = &su.holder_secret else {
        return Err(Error::Configuration("holder secret key is required to derive".into()));
    };
    let signature_alg = signature_algorithm(alg)?;

    let count = issued.payloads().len();
    if let Some(index) = include.iter().find(|&&i| i >= count) {
        return Err(Error::Argument(format!("payload index {index} is out of range")));
    }

    let payloads = issued
        .payloads()
        .iter()
        .enumerate()
        .map(|(i, p)| if include.contains(&i) { p.clone() } else { Payload::Absent })
        .collect::<Vec<_>>();

    let presentation = Header::new(Object::new().with(NONCE, nonce())?)?;

    let blocks = SignatureBlocks::new(issued.proof(), count + 1)?;
    let mut proof = blocks.block(0)?.to_vec();

    let signature = su
        .provider
        .sign(signature_alg, holder_secret, presentation.signing_input())
        .map_err(|e| Error::provider("signing the presentation header", e))?;
    if signature.len() != blocks.block_size() {
        return Err(Error::Configuration(format!(
            "holder signature is {} bytes but issued blocks are {}",
            signature.len(),
            blocks.block_size()
        )));
    }
    proof.extend(signature);

    for (index, payload) in payloads.iter().enumerate() {
        if payload.is_disclosed() {
            proof.extend_from_slice(blocks.block(index + 1)?);
        }
    }

    Ok(Jwp::new(issued.issuer_header().clone(), Some(presentation), payloads, proof))
}

fn nonce() -> String {
    let mut bytes = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}
