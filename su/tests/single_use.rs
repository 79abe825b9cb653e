//! Single-Use Proof Algorithm Tests
//!
//! Issue, derive and verify flows exercised through the compact serialization,
//! with issuer, holder and verifier each holding only their own keys.

use assert_let_bind::assert_let;
use base64ct::{Base64UrlUnpadded, Encoding};
use credibil_jwa::{Algorithm, KeyPair};
use credibil_jwp::json::Object;
use credibil_jwp::{Error, Header, Jwp, Payload, ProofAlgorithm, Registry};
use credibil_jwp_su::{NONCE, PREFIX, PRESENTATION_JWK, PROOF_JWK, SingleUse};

fn issuer(alg: Algorithm) -> SingleUse {
    SingleUse::builder(alg)
        .issuer_keys(test_utils::keypair(alg, "issuer"))
        .holder(test_utils::keypair(alg, "holder").public)
        .build()
}

fn holder(alg: Algorithm) -> SingleUse {
    SingleUse::builder(alg).holder_keys(test_utils::keypair(alg, "holder")).build()
}

fn verifier(alg: Algorithm) -> SingleUse {
    SingleUse::builder(alg).issuer(test_utils::keypair(alg, "issuer").public).build()
}

fn registry(alg: Algorithm) -> Registry {
    Registry::new().with(PREFIX, verifier(alg))
}

// Replace segment `index` of a compact JWP.
fn replace_segment(compact: &str, index: usize, segment: &str) -> String {
    let mut parts = compact.split('.').map(ToString::to_string).collect::<Vec<_>>();
    parts[index] = segment.to_string();
    parts.join(".")
}

// Replace payload `index` of a compact JWP's payload segment.
fn replace_payload(compact: &str, index: usize, text: &str) -> String {
    let parts = compact.split('.').collect::<Vec<_>>();
    let position = parts.len() - 2;
    let mut payloads = parts[position].split('~').map(ToString::to_string).collect::<Vec<_>>();
    payloads[index] = Base64UrlUnpadded::encode_string(text.as_bytes());
    replace_segment(compact, position, &payloads.join("~"))
}

// Flip one bit of the proof byte at `offset`.
fn flip_proof_bit(compact: &str, offset: usize) -> String {
    let parts = compact.split('.').collect::<Vec<_>>();
    let position = parts.len() - 1;
    let mut proof = Base64UrlUnpadded::decode_vec(parts[position]).expect("should decode proof");
    proof[offset] ^= 0x01;
    replace_segment(compact, position, &Base64UrlUnpadded::encode_string(&proof))
}

#[test]
fn selective_disclosure() {
    test_utils::init_tracer();
    let alg = Algorithm::ES256;

    let issued = issuer(alg).issue(&["Gabriel".into(), "Bauman".into()]).expect("should issue");
    assert_eq!(issued.proof().len(), 192);
    verifier(alg).verify(&issued).expect("issued form should verify");

    let presented = holder(alg).derive(&issued, &[1]).expect("should derive");
    assert_eq!(presented.payloads(), &[Payload::Absent, "Bauman".into()]);
    assert_eq!(presented.proof().len(), 192);
    verifier(alg).verify(&presented).expect("presentation should verify");

    // second block is the holder's signature over the presentation header
    let tampered = flip_proof_bit(presented.serialize(), 70);
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));

    // third block is the issuer's signature over "Bauman"
    let tampered = flip_proof_bit(presented.serialize(), 130);
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));
}

#[test]
fn compact_round_trip() {
    test_utils::init_tracer();
    let alg = Algorithm::ES256;

    let payloads = [
        Payload::from("Gabriel"),
        Payload::from(""),
        Payload::from(42),
        Payload::from(-1.25),
        Payload::from(true),
        Payload::Null,
    ];
    let issued = issuer(alg).issue(&payloads).expect("should issue");

    let compact = issued.serialize();
    assert_eq!(compact.split('.').count(), 3);
    assert!(compact.contains("~IiI~"), "empty string payload should encode as \"\"");

    let parsed = Jwp::parse(compact, &registry(alg)).expect("should parse");
    assert!(!parsed.is_presentation());
    assert_eq!(parsed.payloads(), &payloads);
    assert_eq!(parsed.issuer_header().encoded(), issued.issuer_header().encoded());
    assert_eq!(parsed.proof(), issued.proof());
    registry(alg).verify(&parsed).expect("should verify");

    // the holder receives the compact text, not the issuer's instance
    let received = Jwp::parse_with(compact, &holder(alg)).expect("should parse");
    let presented = holder(alg).derive(&received, &[0, 1, 4]).expect("should derive");

    let compact = presented.serialize();
    assert_eq!(compact.split('.').count(), 4);

    let parsed = Jwp::parse(compact, &registry(alg)).expect("should parse");
    assert!(parsed.is_presentation());
    assert_eq!(
        parsed.payloads(),
        &[
            Payload::from("Gabriel"),
            Payload::from(""),
            Payload::Absent,
            Payload::Absent,
            Payload::from(true),
            Payload::Absent,
        ]
    );
    registry(alg).verify(&parsed).expect("should verify");
}

#[test]
fn issuer_header_is_immutable() {
    let alg = Algorithm::ES256;

    let issued = issuer(alg).issue(&["a".into(), "b".into(), "c".into()]).expect("should issue");
    let presented = holder(alg).derive(&issued, &[2]).expect("should derive");

    assert_eq!(presented.issuer_header().encoded(), issued.issuer_header().encoded());
    assert_eq!(presented.issuer_header().signing_input(), issued.issuer_header().signing_input());
    assert_eq!(&presented.proof()[..64], &issued.proof()[..64]);

    let issued_parts = issued.serialize().split('.').collect::<Vec<_>>();
    let presented_parts = presented.serialize().split('.').collect::<Vec<_>>();
    assert_eq!(issued_parts[0], presented_parts[0]);
}

#[test]
fn tampered_issuer_header() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["a".into()]).expect("should issue");

    // same members, different bytes
    let mut json = issued.issuer_header().signing_input().to_vec();
    json.insert(1, b' ');
    let tampered = replace_segment(issued.serialize(), 0, &Base64UrlUnpadded::encode_string(&json));

    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_eq!(parsed.issuer_header().members(), issued.issuer_header().members());
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));
}

#[test]
fn tampered_presentation_header() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["a".into()]).expect("should issue");
    let presented = holder(alg).derive(&issued, &[0]).expect("should derive");

    let header = Header::new(Object::new().with(NONCE, "AAAA").expect("should insert"))
        .expect("should encode");
    let tampered = replace_segment(presented.serialize(), 1, header.encoded());

    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));
}

#[test]
fn tampered_payload() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["Gabriel".into(), 30.into()]).expect("should issue");

    let tampered = replace_payload(issued.serialize(), 1, "31");
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));

    let presented = holder(alg).derive(&issued, &[0]).expect("should derive");
    let tampered = replace_payload(presented.serialize(), 0, "\"Mallory\"");
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));

    // disclosing a withheld payload leaves the proof one block short
    let tampered = replace_payload(presented.serialize(), 1, "30");
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));
}

#[test]
fn issued_header_signature() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["a".into(), "b".into()]).expect("should issue");

    let tampered = flip_proof_bit(issued.serialize(), 3);
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));

    let tampered = flip_proof_bit(issued.serialize(), 64 * 2 + 3);
    let parsed = Jwp::parse(&tampered, &registry(alg)).expect("should parse");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&parsed));
}

#[test]
fn algorithms() {
    test_utils::init_tracer();

    let cases = [
        (Algorithm::ES256, 64),
        (Algorithm::ES384, 96),
        (Algorithm::ES512, 132),
        (Algorithm::ES256K, 64),
        (Algorithm::EdDSA, 64),
        (Algorithm::RS256, 256),
    ];

    for (alg, block_size) in cases {
        let issued = issuer(alg)
            .issue(&["Gabriel".into(), "Bauman".into(), 1984.into()])
            .expect("should issue");
        assert_eq!(issued.alg(), Some(format!("SU-{alg}").as_str()));
        assert_eq!(issued.proof().len(), 4 * block_size, "{alg} issued proof length");

        let parsed = Jwp::parse(issued.serialize(), &registry(alg)).expect("should parse");
        verifier(alg).verify(&parsed).expect("issued form should verify");

        let presented = holder(alg).derive(&parsed, &[0, 2]).expect("should derive");
        assert_eq!(presented.proof().len(), 4 * block_size, "{alg} presentation proof length");

        let parsed = Jwp::parse(presented.serialize(), &registry(alg)).expect("should parse");
        verifier(alg).verify(&parsed).expect("presentation should verify");
    }
}

#[test]
fn wrong_holder_key() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["a".into()]).expect("should issue");

    // a holder other than the one named in the issuer header
    let imposter = SingleUse::builder(alg).holder_keys(test_utils::keypair(alg, "imposter")).build();
    let presented = imposter.derive(&issued, &[0]).expect("should derive");
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&presented));
}

#[test]
fn unresolvable_algorithm() {
    let header = Header::new(Object::new().with("alg", "BBS").expect("should insert"))
        .expect("should encode");
    let jwp = Jwp::new(header, None, vec!["a".into()], vec![1, 2, 3]);

    assert_let!(
        Err(Error::UnresolvableAlgorithm(_)),
        Jwp::parse(jwp.serialize(), &registry(Algorithm::ES256))
    );
    assert_let!(Err(Error::UnverifiableProof(_)), registry(Algorithm::ES256).verify(&jwp));
}

#[test]
fn configuration() {
    let alg = Algorithm::ES256;

    assert_let!(Err(Error::Configuration(_)), verifier(alg).issue(&["a".into()]));
    assert_let!(Err(Error::Configuration(_)), holder(alg).issue(&["a".into()]));

    let issued = issuer(alg).issue(&["a".into()]).expect("should issue");
    assert_let!(Err(Error::Configuration(_)), verifier(alg).derive(&issued, &[0]));
    assert_let!(Err(Error::UnverifiableProof(_)), holder(alg).verify(&issued));
}

#[test]
fn issued_form_hides_nothing() {
    let alg = Algorithm::ES256;
    let issued = issuer(alg).issue(&["Gabriel".into(), "Bauman".into()]).expect("should issue");

    // withhold the first payload and its block without a presentation header
    let mut proof = issued.proof()[..64].to_vec();
    proof.extend_from_slice(&issued.proof()[128..]);
    let payloads = format!("~{}", Base64UrlUnpadded::encode_string(b"\"Bauman\""));
    let compact = format!(
        "{}.{payloads}.{}",
        issued.issuer_header().encoded(),
        Base64UrlUnpadded::encode_string(&proof)
    );
    assert_let!(Err(Error::Format(_)), Jwp::parse(&compact, &registry(alg)));

    let stripped =
        Jwp::new(issued.issuer_header().clone(), None, vec![Payload::Absent, "Bauman".into()], proof);
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&stripped));
}

// An issued-form JWP signed by the issuer over the given header members.
fn sign_issued(alg: Algorithm, members: Object, ephemeral: &KeyPair) -> Jwp {
    let header = Header::new(members).expect("should encode");
    let issuer_keys = test_utils::keypair(alg, "issuer");

    let mut proof =
        alg.try_sign(header.signing_input(), &issuer_keys.secret).expect("should sign header");
    let payload = Payload::from("Gabriel");
    proof.extend(
        alg.try_sign(payload.to_text().as_bytes(), &ephemeral.secret).expect("should sign payload"),
    );
    Jwp::new(header, None, vec![payload], proof)
}

#[test]
fn requires_both_embedded_keys() {
    let alg = Algorithm::ES256;
    let ephemeral = alg.generate().expect("should generate");
    let proof_jwk = Object::from_serialize(&ephemeral.public).expect("should convert");
    let holder_jwk =
        Object::from_serialize(&test_utils::keypair(alg, "holder").public).expect("should convert");

    let complete = Object::new()
        .with("alg", "SU-ES256")
        .and_then(|o| o.with(PROOF_JWK, proof_jwk.clone()))
        .and_then(|o| o.with(PRESENTATION_JWK, holder_jwk))
        .expect("should build header");
    verifier(alg).verify(&sign_issued(alg, complete, &ephemeral)).expect("should verify");

    let without_holder = Object::new()
        .with("alg", "SU-ES256")
        .and_then(|o| o.with(PROOF_JWK, proof_jwk))
        .expect("should build header");
    let jwp = sign_issued(alg, without_holder, &ephemeral);
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&jwp));

    let malformed_holder = Object::new()
        .with("alg", "SU-ES256")
        .and_then(|o| o.with(PROOF_JWK, Object::from_serialize(&ephemeral.public)?))
        .and_then(|o| o.with(PRESENTATION_JWK, "not a key"))
        .expect("should build header");
    let jwp = sign_issued(alg, malformed_holder, &ephemeral);
    assert_let!(Err(Error::InvalidProof(_)), verifier(alg).verify(&jwp));
}
