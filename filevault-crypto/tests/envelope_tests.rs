use filevault_crypto::{
    CryptoError, Envelope, KdfParams, ENVELOPE_HEADER_SIZE, IV_SIZE, SALT_SIZE, TAG_SIZE,
};

// Cheap parameters so the Argon2id passes don't dominate the suite.
fn fast_params() -> KdfParams {
    KdfParams {
        m_cost: 64,
        t_cost: 1,
        p_cost: 1,
    }
}

#[test]
fn seal_parse_open_roundtrip() {
    let envelope = Envelope::seal(b"hello vault", b"pw1", &fast_params()).unwrap();
    let blob = envelope.to_bytes();

    let parsed = Envelope::parse(&blob).unwrap();
    let plaintext = parsed.open(b"pw1", &fast_params()).unwrap();

    assert_eq!(plaintext, b"hello vault");
}

#[test]
fn envelope_layout_is_salt_iv_tag_ciphertext() {
    let envelope = Envelope::seal(b"layout check", b"pw", &fast_params()).unwrap();
    let blob = envelope.to_bytes();

    assert_eq!(&blob[..SALT_SIZE], envelope.salt.as_bytes());
    assert_eq!(&blob[SALT_SIZE..SALT_SIZE + IV_SIZE], &envelope.iv);
    assert_eq!(&blob[SALT_SIZE + IV_SIZE..ENVELOPE_HEADER_SIZE], &envelope.tag);
    assert_eq!(&blob[ENVELOPE_HEADER_SIZE..], &envelope.ciphertext[..]);
}

#[test]
fn wrong_credential_is_authentication_failure() {
    let envelope = Envelope::seal(b"secret", b"pw1", &fast_params()).unwrap();
    let result = envelope.open(b"pw2", &fast_params());
    assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
}

#[test]
fn flipped_ciphertext_bit_fails_authentication() {
    let mut envelope = Envelope::seal(b"tamper target", b"pw", &fast_params()).unwrap();
    envelope.ciphertext[0] ^= 0x01;

    let result = envelope.open(b"pw", &fast_params());
    assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
}

#[test]
fn flipped_tag_bit_fails_authentication() {
    let mut envelope = Envelope::seal(b"tamper target", b"pw", &fast_params()).unwrap();
    envelope.tag[TAG_SIZE - 1] ^= 0x80;

    let result = envelope.open(b"pw", &fast_params());
    assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
}

#[test]
fn every_byte_flip_in_ciphertext_is_detected() {
    let envelope = Envelope::seal(b"exhaustive", b"pw", &fast_params()).unwrap();

    for i in 0..envelope.ciphertext.len() {
        let mut tampered = envelope.clone();
        tampered.ciphertext[i] ^= 0xFF;
        assert!(
            matches!(
                tampered.open(b"pw", &fast_params()),
                Err(CryptoError::AuthenticationFailure)
            ),
            "flip at ciphertext byte {i} went undetected"
        );
    }
}

#[test]
fn short_blob_is_corrupt_envelope() {
    for len in [0, 1, 16, 32, 47] {
        let blob = vec![0u8; len];
        let result = Envelope::parse(&blob);
        assert!(
            matches!(result, Err(CryptoError::CorruptEnvelope { actual, .. }) if actual == len),
            "blob of {len} bytes should be rejected as corrupt"
        );
    }
}

#[test]
fn header_only_blob_parses_with_empty_ciphertext() {
    let blob = vec![0u8; ENVELOPE_HEADER_SIZE];
    let envelope = Envelope::parse(&blob).unwrap();
    assert!(envelope.ciphertext.is_empty());
}

#[test]
fn each_seal_produces_unique_salt_and_iv() {
    let e1 = Envelope::seal(b"same input", b"pw", &fast_params()).unwrap();
    let e2 = Envelope::seal(b"same input", b"pw", &fast_params()).unwrap();

    assert_ne!(e1.salt, e2.salt);
    assert_ne!(e1.iv, e2.iv);
    assert_ne!(e1.ciphertext, e2.ciphertext);

    // Both still open under the same password
    assert_eq!(e1.open(b"pw", &fast_params()).unwrap(), b"same input");
    assert_eq!(e2.open(b"pw", &fast_params()).unwrap(), b"same input");
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn seal_always_roundtrips(
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
            credential in proptest::collection::vec(any::<u8>(), 1..32),
        ) {
            let envelope = Envelope::seal(&plaintext, &credential, &fast_params()).unwrap();
            let parsed = Envelope::parse(&envelope.to_bytes()).unwrap();
            prop_assert_eq!(parsed.open(&credential, &fast_params()).unwrap(), plaintext);
        }
    }
}
