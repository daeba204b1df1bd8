use alloc::vec::Vec;

use assert_matches::assert_matches;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rstest::rstest;

use crate::{
    FalconError, PrivateKey, PublicKey, PublicParameters, SALT_LEN, Serializable, Signature,
    SignatureHeader, compress, decompress, hash_to_point, utils::Deserializable,
};

#[test]
fn test_end_to_end_degree_16() {
    let mut rng = ChaCha20Rng::from_seed([16_u8; 32]);
    let sk = PrivateKey::with_rng(16, &mut rng).unwrap();
    let pk = sk.public_key();
    let params = PublicParameters::for_degree(16).unwrap();

    // hash a message to a point and sample a short preimage of it
    let message = b"end to end";
    let mut salt = [0_u8; SALT_LEN];
    rng.fill(&mut salt);
    let point = hash_to_point(message, &salt, 16);
    let (_, s1) = loop {
        let (s0, s1) = sk.sample_preimage(&point, &mut rng);
        if s0.norm_squared() + s1.norm_squared() <= params.sigbound {
            break (s0, s1);
        }
    };

    // compress s1 into the signature body and read it back
    let body = compress(&s1.coefficients, params.compressed_len()).unwrap();
    assert_eq!(decompress(&body, params.compressed_len(), 16).unwrap(), s1.coefficients);

    let mut bytes = vec![SignatureHeader::new(4).as_byte()];
    bytes.extend_from_slice(&salt);
    bytes.extend_from_slice(&body);
    assert_eq!(bytes.len(), params.sigbytelen);

    assert!(pk.verify_bytes(message, &bytes));
    assert!(!pk.verify_bytes(b"end to enD", &bytes));
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
#[case(16)]
#[case(32)]
#[case(64)]
#[case(128)]
#[case(256)]
#[case(512)]
#[case(1024)]
fn test_sign_and_verify_every_degree(#[case] n: usize) {
    let mut rng = ChaCha20Rng::from_seed([n.trailing_zeros() as u8; 32]);
    let sk = PrivateKey::with_rng(n, &mut rng).unwrap();
    let pk = sk.public_key();
    assert_eq!(pk.n(), n);

    let message = b"every degree";
    let signature = sk.sign_with_rng(message, &mut rng);
    assert_eq!(signature.to_bytes().len(), sk.params().sigbytelen);
    assert!(pk.verify(message, &signature));
    assert!(!pk.verify(b"every degreE", &signature));

    let s1 = signature.s1().unwrap();
    assert_eq!(s1.len(), n);
}

#[test]
fn test_wrong_key_and_wrong_degree_are_rejected() {
    let mut rng = ChaCha20Rng::from_seed([1_u8; 32]);
    let sk = PrivateKey::with_rng(32, &mut rng).unwrap();
    let other = PrivateKey::with_rng(32, &mut rng).unwrap();
    let smaller = PrivateKey::with_rng(16, &mut rng).unwrap();

    let signature = sk.sign(b"key");
    assert!(sk.public_key().verify(b"key", &signature));
    assert!(!other.public_key().verify(b"key", &signature));
    assert!(!smaller.public_key().verify(b"key", &signature));
}

#[test]
fn test_signature_determinism() {
    let mut rng = ChaCha20Rng::from_seed([2_u8; 32]);
    let sk = PrivateKey::with_rng(64, &mut rng).unwrap();
    let message = b"data";

    let signature1 = sk.sign(message);
    let signature2 = sk.sign(message);
    assert_eq!(signature1.to_bytes(), signature2.to_bytes());

    // a deserialized copy of the key signs identically
    let sk_copy = PrivateKey::read_from_bytes(&sk.to_bytes()).unwrap();
    assert_eq!(sk_copy.sign(message), signature1);

    assert!(sk.public_key().verify(message, &signature1));
}

#[test]
fn test_serialization_round_trips() {
    let mut rng = ChaCha20Rng::from_seed([3_u8; 32]);
    let sk = PrivateKey::with_rng(128, &mut rng).unwrap();
    let pk = sk.public_key();
    let signature = sk.sign_with_rng(b"bytes", &mut rng);

    let pk_copy = PublicKey::read_from_bytes(&pk.to_bytes()).unwrap();
    assert_eq!(pk_copy, pk);
    assert_eq!(PublicKey::from_coefficients(&pk.to_coefficients()).unwrap(), pk);

    let signature_copy = Signature::read_from_bytes(&signature.to_bytes()).unwrap();
    assert_eq!(signature_copy, signature);
    assert!(pk_copy.verify(b"bytes", &signature_copy));
}

#[test]
fn test_malformed_signatures_fail_verification() {
    let mut rng = ChaCha20Rng::from_seed([4_u8; 32]);
    let sk = PrivateKey::with_rng(16, &mut rng).unwrap();
    let pk = sk.public_key();
    let mut bytes = sk.sign(b"malformed").to_bytes();
    assert!(pk.verify_bytes(b"malformed", &bytes));

    // header names another degree
    bytes[0] = SignatureHeader::new(5).as_byte();
    assert!(!pk.verify_bytes(b"malformed", &bytes));
    // header names another encoding
    bytes[0] = 0x24;
    assert!(!pk.verify_bytes(b"malformed", &bytes));
    bytes[0] = SignatureHeader::new(4).as_byte();

    // a body made of padding only
    let body = 1 + SALT_LEN;
    let mut zeroed = bytes.clone();
    zeroed[body..].fill(0);
    assert!(!pk.verify_bytes(b"malformed", &zeroed));

    // truncated signature
    assert!(!pk.verify_bytes(b"malformed", &bytes[..bytes.len() - 1]));
}

#[test]
fn test_verify_batch() {
    let mut rng = ChaCha20Rng::from_seed([5_u8; 32]);
    let sk = PrivateKey::with_rng(64, &mut rng).unwrap();
    let pk = sk.public_key();

    let messages: [&[u8]; 4] = [b"one", b"two", b"three", b"four"];
    let signatures: Vec<Signature> = messages.iter().map(|m| sk.sign(m)).collect();

    let mut batch: Vec<(&[u8], &Signature)> = messages.iter().copied().zip(&signatures).collect();
    assert_eq!(pk.verify_batch(&batch), [true; 4]);

    batch[2].0 = b"five";
    assert_eq!(pk.verify_batch(&batch), [true, true, false, true]);
    assert!(pk.verify_batch(&[]).is_empty());
}

#[test]
fn test_compress_overflow() {
    assert_matches!(compress(&[128, 256, 512, 1024], 2), Err(FalconError::EncodingTooLong(2)));
}

#[test]
fn test_invalid_degrees() {
    let mut rng = ChaCha20Rng::from_seed([6_u8; 32]);
    assert_matches!(PrivateKey::with_rng(12, &mut rng), Err(FalconError::InvalidDegree(12)));
    assert_matches!(PrivateKey::with_rng(2048, &mut rng), Err(FalconError::InvalidDegree(2048)));
}
