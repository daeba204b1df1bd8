use alloc::string::ToString;

use super::{
    ByteReader, ByteWriter, Deserializable, DeserializationError, Serializable, Signature,
    errors::FalconError,
    math::{FalconFelt, Polynomial},
    params::PublicParameters,
};

mod private_key;
pub use private_key::PrivateKey;

mod public_key;
pub use public_key::PublicKey;

/// Maps a key construction error to a deserialization error.
fn invalid_value(err: FalconError) -> DeserializationError {
    DeserializationError::InvalidValue(err.to_string())
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    #[test]
    fn falcon_verification() {
        let mut rng = ChaCha20Rng::from_seed([0_u8; 32]);

        // generate random keys
        let sk = PrivateKey::with_rng(64, &mut rng).unwrap();
        let pk = sk.public_key();

        // test private key serialization/deserialization
        let mut buffer = vec![];
        sk.write_into(&mut buffer);
        let sk_deserialized = PrivateKey::read_from_bytes(&buffer).unwrap();
        assert_eq!(sk.short_lattice_basis(), sk_deserialized.short_lattice_basis());
        assert_eq!(sk_deserialized.public_key(), pk);

        // sign a message
        let message = b"falcon";
        let signature = sk.sign_with_rng(message, &mut rng);

        // make sure the signature verifies correctly
        assert!(pk.verify(message, &signature));

        // a signature should not verify against a wrong message
        assert!(!pk.verify(b"falcoN", &signature));

        // a signature should not verify against a wrong public key
        let sk2 = PrivateKey::with_rng(64, &mut rng).unwrap();
        assert!(!sk2.public_key().verify(message, &signature));
    }
}
