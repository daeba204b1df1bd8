use alloc::{string::ToString, vec::Vec};

use tracing::debug;

use super::{
    ByteReader, ByteWriter, Deserializable, DeserializationError, SALT_LEN, Serializable,
    encoding::decompress,
    hash_to_point::hash_to_point,
    keys::PublicKey,
    math::{FalconFelt, Polynomial},
    params::PublicParameters,
};

// FALCON SIGNATURE
// ================================================================================================

/// A Falcon signature over a message.
///
/// The signature consists of a salt `r` and the compressed polynomial s1. Together with the
/// hash-to-point c = HashToPoint(r || message), it verifies against a public key h if and only
/// if, for s0 = c - s1 * h mod (q, x^n + 1) taken in balanced form,
///
/// |s0|^2 + |s1|^2 <= β²
///
/// where β² is the squared-norm bound of the ring degree n.
///
/// ## Serialization Format
///
/// 1. Header byte (1 byte): `0x30 + log2(n)`.
/// 2. Salt (40 bytes).
/// 3. Compressed s1 (`sigbytelen - 41` bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    header: SignatureHeader,
    salt: [u8; SALT_LEN],
    s1: Vec<u8>,
}

impl Signature {
    // CONSTRUCTOR
    // --------------------------------------------------------------------------------------------

    /// Creates a signature from its header, salt and compressed s1 polynomial.
    pub(crate) fn new(header: SignatureHeader, salt: [u8; SALT_LEN], s1: Vec<u8>) -> Self {
        Self { header, salt, s1 }
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Returns the header of this signature.
    pub fn header(&self) -> &SignatureHeader {
        &self.header
    }

    /// Returns the salt mixed into the hash-to-point of the signed message.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// Returns the compressed encoding of s1.
    pub fn compressed_s1(&self) -> &[u8] {
        &self.s1
    }

    /// Decompresses s1.
    ///
    /// # Errors
    /// Returns an error if the header does not name a supported degree or if the encoding is
    /// invalid.
    pub fn s1(&self) -> Result<Polynomial<i16>, crate::FalconError> {
        let params = PublicParameters::for_log_degree(self.header.log_n())?;
        decompress(&self.s1, params.compressed_len(), params.n).map(Polynomial::new)
    }

    // SIGNATURE VERIFICATION
    // --------------------------------------------------------------------------------------------

    /// Returns true if this signature is a valid signature of `message` under `pub_key`.
    ///
    /// A signature whose degree differs from the degree of the key, or whose s1 cannot be
    /// decompressed, is rejected.
    pub fn verify(&self, message: &[u8], pub_key: &PublicKey) -> bool {
        let params = pub_key.params();
        if self.header.log_n() != params.log_n() {
            debug!(
                signature_log_n = self.header.log_n(),
                key_log_n = params.log_n(),
                "signature degree does not match the public key"
            );
            return false;
        }
        let s1 = match self.s1() {
            Ok(s1) => s1,
            Err(err) => {
                debug!(%err, "failed to decompress signature");
                return false;
            },
        };

        let c = hash_to_point(message, &self.salt, params.n);
        verify_helper(&c, &s1, pub_key)
    }
}

impl Serializable for Signature {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        target.write(&self.header);
        target.write_bytes(&self.salt);
        target.write_bytes(&self.s1);
    }
}

impl Deserializable for Signature {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let header: SignatureHeader = source.read()?;
        let salt = source.read_array()?;
        let params = PublicParameters::for_log_degree(header.log_n())
            .map_err(|err| DeserializationError::InvalidValue(err.to_string()))?;
        let s1 = source.read_vec(params.compressed_len())?;

        Ok(Self { header, salt, s1 })
    }
}

// SIGNATURE HEADER
// ================================================================================================

/// The header byte used to encode the signature metadata.
///
/// According to section 3.11.3 of the Falcon specification [1], the header has the format
/// `0cc1nnnn` where `cc = 01` denotes the compressed encoding of s1 and `nnnn` encodes log2(n).
///
/// [1]: https://falcon-sign.info/falcon.pdf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureHeader(u8);

impl SignatureHeader {
    const ENCODING: u8 = 0b0011;

    /// Returns the header of a signature over the ring of degree 2^log_n.
    pub fn new(log_n: u8) -> Self {
        Self((Self::ENCODING << 4) | log_n)
    }

    /// Returns log2 of the ring degree.
    pub fn log_n(&self) -> u8 {
        self.0 & 0b0000_1111
    }

    /// Returns the raw header byte.
    pub fn as_byte(&self) -> u8 {
        self.0
    }
}

impl Serializable for &SignatureHeader {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        target.write_u8(self.0)
    }
}

impl Deserializable for SignatureHeader {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let header = source.read_u8()?;
        let (encoding, log_n) = (header >> 4, header & 0b0000_1111);
        if encoding != Self::ENCODING {
            return Err(DeserializationError::InvalidValue(
                "Failed to decode signature: not supported encoding algorithm".to_string(),
            ));
        }
        if PublicParameters::for_log_degree(log_n).is_err() {
            return Err(DeserializationError::InvalidValue(format!(
                "Failed to decode signature: degree 2^{log_n} is not supported"
            )));
        }

        Ok(Self(header))
    }
}

// HELPER FUNCTIONS
// ================================================================================================

/// Takes the hash-to-point polynomial `c` of a message, the signature polynomial s1 and a public
/// key, and returns `true` if the signature is valid.
fn verify_helper(c: &Polynomial<FalconFelt>, s1: &Polynomial<i16>, pub_key: &PublicKey) -> bool {
    let s1_felt = Polynomial::<FalconFelt>::from(s1);
    let s0 = c - &s1_felt.mul_zq(pub_key.h());

    let norm = s0.norm_squared() + s1.norm_squared();
    let bound = pub_key.params().sigbound;
    if norm > bound {
        debug!(norm, bound, "signature norm exceeds the bound");
        return false;
    }
    true
}

// TESTS
// ================================================================================================
