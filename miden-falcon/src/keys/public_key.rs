//! Public key type for the Falcon signature scheme.

use alloc::vec::Vec;

#[cfg(feature = "concurrent")]
use rayon::prelude::*;
use tracing::debug;

use super::{
    ByteReader, ByteWriter, Deserializable, DeserializationError, FalconError, FalconFelt,
    Polynomial, PublicParameters, Serializable, Signature, invalid_value,
};

// PUBLIC KEY
// ================================================================================================

/// Public key for Falcon over Z_q\[x\]/(x^n + 1).
///
/// The key is the polynomial h = g / f mod (q, x^n + 1), where f and g are the first two
/// polynomials of the matching private key.
#[derive(Debug, Clone)]
pub struct PublicKey {
    params: &'static PublicParameters,
    h: Polynomial<FalconFelt>,
}

impl PublicKey {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Creates a public key from the polynomial h. The ring degree is the length of h.
    ///
    /// # Errors
    /// Returns an error if the length of h is not a supported degree.
    pub fn new(h: Polynomial<FalconFelt>) -> Result<Self, FalconError> {
        let params = PublicParameters::for_degree(h.len())?;
        Ok(Self { params, h })
    }

    /// Creates a public key from the coefficients of h, which are reduced mod q.
    ///
    /// # Errors
    /// Returns an error if the number of coefficients is not a supported degree.
    pub fn from_coefficients(h: &[i16]) -> Result<Self, FalconError> {
        Self::new(Polynomial::from(h))
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    /// Returns the ring degree n of this key.
    pub fn n(&self) -> usize {
        self.params.n
    }

    /// Returns the parameter set of this key.
    pub fn params(&self) -> &'static PublicParameters {
        self.params
    }

    /// Returns the public key polynomial h.
    pub fn h(&self) -> &Polynomial<FalconFelt> {
        &self.h
    }

    /// Returns the coefficients of h as integers in [0, q).
    pub fn to_coefficients(&self) -> Vec<i16> {
        self.h.coefficients.iter().map(|c| c.value() as i16).collect()
    }

    // SIGNATURE VERIFICATION
    // --------------------------------------------------------------------------------------------

    /// Returns true if `signature` is a valid signature of `message` under this public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        signature.verify(message, self)
    }

    /// Parses `signature` and verifies it against `message`. Returns false if the signature
    /// cannot be parsed.
    pub fn verify_bytes(&self, message: &[u8], signature: &[u8]) -> bool {
        match Signature::read_from_bytes(signature) {
            Ok(signature) => self.verify(message, &signature),
            Err(err) => {
                debug!(%err, "failed to parse signature");
                false
            },
        }
    }

    /// Verifies a batch of (message, signature) pairs against this public key, returning one
    /// verdict per pair.
    ///
    /// When the `concurrent` feature is enabled, the pairs are verified in parallel.
    pub fn verify_batch(&self, batch: &[(&[u8], &Signature)]) -> Vec<bool> {
        #[cfg(feature = "concurrent")]
        let iter = batch.par_iter();
        #[cfg(not(feature = "concurrent"))]
        let iter = batch.iter();

        iter.map(|(message, signature)| self.verify(message, signature)).collect()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.h == other.h
    }
}

impl Eq for PublicKey {}

// SERIALIZATION / DESERIALIZATION
// ================================================================================================

impl Serializable for PublicKey {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        target.write_u8(self.params.log_n());
        for c in self.h.coefficients.iter() {
            target.write_u16(c.value());
        }
    }
}

impl Deserializable for PublicKey {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let log_n = source.read_u8()?;
        let params = PublicParameters::for_log_degree(log_n).map_err(invalid_value)?;

        let mut coefficients = Vec::with_capacity(params.n);
        for _ in 0..params.n {
            let value = source.read_u16()?;
            if value >= crate::MODULUS as u16 {
                return Err(DeserializationError::InvalidValue(format!(
                    "Failed to decode public key: coefficient {value} is not reduced mod q"
                )));
            }
            coefficients.push(FalconFelt::new(value));
        }

        Ok(Self { params, h: Polynomial::new(coefficients) })
    }
}

// TESTS
// ================================================================================================
