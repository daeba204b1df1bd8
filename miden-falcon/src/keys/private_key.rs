use alloc::vec::Vec;
use core::fmt;

#[cfg(not(feature = "std"))]
use num::Float;
use num_complex::Complex64;
use rand::{CryptoRng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{instrument, trace};

use super::{
    ByteReader, ByteWriter, Deserializable, DeserializationError, FalconError, FalconFelt,
    Polynomial, PublicKey, PublicParameters, Serializable, Signature, invalid_value,
};
use crate::{
    MODULUS, SALT_LEN,
    encoding::compress,
    hash_to_point::hash_to_point,
    math::{LdlTree, ffldl, ffsampling, gram, normalize_tree, ntru_gen},
    signature::SignatureHeader,
    utils::zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing},
};

// PRIVATE KEY
// ================================================================================================

/// Represents the private key for Falcon over Z\[x\]/(x^n + 1).
///
/// The private key consists of four polynomials [f, g, F, G] that form a short basis of the NTRU
/// lattice, i.e., fG - gF = q mod (x^n + 1). The public key h = g / f mod q is derived from it.
///
/// On construction, the key also computes everything the signer needs:
///
/// 1. the basis B0 = [[g, -f], [G, -F]] in FFT form;
/// 2. the Falcon tree of B0, with its leaves normalized by sigma.
///
/// All of it is zeroized when the key is dropped.
#[derive(Clone)]
pub struct PrivateKey {
    params: &'static PublicParameters,
    /// [f, g, F, G] in coefficient form.
    basis: [Polynomial<i16>; 4],
    /// [g, -f, G, -F] in FFT form.
    b0_fft: [Polynomial<Complex64>; 4],
    tree: LdlTree,
    public_key: PublicKey,
}

impl PrivateKey {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Generates a private key of degree `n` from OS-provided randomness.
    ///
    /// # Errors
    /// Returns an error if `n` is not a supported degree.
    #[cfg(feature = "std")]
    pub fn new(n: usize) -> Result<Self, FalconError> {
        let mut rng = rand::rng();
        Self::with_rng(n, &mut rng)
    }

    /// Generates a private key of degree `n` using the provided random number generator.
    ///
    /// # Security Requirements
    ///
    /// The provided RNG must be cryptographically secure. Prefer [`PrivateKey::new()`] unless a
    /// reproducible key is needed.
    ///
    /// # Errors
    /// Returns an error if `n` is not a supported degree.
    #[instrument(level = "debug", skip(rng))]
    pub fn with_rng<R: Rng + CryptoRng>(n: usize, rng: &mut R) -> Result<Self, FalconError> {
        let params = PublicParameters::for_degree(n)?;
        let basis = ntru_gen(n, rng);
        Self::from_basis(params, basis)
    }

    /// Imports a private key from the coefficients of f, g, F and G.
    ///
    /// # Errors
    /// Returns an error if:
    /// - `n` is not a supported degree;
    /// - any of the polynomials does not have exactly `n` coefficients;
    /// - f is not invertible mod q;
    /// - the polynomials do not satisfy fG - gF = q mod (x^n + 1).
    #[allow(non_snake_case)]
    pub fn from_polys(
        n: usize,
        f: &[i16],
        g: &[i16],
        F: &[i16],
        G: &[i16],
    ) -> Result<Self, FalconError> {
        let params = PublicParameters::for_degree(n)?;
        for poly in [f, g, F, G] {
            if poly.len() != n {
                return Err(FalconError::InvalidPolysLength { expected: n, actual: poly.len() });
            }
        }

        let basis = [f, g, F, G].map(|poly| Polynomial::new(poly.to_vec()));
        Self::from_basis(params, basis)
    }

    /// Derives the public key, the FFT basis and the normalized tree from [f, g, F, G].
    fn from_basis(
        params: &'static PublicParameters,
        basis: [Polynomial<i16>; 4],
    ) -> Result<Self, FalconError> {
        let [f, g, big_f, big_g] = &basis;

        let h = Polynomial::<FalconFelt>::from(g).div_zq(&Polynomial::<FalconFelt>::from(f))?;
        let public_key = PublicKey::new(h)?;
        if !satisfies_ntru_equation(&basis) {
            return Err(FalconError::InvalidBasis);
        }

        let b0_fft = [
            Polynomial::<Complex64>::fft_of(g),
            -Polynomial::<Complex64>::fft_of(f),
            Polynomial::<Complex64>::fft_of(big_g),
            -Polynomial::<Complex64>::fft_of(big_f),
        ];
        let mut tree = ffldl(&gram(&b0_fft));
        normalize_tree(&mut tree, params.sigma);

        Ok(Self { params, basis, b0_fft, tree, public_key })
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

    /// Returns the public key corresponding to this private key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key.clone()
    }

    /// Returns the short basis [f, g, F, G] of this key.
    pub fn short_lattice_basis(&self) -> &[Polynomial<i16>; 4] {
        &self.basis
    }

    /// Returns the normalized Falcon tree of this key.
    pub fn tree(&self) -> &LdlTree {
        &self.tree
    }

    // SIGNATURE GENERATION
    // --------------------------------------------------------------------------------------------

    /// Signs a message with this private key.
    ///
    /// Signing is deterministic: the randomness of the signer is a ChaCha20 stream seeded with
    /// BLAKE3(log2(n) || private key || message), so the same key and message always produce
    /// the same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let mut rng = self.signing_rng(message);
        self.sign_with_rng(message, &mut rng)
    }

    /// Signs a message with this private key using the provided random number generator.
    ///
    /// The salt is drawn from `rng` once; preimages of its hash-to-point are then sampled until
    /// one is short enough and its s1 compresses into the signature body.
    pub fn sign_with_rng<R: Rng>(&self, message: &[u8], rng: &mut R) -> Signature {
        let mut salt = [0_u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        let point = hash_to_point(message, &salt, self.params.n);
        let slen = self.params.compressed_len();

        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            let (s0, s1) = self.sample_preimage(&point, rng);

            let norm = s0.norm_squared() + s1.norm_squared();
            if norm > self.params.sigbound {
                trace!(attempts, norm, "preimage is too long");
                continue;
            }
            match compress(&s1.coefficients, slen) {
                Ok(s1) => {
                    trace!(attempts, "signature generated");
                    return Signature::new(SignatureHeader::new(self.params.log_n()), salt, s1);
                },
                Err(err) => trace!(attempts, %err, "preimage does not compress"),
            }
        }
    }

    /// Samples a short preimage (s0, s1) of `point`, such that s0 + s1 * h = point mod q.
    ///
    /// The target t = (point, 0) * B0^-1 is computed in FFT form, a lattice vector v = z * B0
    /// close to it is drawn with the fast-Fourier sampler, and the preimage is (point, 0) - v.
    pub fn sample_preimage<R: Rng>(
        &self,
        point: &Polynomial<FalconFelt>,
        rng: &mut R,
    ) -> (Polynomial<i16>, Polynomial<i16>) {
        let [a, b, c, d] = &self.b0_fft;
        let q = MODULUS as f64;

        let point = point.map(FalconFelt::value);
        let point_fft = Polynomial::<Complex64>::fft_of(&point);
        let t0 = point_fft.hadamard_mul(d).map(|c| c / q);
        let t1 = point_fft.hadamard_mul(b).map(|c| -c / q);

        let (z0, z1) = ffsampling(&(t0, t1), &self.tree, self.params.sigmin, rng);

        let v0 = &z0.hadamard_mul(a) + &z1.hadamard_mul(c);
        let v1 = &z0.hadamard_mul(b) + &z1.hadamard_mul(d);
        let v0 = v0.ifft_real().map(|c| c.round() as i32);
        let v1 = v1.ifft_real().map(|c| c.round() as i32);

        let s0 = point
            .coefficients
            .iter()
            .zip(v0.coefficients.iter())
            .map(|(&p, &v)| saturate(i32::from(p) - v))
            .collect();
        let s1 = v1.map(|&v| saturate(-v));
        (Polynomial::new(s0), s1)
    }

    // HELPER METHODS
    // --------------------------------------------------------------------------------------------

    /// Returns the RNG used for deterministic signing of `message`.
    fn signing_rng(&self, message: &[u8]) -> ChaCha20Rng {
        let key_bytes = Zeroizing::new(self.to_bytes());
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[self.params.log_n()]);
        hasher.update(&key_bytes);
        hasher.update(message);

        let seed = Zeroizing::new(*hasher.finalize().as_bytes());
        ChaCha20Rng::from_seed(*seed)
    }
}

fn saturate(value: i32) -> i16 {
    value.clamp(i16::MIN.into(), i16::MAX.into()) as i16
}

/// Returns true if [f, g, F, G] satisfies fG - gF = q mod (x^n + 1) over the integers.
fn satisfies_ntru_equation(basis: &[Polynomial<i16>; 4]) -> bool {
    let [f, g, big_f, big_g] = basis.each_ref().map(|poly| poly.map(|&c| i64::from(c)));
    let n = f.len();
    let lhs = (&(&f * &big_g) - &(&g * &big_f)).reduce_by_cyclotomic(n);

    let mut expected = vec![0_i64; n];
    expected[0] = i64::from(MODULUS);
    lhs.coefficients == expected
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<elided secret for PrivateKey>")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<elided secret for PrivateKey>")
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        for poly in self.basis.iter_mut() {
            poly.zeroize();
        }
        for poly in self.b0_fft.iter_mut() {
            poly.zeroize_fft();
        }
        self.tree.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for PrivateKey {}

// SERIALIZATION / DESERIALIZATION
// ================================================================================================

impl Serializable for PrivateKey {
    fn write_into<W: ByteWriter>(&self, target: &mut W) {
        target.write_u8(self.params.log_n());
        for poly in self.basis.iter() {
            for &c in poly.coefficients.iter() {
                target.write_u16(c as u16);
            }
        }
    }
}

impl Deserializable for PrivateKey {
    fn read_from<R: ByteReader>(source: &mut R) -> Result<Self, DeserializationError> {
        let log_n = source.read_u8()?;
        let params = PublicParameters::for_log_degree(log_n).map_err(invalid_value)?;

        let mut polys: [Zeroizing<Vec<i16>>; 4] =
            core::array::from_fn(|_| Zeroizing::new(Vec::with_capacity(params.n)));
        for poly in polys.iter_mut() {
            for _ in 0..params.n {
                poly.push(source.read_u16()? as i16);
            }
        }

        let [f, g, big_f, big_g] = &polys;
        Self::from_polys(params.n, f, g, big_f, big_g).map_err(invalid_value)
    }
}

// TESTS
// ================================================================================================
