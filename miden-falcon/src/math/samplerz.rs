#[cfg(not(feature = "std"))]
use num::Float;
use rand::Rng;

/// Upper bound on every standard deviation handed to [sampler_z].
const SIGMA_MAX: f64 = 1.8205;

/// 1 / (2 * SIGMA_MAX^2).
const INV_2SIGMA_MAX_SQ: f64 = 1f64 / (2f64 * SIGMA_MAX * SIGMA_MAX);

/// Reverse cumulative distribution table of a distribution very close to the half-Gaussian of
/// parameter SIGMA_MAX, at 72 bits of precision.
const RCDT: [u128; 18] = [
    3024686241123004913666,
    1564742784480091954050,
    636254429462080897535,
    199560484645026482916,
    47667343854657281903,
    8595902006365044063,
    1163297957344668388,
    117656387352093658,
    8867391802663976,
    496969357462633,
    20680885154299,
    638331848991,
    14602316184,
    247426747,
    3104126,
    28824,
    198,
    1,
];

/// Coefficients of a polynomial approximating exp(-x), scaled by 2^63, from FACCT:
///   https://eprint.iacr.org/2018/1234
///   https://github.com/raykzhao/gaussian
const FACCT: [u64; 13] = [
    0x00000004741183a3,
    0x00000036548cfc06,
    0x0000024fdcbf140a,
    0x0000171d939de045,
    0x0000d00cf58f6f84,
    0x000680681cf796e3,
    0x002d82d8305b0fea,
    0x011111110e066fd0,
    0x0555555555070f00,
    0x155555555581ff00,
    0x400000000002b400,
    0x7fffffffffff4800,
    0x8000000000000000,
];

/// Samples an integer from {0, ..., 18} according to the distribution χ, which is close to
/// the half-Gaussian distribution on the natural numbers with mean 0 and standard deviation
/// equal to SIGMA_MAX.
///
/// The 9 bytes are read as a little-endian 72-bit integer.
fn base_sampler(bytes: [u8; 9]) -> i16 {
    let mut buffer = [0u8; 16];
    buffer[..9].copy_from_slice(&bytes);
    let u = u128::from_le_bytes(buffer);
    RCDT.into_iter().filter(|r| u < *r).count() as i16
}

/// Computes an integer approximation of 2^63 * ccs * exp(-x), for x in [0, ln 2] and ccs in
/// [0, 1].
fn approx_exp(x: f64, ccs: f64) -> u64 {
    let twoe63 = (1u64 << 63) as f64;

    // Horner evaluation in 63-bit fixed point
    let z = f64::floor(x * twoe63) as u64;
    let mut y = FACCT[0];
    for c in FACCT.iter().skip(1) {
        let zy = (z as u128) * (y as u128);
        y = c - ((zy >> 63) as u64);
    }

    let z = f64::floor(twoe63 * ccs) as u64;
    (((z as u128) * (y as u128)) >> 63) as u64
}

/// A random bool that is true with probability ≈ ccs · exp(-x).
///
/// Random bytes are drawn one at a time and compared against the most significant remaining
/// byte of 2^64 · ccs · exp(-x); the first difference decides the outcome.
fn ber_exp<R: Rng>(x: f64, ccs: f64, rng: &mut R) -> bool {
    const LN2: f64 = core::f64::consts::LN_2;
    const ILN2: f64 = 1.0 / LN2;
    let s = f64::floor(x * ILN2);
    let r = x - s * LN2;
    let s = (s as u64).min(63);
    let z = (approx_exp(r, ccs) << 1).saturating_sub(1) >> s;

    let mut w = 0_i32;
    for i in (0..=56).rev().step_by(8) {
        let mut byte = [0_u8; 1];
        rng.fill_bytes(&mut byte);
        w = (byte[0] as i32) - ((z >> i) & 0xff) as i32;
        if w != 0 {
            break;
        }
    }
    w < 0
}

/// Samples an integer from the discrete Gaussian distribution D_{Z, mu, sigma}.
///
/// Requires `1 < sigma_min < sigma < 1.8205`. Each attempt consumes 9 bytes for the base
/// sampler, 1 byte for the sign, then between 1 and 8 bytes for the Bernoulli test; attempts
/// are repeated until one is accepted.
pub fn sampler_z<R: Rng>(mu: f64, sigma: f64, sigma_min: f64, rng: &mut R) -> i16 {
    let isigma = 1f64 / sigma;
    let dss = 0.5f64 * isigma * isigma;
    let s = f64::floor(mu);
    let r = mu - s;
    let ccs = sigma_min * isigma;
    loop {
        let mut base_bytes = [0_u8; 9];
        rng.fill_bytes(&mut base_bytes);
        let z0 = base_sampler(base_bytes);

        let mut sign_byte = [0_u8; 1];
        rng.fill_bytes(&mut sign_byte);

        // x = ((z - r)^2) / (2 * sigma^2) - (z0^2) / (2 * sigma_max^2)
        let b = (sign_byte[0] & 1) as i16;
        let z = b + (2 * b - 1) * z0;
        let z_minus_r = (z as f64) - r;
        let x = z_minus_r * z_minus_r * dss - (z0 * z0) as f64 * INV_2SIGMA_MAX_SQ;

        if ber_exp(x, ccs, rng) {
            return z + (s as i16);
        }
    }
}

// TESTS
// ================================================================================================
