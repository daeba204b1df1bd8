//! NTRU basis generation: sampling (f, g) and solving fG - gF = q.

use num::{BigInt, One};
use num_complex::Complex64;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::{FalconFelt, Polynomial, bigint::reduce, samplerz::sampler_z, xgcd};
use crate::MODULUS;

/// Standard deviation of the Gaussian from which the coefficients of f and g are drawn, for the
/// largest degree: 1.17 * sqrt(q / 8192).
const SIGMA_FG: f64 = 1.43300980528773;

/// Number of samples summed per coefficient at degree n is `GEN_POLY_SAMPLES / n`.
const GEN_POLY_SAMPLES: usize = 4096;

/// Bound on the squared Gram-Schmidt norm of a candidate basis: (1.17)^2 * q.
const GS_NORM_BOUND: f64 = 1.17 * 1.17 * MODULUS as f64;

// ERRORS
// ================================================================================================

/// Reasons for which a candidate pair (f, g) is rejected by the NTRU solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NtruError {
    #[error("the field norms of f and g are not coprime")]
    NoSolution,
    #[error("babai reduction did not converge")]
    ReductionDiverged,
}

// SAMPLING
// ================================================================================================

/// Samples a polynomial of degree `n` whose coefficients follow a discrete Gaussian around 0.
///
/// Each coefficient is the sum of `4096 / n` draws of `sampler_z(0, sigma, sigma - 0.001)`, so the
/// resulting distribution does not depend on the sampler's precision at small degrees.
pub fn gen_poly<R: Rng>(n: usize, rng: &mut R) -> Polynomial<i16> {
    debug_assert!(n.is_power_of_two() && n <= GEN_POLY_SAMPLES);
    let k = GEN_POLY_SAMPLES / n;
    let coefficients = (0..n)
        .map(|_| (0..k).map(|_| sampler_z(0.0, SIGMA_FG, SIGMA_FG - 0.001, rng)).sum())
        .collect();
    Polynomial::new(coefficients)
}

/// Returns the squared Gram-Schmidt norm of the NTRU basis generated by (f, g).
///
/// The value is the maximum of the squared norm of (f, g) and of
/// `q^2 * ||(f* / (f f* + g g*), g* / (f f* + g g*))||^2`.
pub fn gs_norm(f: &Polynomial<i16>, g: &Polynomial<i16>) -> f64 {
    let sq_norm_fg = (f.norm_squared() + g.norm_squared()) as f64;

    let f_fft = Polynomial::<Complex64>::fft_of(f);
    let g_fft = Polynomial::<Complex64>::fft_of(g);
    let ffgg = &f_fft.self_adj_product() + &g_fft.self_adj_product();
    let ft = f_fft.adj_fft().hadamard_div(&ffgg).ifft_real();
    let gt = g_fft.adj_fft().hadamard_div(&ffgg).ifft_real();
    let sq_norm_ftgt = ft.fold(0.0, |acc, c| acc + c * c) + gt.fold(0.0, |acc, c| acc + c * c);
    let q = MODULUS as f64;

    f64::max(sq_norm_fg, q * q * sq_norm_ftgt)
}

// NTRU EQUATION
// ================================================================================================

/// Solves the NTRU equation fG - gF = q mod (x^n + 1) for (F, G).
///
/// The problem is projected onto the field norms of f and g, solved recursively down to
/// degree 1 with the extended Euclidean algorithm, lifted back, and reduced against (f, g) at
/// every level.
///
/// # Errors
/// Returns an error if the norms of f and g at degree 1 are not coprime, or if the Babai
/// reduction fails at some level.
pub fn ntru_solve(
    f: &Polynomial<BigInt>,
    g: &Polynomial<BigInt>,
) -> Result<(Polynomial<BigInt>, Polynomial<BigInt>), NtruError> {
    let q = BigInt::from(MODULUS);
    if f.len() == 1 {
        let (d, u, v) = xgcd(&f.coefficients[0], &g.coefficients[0]);
        if !d.is_one() {
            return Err(NtruError::NoSolution);
        }
        return Ok((Polynomial::new(vec![-(&q * v)]), Polynomial::new(vec![q * u])));
    }

    let (big_fp, big_gp) = ntru_solve(&f.field_norm(), &g.field_norm())?;
    let mut big_f = big_fp.lift().karamul(&g.galois_conjugate());
    let mut big_g = big_gp.lift().karamul(&f.galois_conjugate());
    reduce(f, g, &mut big_f, &mut big_g)?;
    Ok((big_f, big_g))
}

/// Generates a full NTRU basis [f, g, F, G] of degree `n` with fG - gF = q mod (x^n + 1).
///
/// Candidates (f, g) are drawn with [gen_poly] until one of them passes all of the following
/// checks:
///
/// 1. the Gram-Schmidt norm of the basis is at most 1.17^2 * q;
/// 2. f is invertible mod q;
/// 3. the NTRU equation has a solution which the Babai reduction brings to a short (F, G);
/// 4. every coefficient of F and G fits in an `i16`.
pub fn ntru_gen<R: Rng>(n: usize, rng: &mut R) -> [Polynomial<i16>; 4] {
    let mut attempts = 0usize;
    loop {
        attempts += 1;
        let f = gen_poly(n, rng);
        let g = gen_poly(n, rng);

        if gs_norm(&f, &g) > GS_NORM_BOUND {
            continue;
        }
        if !Polynomial::<FalconFelt>::from(&f).is_invertible() {
            continue;
        }

        let solution = ntru_solve(&Polynomial::<BigInt>::from(&f), &Polynomial::from(&g));
        let (big_f, big_g) = match solution {
            Ok(solution) => solution,
            Err(err) => {
                debug!(n, attempts, %err, "rejected NTRU candidate");
                continue;
            },
        };
        if let (Some(big_f), Some(big_g)) = (big_f.to_i16(), big_g.to_i16()) {
            debug!(n, attempts, "generated NTRU basis");
            return [f, g, big_f, big_g];
        }
    }
}

// TESTS
// ================================================================================================
