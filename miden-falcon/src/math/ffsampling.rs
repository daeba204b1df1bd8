use alloc::boxed::Box;

#[cfg(not(feature = "std"))]
use num::Float;
use num_complex::Complex64;
use rand::Rng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{fft::FastFft, polynomial::Polynomial, samplerz::sampler_z};

/// Computes the Gram matrix G = B B* of a 2x2 matrix B of polynomials in FFT form, stored in
/// row-major order.
pub fn gram(b: &[Polynomial<Complex64>; 4]) -> [Polynomial<Complex64>; 4] {
    const N: usize = 2;
    let n = b[0].len();
    let mut g: [Polynomial<Complex64>; 4] = core::array::from_fn(|_| Polynomial::zero_of_len(n));
    for i in 0..N {
        for j in 0..N {
            for k in 0..N {
                g[N * i + j] += b[N * i + k].hadamard_mul(&b[N * j + k].adj_fft());
            }
        }
    }
    g
}

/// Computes the Gram matrix G = B B* of a 2x2 matrix B of real polynomials in coefficient form,
/// where products are taken mod x^n + 1.
pub fn gram_coefficients(b: &[Polynomial<f64>; 4]) -> [Polynomial<f64>; 4] {
    const N: usize = 2;
    let n = b[0].len();
    let mut g: [Polynomial<f64>; 4] = core::array::from_fn(|_| Polynomial::zero_of_len(n));
    for i in 0..N {
        for j in 0..N {
            for k in 0..N {
                g[N * i + j] += (&b[N * i + k] * &b[N * j + k].adjoint()).reduce_by_cyclotomic(n);
            }
        }
    }
    g
}

/// Computes the LDL decomposition of a self-adjoint 2x2 matrix G in FFT form, such that
///     L D L* = G
/// where D is diagonal and L is lower-triangular with ones on its diagonal.
///
/// Returns the non-trivial elements (l10, d00, d11).
pub fn ldl(
    g: &[Polynomial<Complex64>; 4],
) -> (Polynomial<Complex64>, Polynomial<Complex64>, Polynomial<Complex64>) {
    let l10 = g[2].hadamard_div(&g[0]);
    let d11 = &g[3] - &l10.self_adj_product().hadamard_mul(&g[0]);
    (l10, g[0].clone(), d11)
}

// LDL TREE
// ================================================================================================

/// The Falcon tree: the recursive LDL decomposition of the Gram matrix of a secret basis.
///
/// Each branch carries the `l10` factor of its level in FFT form; the leaves carry the real
/// diagonal values of degree 1, which [normalize_tree] turns into per-coordinate standard
/// deviations.
#[derive(Debug, Clone)]
pub enum LdlTree {
    Branch(Polynomial<Complex64>, Box<LdlTree>, Box<LdlTree>),
    Leaf(f64),
}

impl LdlTree {
    /// Returns the number of leaves of this tree, which equals the ring degree it was built for.
    pub fn num_leaves(&self) -> usize {
        match self {
            LdlTree::Branch(_, left, right) => left.num_leaves() + right.num_leaves(),
            LdlTree::Leaf(_) => 1,
        }
    }
}

impl Zeroize for LdlTree {
    fn zeroize(&mut self) {
        match self {
            LdlTree::Branch(ell, left, right) => {
                ell.zeroize_fft();
                left.zeroize();
                right.zeroize();
            },
            LdlTree::Leaf(value) => value.zeroize(),
        }
    }
}

// Complex64 does not implement Zeroize, so the tree cannot derive ZeroizeOnDrop.
impl Drop for LdlTree {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for LdlTree {}

/// Computes the LDL tree of a 2x2 Gram matrix G given in FFT form. Algorithm 9 of [1, p.37].
///
/// [1]: https://falcon-sign.info/falcon.pdf
pub fn ffldl(gram_matrix: &[Polynomial<Complex64>; 4]) -> LdlTree {
    let n = gram_matrix[0].len();
    let (l10, d00, d11) = ldl(gram_matrix);

    if n > 2 {
        let (d00_left, d00_right) = d00.split_fft();
        let (d11_left, d11_right) = d11.split_fft();
        let g0 = [d00_left.clone(), d00_right.clone(), d00_right.adj_fft(), d00_left];
        let g1 = [d11_left.clone(), d11_right.clone(), d11_right.adj_fft(), d11_left];
        LdlTree::Branch(l10, Box::new(ffldl(&g0)), Box::new(ffldl(&g1)))
    } else {
        LdlTree::Branch(
            l10,
            Box::new(LdlTree::Leaf(d00.coefficients[0].re)),
            Box::new(LdlTree::Leaf(d11.coefficients[0].re)),
        )
    }
}

/// Replaces every leaf value v of the tree by `sigma / sqrt(v)`.
pub fn normalize_tree(tree: &mut LdlTree, sigma: f64) {
    match tree {
        LdlTree::Branch(_ell, left, right) => {
            normalize_tree(left, sigma);
            normalize_tree(right, sigma);
        },
        LdlTree::Leaf(value) => {
            *value = sigma / value.sqrt();
        },
    }
}

/// Samples a short vector z close to the target `t` (in FFT form) using a normalized Falcon
/// tree. Algorithm 11 of [1, p.40].
///
/// The output is returned in FFT form; its inverse transform has integer coefficients.
///
/// [1]: https://falcon-sign.info/falcon.pdf
pub fn ffsampling<R: Rng>(
    t: &(Polynomial<Complex64>, Polynomial<Complex64>),
    tree: &LdlTree,
    sigmin: f64,
    rng: &mut R,
) -> (Polynomial<Complex64>, Polynomial<Complex64>) {
    match tree {
        LdlTree::Branch(ell, left, right) => {
            let bold_t1 = t.1.split_fft();
            let bold_z1 = ffsampling(&bold_t1, right, sigmin, rng);
            let z1 = Polynomial::<Complex64>::merge_fft(&bold_z1.0, &bold_z1.1);

            // t0' = t0 + (t1 - z1) * l
            let t0_prime = &t.0 + &(&t.1 - &z1).hadamard_mul(ell);

            let bold_t0 = t0_prime.split_fft();
            let bold_z0 = ffsampling(&bold_t0, left, sigmin, rng);
            let z0 = Polynomial::<Complex64>::merge_fft(&bold_z0.0, &bold_z0.1);

            (z0, z1)
        },
        LdlTree::Leaf(sigma) => {
            let z0 = sampler_z(t.0.coefficients[0].re, *sigma, sigmin, rng);
            let z1 = sampler_z(t.1.coefficients[0].re, *sigma, sigmin, rng);
            (
                Polynomial::new(vec![Complex64::new(z0 as f64, 0.0)]),
                Polynomial::new(vec![Complex64::new(z1 as f64, 0.0)]),
            )
        },
    }
}

/// Rounds the target `t` (in FFT form) to a nearby lattice point using the Falcon tree, without
/// randomness (Babai's nearest plane in the fast Fourier setting).
///
/// Leaves round the real parts of their targets; the tree may or may not be normalized.
pub fn ffnp(
    t: &(Polynomial<Complex64>, Polynomial<Complex64>),
    tree: &LdlTree,
) -> (Polynomial<Complex64>, Polynomial<Complex64>) {
    match tree {
        LdlTree::Branch(ell, left, right) => {
            let bold_t1 = t.1.split_fft();
            let bold_z1 = ffnp(&bold_t1, right);
            let z1 = Polynomial::<Complex64>::merge_fft(&bold_z1.0, &bold_z1.1);

            let t0_prime = &t.0 + &(&t.1 - &z1).hadamard_mul(ell);

            let bold_t0 = t0_prime.split_fft();
            let bold_z0 = ffnp(&bold_t0, left);
            let z0 = Polynomial::<Complex64>::merge_fft(&bold_z0.0, &bold_z0.1);

            (z0, z1)
        },
        LdlTree::Leaf(_) => (
            Polynomial::new(vec![Complex64::new(t.0.coefficients[0].re.round(), 0.0)]),
            Polynomial::new(vec![Complex64::new(t.1.coefficients[0].re.round(), 0.0)]),
        ),
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use rstest::rstest;

    use super::*;
    use crate::{PublicParameters, math::ntru_gen};

    fn random_fft<R: Rng>(n: usize, rng: &mut R) -> Polynomial<Complex64> {
        Polynomial::new((0..n).map(|_| Complex64::new(rng.random(), rng.random())).collect())
    }

    fn assert_close(a: &Polynomial<Complex64>, b: &Polynomial<Complex64>) {
        for (x, y) in a.coefficients.iter().zip(b.coefficients.iter()) {
            assert!((x - y).norm() < 1e-9, "{x} != {y}");
        }
    }

    /// Returns the secret basis [[g, -f], [G, -F]] of a freshly generated key, in FFT form.
    fn secret_basis(n: usize, seed: u8) -> [Polynomial<Complex64>; 4] {
        let mut rng = ChaCha20Rng::from_seed([seed; 32]);
        let [f, g, big_f, big_g] = ntru_gen(n, &mut rng);
        [
            Polynomial::<Complex64>::fft_of(&g),
            -Polynomial::<Complex64>::fft_of(&f),
            Polynomial::<Complex64>::fft_of(&big_g),
            -Polynomial::<Complex64>::fft_of(&big_f),
        ]
    }

    #[test]
    fn gram_matrix_is_self_adjoint() {
        let mut rng = ChaCha20Rng::from_seed([1; 32]);
        let b: [Polynomial<Complex64>; 4] = core::array::from_fn(|_| random_fft(8, &mut rng));
        let g = gram(&b);
        assert_close(&g[1], &g[2].adj_fft());
        for c in g[0].coefficients.iter().chain(g[3].coefficients.iter()) {
            assert!(c.im.abs() < 1e-12 && c.re >= 0.0);
        }
    }

    #[test]
    fn gram_of_a_degree_2_basis() {
        let real = |c: [f64; 2]| Polynomial::new(c.to_vec());
        let (f, g) = (real([73.0, -4.0]), real([-72.0, 37.0]));
        let (big_f, big_g) = (real([65.0, 49.0]), real([80.0, -11.0]));
        let b = [g, -f, big_g, -big_f];

        let expected = [[11898.0, 0.0], [-1618.0, -1669.0], [-1618.0, 1669.0], [13147.0, 0.0]];
        let g = gram_coefficients(&b);
        for (entry, expected) in g.iter().zip(expected) {
            assert_eq!(entry.coefficients, expected);
        }

        // the FFT of the coefficient form matches the matrix computed in the FFT domain
        let g_fft = gram(&b.each_ref().map(Polynomial::<Complex64>::fft_of));
        for (coefficients, fft) in g.iter().zip(g_fft.iter()) {
            assert_close(&Polynomial::<Complex64>::fft_of(coefficients), fft);
        }
    }

    #[test]
    fn gram_coefficients_matches_gram_fft() {
        let n = 16;
        let mut rng = ChaCha20Rng::from_seed([7; 32]);
        let b: [Polynomial<f64>; 4] = core::array::from_fn(|_| {
            Polynomial::new((0..n).map(|_| rng.random_range(-20..20) as f64).collect())
        });
        let g = gram_coefficients(&b);
        let g_fft = gram(&b.each_ref().map(Polynomial::<Complex64>::fft_of));
        for (coefficients, fft) in g.iter().zip(g_fft.iter()) {
            assert_close(&Polynomial::<Complex64>::fft_of(coefficients), fft);
        }
        assert_eq!(g[1].coefficients, g[2].adjoint().coefficients);
    }

    #[test]
    fn ldl_reconstructs_the_gram_matrix() {
        let mut rng = ChaCha20Rng::from_seed([2; 32]);
        let b: [Polynomial<Complex64>; 4] = core::array::from_fn(|_| random_fft(16, &mut rng));
        let g = gram(&b);
        let (l10, d00, d11) = ldl(&g);

        assert_close(&d00, &g[0]);
        assert_close(&l10.hadamard_mul(&d00), &g[2]);
        let g11 = &l10.self_adj_product().hadamard_mul(&d00) + &d11;
        assert_close(&g11, &g[3]);
    }

    #[rstest]
    #[case(2)]
    #[case(8)]
    #[case(64)]
    fn tree_has_one_leaf_per_coefficient(#[case] n: usize) {
        let tree = ffldl(&gram(&secret_basis(n, n as u8)));
        assert_eq!(tree.num_leaves(), n);
    }

    #[rstest]
    #[case(16)]
    #[case(128)]
    fn normalized_leaves_are_bounded_below_by_sigmin(#[case] n: usize) {
        let params = PublicParameters::for_degree(n).unwrap();
        let mut tree = ffldl(&gram(&secret_basis(n, 3)));
        normalize_tree(&mut tree, params.sigma);

        fn check(tree: &LdlTree, sigmin: f64) {
            match tree {
                LdlTree::Branch(_, left, right) => {
                    check(left, sigmin);
                    check(right, sigmin);
                },
                LdlTree::Leaf(sigma) => {
                    assert!(*sigma >= sigmin * (1.0 - 1e-9), "{sigma} < {sigmin}")
                },
            }
        }
        check(&tree, params.sigmin);
    }

    #[test]
    fn normalize_tree_maps_leaves() {
        let mut tree = LdlTree::Branch(
            Polynomial::new(vec![Complex64::new(0.5, 0.0)]),
            Box::new(LdlTree::Leaf(4.0)),
            Box::new(LdlTree::Leaf(25.0)),
        );
        normalize_tree(&mut tree, 10.0);
        match &tree {
            LdlTree::Branch(_, left, right) => {
                assert!(matches!(**left, LdlTree::Leaf(v) if v == 5.0));
                assert!(matches!(**right, LdlTree::Leaf(v) if v == 2.0));
            },
            LdlTree::Leaf(_) => panic!("the root must remain a branch"),
        }
    }

    #[test]
    fn ffsampling_returns_integer_vectors_near_the_target() {
        let n = 32;
        let params = PublicParameters::for_degree(n).unwrap();
        let mut tree = ffldl(&gram(&secret_basis(n, 4)));
        normalize_tree(&mut tree, params.sigma);

        let mut rng = ChaCha20Rng::from_seed([5; 32]);
        let target: Polynomial<f64> =
            Polynomial::new((0..n).map(|_| rng.random_range(-50.0..50.0)).collect());
        let target_fft = Polynomial::<Complex64>::fft_of(&target);
        let t = (target_fft.clone(), target_fft);
        let (z0, z1) = ffsampling(&t, &tree, params.sigmin, &mut rng);

        for z in [z0.ifft_real(), z1.ifft_real()] {
            for c in z.coefficients {
                assert!((c - c.round()).abs() < 1e-6, "{c} is not an integer");
            }
        }
    }

    #[test]
    fn ffnp_rounds_a_degree_2_target() {
        let c = Complex64::new;
        let conjugate_pair = |z: Complex64| Polynomial::new(vec![z, z.conj()]);
        let t = (
            conjugate_pair(c(0.23273893182875416, 0.012317186192039031)),
            conjugate_pair(c(0.912492076944699, 0.11873057430750977)),
        );
        let tree = LdlTree::Branch(
            conjugate_pair(c(-0.13598924188939318, 0.14027567658429987)),
            Box::new(LdlTree::Leaf(11898.0)),
            Box::new(LdlTree::Leaf(12692.849302403765)),
        );

        let (z0, z1) = ffnp(&t, &tree);
        assert_close(&z0, &Polynomial::new(vec![c(0.0, 0.0); 2]));
        assert_close(&z1, &Polynomial::new(vec![c(1.0, 0.0); 2]));
    }

    #[test]
    fn ffnp_recovers_lattice_points() {
        let n = 64;
        let tree = ffldl(&gram(&secret_basis(n, 8)));

        // a target already on the integer lattice is its own nearest point
        let mut rng = ChaCha20Rng::from_seed([9; 32]);
        let integers: [Polynomial<f64>; 2] = core::array::from_fn(|_| {
            Polynomial::new((0..n).map(|_| rng.random_range(-30..30) as f64).collect())
        });
        let t = (
            Polynomial::<Complex64>::fft_of(&integers[0]),
            Polynomial::<Complex64>::fft_of(&integers[1]),
        );
        let (z0, z1) = ffnp(&t, &tree);
        for (z, expected) in [z0, z1].iter().zip(integers.iter()) {
            for (c, e) in z.ifft_real().coefficients.iter().zip(expected.coefficients.iter()) {
                assert!((c - e).abs() < 1e-6, "{c} != {e}");
            }
        }
    }

    #[test]
    fn zeroize_clears_the_tree() {
        let mut tree = ffldl(&gram(&secret_basis(4, 6)));
        tree.zeroize();
        fn check(tree: &LdlTree) {
            match tree {
                LdlTree::Branch(ell, left, right) => {
                    assert!(ell.coefficients.iter().all(|c| c.re == 0.0 && c.im == 0.0));
                    check(left);
                    check(right);
                },
                LdlTree::Leaf(value) => assert_eq!(*value, 0.0),
            }
        }
        check(&tree);
    }
}
