//! Per-degree Falcon parameter sets.

use crate::errors::FalconError;

// CONSTANTS
// ================================================================================================

/// Smallest supported ring degree.
pub const MIN_N: usize = 2;

/// Largest supported ring degree.
pub const MAX_N: usize = 1 << LOG_MAX_N;

/// Base-2 logarithm of [MAX_N].
pub const LOG_MAX_N: usize = 10;

// PUBLIC PARAMETERS
// ================================================================================================

/// Falcon parameters for a single ring degree.
///
/// - `sigma` is the standard deviation of signatures (Gaussians over the lattice);
/// - `sigmin` is a lower bound on the standard deviation of each Gaussian over Z;
/// - `sigbound` is the upper bound on ||s0||^2 + ||s1||^2;
/// - `sigbytelen` is the length of a signature in bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PublicParameters {
    pub n: usize,
    pub sigma: f64,
    pub sigmin: f64,
    pub sigbound: u64,
    pub sigbytelen: usize,
}

const PARAMS: [PublicParameters; LOG_MAX_N] = [
    PublicParameters {
        n: 2,
        sigma: 144.81253976308423,
        sigmin: 1.1165085072329104,
        sigbound: 101498,
        sigbytelen: 44,
    },
    PublicParameters {
        n: 4,
        sigma: 146.83798833523608,
        sigmin: 1.1321247692325274,
        sigbound: 208714,
        sigbytelen: 47,
    },
    PublicParameters {
        n: 8,
        sigma: 148.83587593064718,
        sigmin: 1.147528535373367,
        sigbound: 428865,
        sigbytelen: 52,
    },
    PublicParameters {
        n: 16,
        sigma: 151.78340713845503,
        sigmin: 1.170254078853483,
        sigbound: 892039,
        sigbytelen: 63,
    },
    PublicParameters {
        n: 32,
        sigma: 154.6747794602761,
        sigmin: 1.1925466358390344,
        sigbound: 1852696,
        sigbytelen: 82,
    },
    PublicParameters {
        n: 64,
        sigma: 157.51308555044122,
        sigmin: 1.2144300507766141,
        sigbound: 3842630,
        sigbytelen: 122,
    },
    PublicParameters {
        n: 128,
        sigma: 160.30114421975344,
        sigmin: 1.235926056771981,
        sigbound: 7959734,
        sigbytelen: 200,
    },
    PublicParameters {
        n: 256,
        sigma: 163.04153322607107,
        sigmin: 1.2570545284063217,
        sigbound: 16468416,
        sigbytelen: 356,
    },
    PublicParameters {
        n: 512,
        sigma: 165.7366171829776,
        sigmin: 1.2778336969128337,
        sigbound: 34034726,
        sigbytelen: 666,
    },
    PublicParameters {
        n: 1024,
        sigma: 168.38857144654395,
        sigmin: 1.298280334344292,
        sigbound: 70265242,
        sigbytelen: 1280,
    },
];

impl PublicParameters {
    /// Returns the parameter set for ring degree `n`.
    ///
    /// # Errors
    /// Returns an error if `n` is not a power of two in [MIN_N, MAX_N].
    pub fn for_degree(n: usize) -> Result<&'static Self, FalconError> {
        if !(MIN_N..=MAX_N).contains(&n) || !n.is_power_of_two() {
            return Err(FalconError::InvalidDegree(n));
        }
        Ok(&PARAMS[n.trailing_zeros() as usize - 1])
    }

    /// Returns the parameter set for ring degree `2^log_n`.
    pub fn for_log_degree(log_n: u8) -> Result<&'static Self, FalconError> {
        if !(1..=LOG_MAX_N as u8).contains(&log_n) {
            return Err(FalconError::InvalidDegree(1usize.checked_shl(log_n as u32).unwrap_or(0)));
        }
        Ok(&PARAMS[log_n as usize - 1])
    }

    /// Returns log2 of the ring degree.
    pub fn log_n(&self) -> u8 {
        self.n.trailing_zeros() as u8
    }

    /// Returns the length in bytes of the compressed `s1` part of a signature.
    pub fn compressed_len(&self) -> usize {
        self.sigbytelen - crate::HEADER_LEN - crate::SALT_LEN
    }
}

// TESTS
// ================================================================================================
