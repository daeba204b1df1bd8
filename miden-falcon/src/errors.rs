use thiserror::Error;

/// Errors raised by Falcon key construction, ring arithmetic and the signature codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FalconError {
    #[error("degree {0} is not a power of two between 2 and 1024")]
    InvalidDegree(usize),
    #[error("expected polynomials of length {expected}, got {actual}")]
    InvalidPolysLength { expected: usize, actual: usize },
    #[error("division by a polynomial that is not invertible mod q")]
    DivisionByZero,
    #[error("the basis does not satisfy fG - gF = q")]
    InvalidBasis,
    #[error("encoding does not fit in {0} bytes")]
    EncodingTooLong(usize),
    #[error("invalid signature encoding: {0}")]
    InvalidEncoding(&'static str),
}
