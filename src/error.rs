//! Define Errors

use ndarray::ShapeError;
use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, LinalgError>;

/// Master Error type of this crate
#[derive(Error, Debug)]
pub enum LinalgError {
    /// World size has no integer cube root
    #[error("world size {size} is not a perfect cube")]
    NotCubic { size: usize },

    /// Tunable grid constraints violated (c*c must divide the world, c <= d, c | d)
    #[error("replication factor {c} is invalid for world size {size}")]
    InvalidReplication { size: usize, c: usize },

    /// A global dimension is not divisible by its grid dimension
    #[error("global dimension {dim} is not divisible by grid dimension {grid}")]
    IndivisibleGrid { dim: usize, grid: usize },

    /// Base-case block size does not fit the matrix
    #[error("base-case dimension {bc} is invalid for matrix dimension {dim}")]
    InvalidBlockSize { bc: usize, dim: usize },

    /// Operand shapes disagree at the entry of an operation
    #[error("shape mismatch: {m}x{n} against {m2}x{n2}")]
    ShapeMismatch {
        m: usize,
        n: usize,
        m2: usize,
        n2: usize,
    },

    /// `*potrf` hit a non-positive leading minor
    #[error("matrix is not positive definite: leading minor {minor}")]
    NotPositiveDefinite { minor: i32 },

    /// LAPACK subroutine returned a nonzero code
    #[error("LAPACK: return_code = {return_code}")]
    Lapack { return_code: i32 },

    /// Strides or shape rejected while building an array view
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),
}
