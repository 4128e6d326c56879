//! Define traits wrapping the LAPACK routines used by the base-case kernels

use crate::error::*;

/// Upper/Lower specification for several usages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UPLO {
    Upper = b'U',
    Lower = b'L',
}

impl UPLO {
    pub fn t(self) -> Self {
        match self {
            UPLO::Upper => UPLO::Lower,
            UPLO::Lower => UPLO::Upper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Diag {
    Unit = b'U',
    NonUnit = b'N',
}

pub fn into_result<T>(return_code: i32, val: T) -> Result<T> {
    if return_code == 0 {
        Ok(val)
    } else {
        Err(LinalgError::Lapack { return_code })
    }
}

/// Trait for primitive types which implement the LAPACK subroutines of the
/// local base case: `*potrf` (Cholesky) and `*trtri` (triangular inverse).
pub trait Lapack: Sized {
    /// Wrapper of `*potrf` over a dense column-major block.
    ///
    /// **Warning: Only the portion of `a` corresponding to `UPLO` is written.**
    unsafe fn potrf(uplo: UPLO, n: i32, a: &mut [Self], lda: i32) -> Result<()>;
    /// Wrapper of `*trtri`
    unsafe fn trtri(uplo: UPLO, diag: Diag, n: i32, a: &mut [Self], lda: i32) -> Result<()>;
}

macro_rules! impl_lapack {
    ($scalar:ty, $potrf:path, $trtri:path) => {
        impl Lapack for $scalar {
            unsafe fn potrf(uplo: UPLO, n: i32, a: &mut [Self], lda: i32) -> Result<()> {
                let info = $potrf(lapacke::Layout::ColumnMajor, uplo as u8, n, a, lda);
                if info > 0 {
                    return Err(LinalgError::NotPositiveDefinite { minor: info });
                }
                into_result(info, ())
            }

            unsafe fn trtri(uplo: UPLO, diag: Diag, n: i32, a: &mut [Self], lda: i32) -> Result<()> {
                let info = $trtri(lapacke::Layout::ColumnMajor, uplo as u8, diag as u8, n, a, lda);
                into_result(info, ())
            }
        }
    };
} // end macro_rules

impl_lapack!(f64, lapacke::dpotrf, lapacke::dtrtri);
impl_lapack!(f32, lapacke::spotrf, lapacke::strtri);
