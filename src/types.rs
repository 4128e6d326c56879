//! Scalar types accepted by the distributed kernels

use ndarray::LinalgScalar;
use num_traits::{Float, NumAssign};
use rand::Rng;
use std::fmt;
use std::iter::Sum;

use crate::lapack::Lapack;

/// Real scalars with local BLAS/LAPACK kernels behind them.
pub trait Scalar:
    Float
    + LinalgScalar
    + NumAssign
    + Lapack
    + Sum
    + fmt::Debug
    + fmt::Display
    + Send
    + Sync
    + 'static
{
    /// A sample from `[0, 1)`, used by the deterministic fills.
    fn rand01<R: Rng>(rng: &mut R) -> Self;
    fn from_usize(n: usize) -> Self;
}

macro_rules! impl_scalar {
    ($real:ty) => {
        impl Scalar for $real {
            fn rand01<R: Rng>(rng: &mut R) -> Self {
                rng.gen::<$real>()
            }
            fn from_usize(n: usize) -> Self {
                n as $real
            }
        }
    };
} // impl_scalar!

impl_scalar!(f64);
impl_scalar!(f32);
