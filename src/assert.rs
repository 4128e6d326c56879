//! Assertions for array comparisons

use ndarray::*;
use num_traits::Float;
use std::iter::Sum;

/// check two values are close in terms of the relative tolerance
pub fn rclose<A: Float>(test: A, truth: A, rtol: A) -> Result<A, A> {
    let dev = (test - truth).abs() / truth.abs();
    if dev < rtol {
        Ok(dev)
    } else {
        Err(dev)
    }
}

/// check two values are close in terms of the absolute tolerance
pub fn aclose<A: Float>(test: A, truth: A, atol: A) -> Result<A, A> {
    let dev = (test - truth).abs();
    if dev < atol {
        Ok(dev)
    } else {
        Err(dev)
    }
}

/// check two arrays are close in maximum norm
pub fn close_max<A, S1, S2, D>(
    test: &ArrayBase<S1, D>,
    truth: &ArrayBase<S2, D>,
    atol: A,
) -> Result<A, A>
where
    A: Float,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    assert_eq!(test.shape(), truth.shape(), "close_max: shapes differ");
    let mut max_dev = A::zero();
    for (t, u) in test.iter().zip(truth.iter()) {
        let dev = (*t - *u).abs();
        if dev > max_dev {
            max_dev = dev;
        }
    }
    if max_dev < atol {
        Ok(max_dev)
    } else {
        Err(max_dev)
    }
}

/// check two arrays are close in L2 norm
pub fn close_l2<A, S1, S2, D>(
    test: &ArrayBase<S1, D>,
    truth: &ArrayBase<S2, D>,
    rtol: A,
) -> Result<A, A>
where
    A: Float + Sum,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
    D: Dimension,
{
    assert_eq!(test.shape(), truth.shape(), "close_l2: shapes differ");
    let dev: A = test
        .iter()
        .zip(truth.iter())
        .map(|(t, u)| (*t - *u) * (*t - *u))
        .sum();
    let nrm: A = truth.iter().map(|u| *u * *u).sum();
    let tol = (dev / nrm).sqrt();
    if tol < rtol {
        Ok(tol)
    } else {
        Err(tol)
    }
}

macro_rules! generate_assert {
    ($assert:ident, $close:path) => {
#[macro_export]
macro_rules! $assert {
    ($test:expr, $truth:expr, $tol:expr) => {
        $close($test, $truth, $tol).unwrap();
    };
    ($test:expr, $truth:expr, $tol:expr; $comment:expr) => {
        $close($test, $truth, $tol).expect($comment);
    };
}
}} // generate_assert!

generate_assert!(assert_rclose, rclose);
generate_assert!(assert_aclose, aclose);
generate_assert!(assert_close_max, close_max);
generate_assert!(assert_close_l2, close_l2);
