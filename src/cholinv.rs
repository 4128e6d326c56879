//! Recursive Cholesky factorization with explicit factor inverse.
//!
//! `factor` descends on the leading diagonal block: factor A11, form
//! L21 = A21 * L11^-T through the transpose-partner exchange and one SUMMA
//! multiply, fold the Schur complement S = A22 - L21*L21^T into a fresh
//! owned panel, recurse on S, and stitch the inverse together with
//! L^-1_21 = -L22^-1 * L21 * L11^-1 when the level is on the inverse path.
//! Levels whose inverse propagation is skipped record their half dimension;
//! the deferred triangular solves replay that split tree later. The base
//! case all-gathers the block over the slice communicator and runs the
//! local `*potrf` / `*trtri` kernels.

use tracing::{debug, trace};

use crate::error::{LinalgError, Result};
use crate::lapack::{Diag, Lapack, UPLO};
use crate::matrix::{Matrix, Structure};
use crate::summa::{self, GemmArgs};
use crate::topo::Square;
use crate::trsm::{self, Plan};
use crate::types::Scalar;

pub(crate) mod tag {
    pub const LOWER_LI11: u64 = 10;
    pub const LOWER_L21: u64 = 11;
    pub const LOWER_DEFER_U: u64 = 12;
    pub const LOWER_DEFER_UI: u64 = 13;
    pub const UPPER_UI11: u64 = 14;
    pub const UPPER_U12: u64 = 15;
    pub const UPPER_DEFER_L: u64 = 16;
    pub const UPPER_DEFER_LI: u64 = 17;
}

/// Knobs of one factorization.
#[derive(Debug, Clone, Copy)]
pub struct CholInvArgs {
    /// Propagate the inverse through the whole descent.
    pub complete_inv: bool,
    /// With `complete_inv` off, the number of top recursion levels that
    /// skip inverse propagation; subtrees below carry complete inverses.
    pub split: usize,
    /// Base-case dimension is `bc_mult * n / d^2`.
    pub bc_mult: usize,
    /// 'L' produces A = L*L^T, 'U' produces A = U^T*U.
    pub dir: UPLO,
}

/// Status of a finished factorization: whether the inverse is complete and
/// the recorded split dimensions the deferred solves replay.
#[derive(Debug, Clone)]
pub struct Factorization {
    pub complete_inv: bool,
    pub base_case_dims: Vec<usize>,
    pub bc_dim: usize,
    pub split: usize,
}

struct State {
    bc: usize,
    split: usize,
    dims: Vec<usize>,
}

/// Factor the SPD matrix held in `a` in place; `ai` receives the factor
/// inverse. Both must be square-structured over the full cubic grid with
/// identical shapes, and `ai` is expected to arrive zeroed.
pub fn factor<A: Scalar>(
    a: &mut Matrix<A>,
    ai: &mut Matrix<A>,
    args: &CholInvArgs,
    topo: &Square,
) -> Result<Factorization> {
    let n = a.global_rows();
    if a.structure() != Structure::Square
        || a.global_cols() != n
        || ai.global_rows() != n
        || ai.global_cols() != n
    {
        return Err(LinalgError::ShapeMismatch {
            m: a.global_rows(),
            n: a.global_cols(),
            m2: ai.global_rows(),
            n2: ai.global_cols(),
        });
    }
    if a.grid_rows() != topo.d || a.grid_cols() != topo.d {
        return Err(LinalgError::IndivisibleGrid {
            dim: a.grid_rows(),
            grid: topo.d,
        });
    }
    let dd = topo.d * topo.d;
    if n % dd != 0 {
        return Err(LinalgError::IndivisibleGrid { dim: n, grid: dd });
    }
    let bc = args.bc_mult * (n / dd);
    if bc == 0 {
        return Err(LinalgError::InvalidBlockSize { bc, dim: n });
    }
    let split = if args.complete_inv { 0 } else { args.split };
    debug!(n, bc, split, d = topo.d, dir = ?args.dir, "cholinv factor");
    let mut st = State {
        bc,
        split,
        dims: Vec::new(),
    };
    rfactor(a, ai, n, 0, true, &mut st, args.dir, topo)?;
    Ok(Factorization {
        complete_inv: st.dims.is_empty(),
        base_case_dims: st.dims,
        bc_dim: bc,
        split,
    })
}

fn rfactor<A: Scalar>(
    a: &mut Matrix<A>,
    ai: &mut Matrix<A>,
    n: usize,
    depth: usize,
    spine: bool,
    st: &mut State,
    dir: UPLO,
    topo: &Square,
) -> Result<()> {
    if n <= st.bc {
        return base_case(a, ai, n, dir, topo);
    }
    let h = n >> 1;
    let inv = depth >= st.split;
    if !inv && spine {
        st.dims.push(h);
    }
    match dir {
        UPLO::Lower => rfactor_lower(a, ai, n, h, depth, spine, inv, st, topo),
        UPLO::Upper => rfactor_upper(a, ai, n, h, depth, spine, inv, st, topo),
    }
}

fn rfactor_lower<A: Scalar>(
    a: &mut Matrix<A>,
    ai: &mut Matrix<A>,
    n: usize,
    h: usize,
    depth: usize,
    spine: bool,
    inv: bool,
    st: &mut State,
    topo: &Square,
) -> Result<()> {
    let (x, y) = (topo.x, topo.y);
    let one = A::one();
    let zero = A::zero();

    let mut a11 = a.carve(0..h, 0..h, x, y);
    let mut ai11 = ai.carve(0..h, 0..h, x, y);
    rfactor(&mut a11, &mut ai11, h, depth + 1, spine, st, UPLO::Lower, topo)?;
    a.write_back(&a11, 0..h, 0..h, x, y);
    ai.write_back(&ai11, 0..h, 0..h, x, y);

    // L21 = A21 * L11^-T
    let a21 = a.carve(h..n, 0..h, x, y);
    let mut l21 = a21.zeros_like();
    if inv {
        let li11t = summa::transpose_swap(&ai11, topo, tag::LOWER_LI11);
        summa::gemm(&a21, &li11t, &mut l21, &GemmArgs { alpha: one, beta: zero }, topo)?;
    } else {
        // only block-diagonal inverses exist below: solve X * L11^T = A21
        let mut l11 = a11.clone();
        l11.zero_complement(UPLO::Lower, x, y);
        let u = summa::transpose_swap(&l11, topo, tag::LOWER_DEFER_U);
        let ui = summa::transpose_swap(&ai11, topo, tag::LOWER_DEFER_UI);
        l21 = a21;
        let plan = Plan {
            bc: st.bc,
            split: st.split,
        };
        trsm::solve_xu(&mut l21, &u, &ui, depth + 1, &plan, topo)?;
    }
    a.write_back(&l21, h..n, 0..h, x, y);

    // S = A22 - L21 * L21^T, built in a fresh owned panel
    let l21t = summa::transpose_swap(&l21, topo, tag::LOWER_L21);
    let mut s = a.carve(h..n, h..n, x, y);
    summa::gemm(&l21, &l21t, &mut s, &GemmArgs { alpha: -one, beta: one }, topo)?;

    let mut ai22 = ai.carve(h..n, h..n, x, y);
    rfactor(&mut s, &mut ai22, n - h, depth + 1, false, st, UPLO::Lower, topo)?;
    a.write_back(&s, h..n, h..n, x, y);
    ai.write_back(&ai22, h..n, h..n, x, y);

    if inv {
        // L^-1_21 = -L22^-1 * (L21 * L11^-1)
        let mut t = l21.zeros_like();
        summa::gemm(&l21, &ai11, &mut t, &GemmArgs { alpha: one, beta: zero }, topo)?;
        let mut ai21 = l21.zeros_like();
        summa::gemm(&ai22, &t, &mut ai21, &GemmArgs { alpha: -one, beta: zero }, topo)?;
        ai.write_back(&ai21, h..n, 0..h, x, y);
    }
    Ok(())
}

fn rfactor_upper<A: Scalar>(
    a: &mut Matrix<A>,
    ai: &mut Matrix<A>,
    n: usize,
    h: usize,
    depth: usize,
    spine: bool,
    inv: bool,
    st: &mut State,
    topo: &Square,
) -> Result<()> {
    let (x, y) = (topo.x, topo.y);
    let one = A::one();
    let zero = A::zero();

    let mut a11 = a.carve(0..h, 0..h, x, y);
    let mut ai11 = ai.carve(0..h, 0..h, x, y);
    rfactor(&mut a11, &mut ai11, h, depth + 1, spine, st, UPLO::Upper, topo)?;
    a.write_back(&a11, 0..h, 0..h, x, y);
    ai.write_back(&ai11, 0..h, 0..h, x, y);

    // U12 = U11^-T * A12
    let a12 = a.carve(0..h, h..n, x, y);
    let mut u12 = a12.zeros_like();
    if inv {
        let ui11t = summa::transpose_swap(&ai11, topo, tag::UPPER_UI11);
        summa::gemm(&ui11t, &a12, &mut u12, &GemmArgs { alpha: one, beta: zero }, topo)?;
    } else {
        // solve (U11^T) * X = A12 with the block-diagonal inverses
        let mut u11 = a11.clone();
        u11.zero_complement(UPLO::Upper, x, y);
        let l = summa::transpose_swap(&u11, topo, tag::UPPER_DEFER_L);
        let li = summa::transpose_swap(&ai11, topo, tag::UPPER_DEFER_LI);
        u12 = a12;
        let plan = Plan {
            bc: st.bc,
            split: st.split,
        };
        trsm::solve_lx(&l, &li, &mut u12, depth + 1, &plan, topo)?;
    }
    a.write_back(&u12, 0..h, h..n, x, y);

    // S = A22 - U12^T * U12
    let u12t = summa::transpose_swap(&u12, topo, tag::UPPER_U12);
    let mut s = a.carve(h..n, h..n, x, y);
    summa::gemm(&u12t, &u12, &mut s, &GemmArgs { alpha: -one, beta: one }, topo)?;

    let mut ai22 = ai.carve(h..n, h..n, x, y);
    rfactor(&mut s, &mut ai22, n - h, depth + 1, false, st, UPLO::Upper, topo)?;
    a.write_back(&s, h..n, h..n, x, y);
    ai.write_back(&ai22, h..n, h..n, x, y);

    if inv {
        // U^-1_12 = -U11^-1 * (U12 * U22^-1)
        let mut t = u12.zeros_like();
        summa::gemm(&u12, &ai22, &mut t, &GemmArgs { alpha: one, beta: zero }, topo)?;
        let mut ai12 = u12.zeros_like();
        summa::gemm(&ai11, &t, &mut ai12, &GemmArgs { alpha: -one, beta: zero }, topo)?;
        ai.write_back(&ai12, 0..h, h..n, x, y);
    }
    Ok(())
}

/// Gather the block on every slice rank, run the local kernels, scatter the
/// factor and its inverse back by block-cyclic offset.
fn base_case<A: Scalar>(
    a: &mut Matrix<A>,
    ai: &mut Matrix<A>,
    n: usize,
    dir: UPLO,
    topo: &Square,
) -> Result<()> {
    if n == 0 {
        return Ok(());
    }
    trace!(n, "cholinv base case");
    let mut block = a.gather(&topo.slice, topo.x, topo.y);
    unsafe {
        A::potrf(dir, n as i32, &mut block, n as i32)?;
    }
    zero_tri_dense(&mut block, n, dir);
    let mut inv = block.clone();
    unsafe {
        A::trtri(dir, Diag::NonUnit, n as i32, &mut inv, n as i32)?;
    }
    a.scatter_from_global(&block, topo.x, topo.y);
    ai.scatter_from_global(&inv, topo.x, topo.y);
    Ok(())
}

fn zero_tri_dense<A: Scalar>(buf: &mut [A], n: usize, keep: UPLO) {
    for j in 0..n {
        for i in 0..n {
            let drop = match keep {
                UPLO::Lower => i < j,
                UPLO::Upper => i > j,
            };
            if drop {
                buf[j * n + i] = A::zero();
            }
        }
    }
}
