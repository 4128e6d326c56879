//! Cholesky-based tall-skinny QR over the tunable grid.
//!
//! One sweep forms the Gram matrix G = A^T*A (row broadcast, local
//! multiply, reduction over the contiguous then alternating column groups,
//! broadcast along depth), factors G with the upper-direction CholInv on
//! the mini-cube, and applies Q = A * R^-1 with one SUMMA triangular
//! multiply of the packed inverse, or the deferred triangular solve when
//! the inverse was skipped. A second sweep on Q1 refines orthogonality and
//! accumulates R = R2 * R1; on ill-conditioned inputs this pulls
//! ||Q^T*Q - I|| down to working precision.

use tracing::debug;

use crate::cholinv::{self, CholInvArgs, Factorization};
use crate::error::{LinalgError, Result};
use crate::lapack::UPLO;
use crate::matrix::{Matrix, Structure};
use crate::summa::{self, Side};
use crate::topo::{Rect, Square};
use crate::trsm;
use crate::types::Scalar;

/// Knobs of one QR factorization; `num_iter = 2` is the refined CACQR2.
#[derive(Debug, Clone, Copy)]
pub struct CacqrArgs {
    pub num_iter: usize,
    pub cholinv: CholInvArgs,
}

/// Factor the tall matrix in `a` into Q (overwriting `a`) and the upper
/// triangular `r`. `a` is distributed over (c, d) of the tunable grid and
/// replicated along depth; `r` over (c, c).
pub fn factor<A: Scalar>(
    a: &mut Matrix<A>,
    r: &mut Matrix<A>,
    args: &CacqrArgs,
    topo: &Rect,
) -> Result<Factorization> {
    let n = a.global_cols();
    if a.grid_rows() != topo.d || a.grid_cols() != topo.c {
        return Err(LinalgError::IndivisibleGrid {
            dim: a.grid_rows(),
            grid: topo.d,
        });
    }
    if r.global_rows() != n
        || r.global_cols() != n
        || r.grid_rows() != topo.c
        || r.grid_cols() != topo.c
    {
        return Err(LinalgError::ShapeMismatch {
            m: r.global_rows(),
            n: r.global_cols(),
            m2: n,
            n2: n,
        });
    }
    debug!(
        m = a.global_rows(),
        n,
        d = topo.d,
        c = topo.c,
        num_iter = args.num_iter,
        "cacqr factor"
    );
    let sq = Square::new(topo.cube.dup())?;
    debug_assert_eq!(sq.d, topo.c);
    let mut fact = cqr(a, r, args, topo, &sq)?;
    for _ in 1..args.num_iter.max(1) {
        let mut r2: Matrix<A> = Matrix::new(n, n, topo.c, topo.c, Structure::Square)?;
        fact = cqr(a, &mut r2, args, topo, &sq)?;
        // R <- R2 * R1
        summa::trmm(&r2, r, Side::Left, A::one(), &sq)?;
    }
    Ok(fact)
}

fn cqr<A: Scalar>(
    a: &mut Matrix<A>,
    r: &mut Matrix<A>,
    args: &CacqrArgs,
    rect: &Rect,
    sq: &Square,
) -> Result<Factorization> {
    gram(a, r, rect)?;
    let n = r.global_rows();
    let mut ri = r.zeros_like();
    let mut ci_args = args.cholinv;
    ci_args.dir = UPLO::Upper;
    let fact = cholinv::factor(r, &mut ri, &ci_args, sq)?;
    // the factor contract leaves Gram leftovers below the diagonal
    r.zero_complement(UPLO::Upper, sq.x, sq.y);
    if fact.complete_inv {
        let mut ri_packed: Matrix<A> = Matrix::new(n, n, sq.d, sq.d, Structure::UpperTri)?;
        ri.serialize_into(&mut ri_packed)?;
        summa::trmm(&ri_packed, a, Side::Right, A::one(), sq)?;
    } else {
        let mut r_packed: Matrix<A> = Matrix::new(n, n, sq.d, sq.d, Structure::UpperTri)?;
        let mut ri_packed: Matrix<A> = Matrix::new(n, n, sq.d, sq.d, Structure::UpperTri)?;
        r.serialize_into(&mut r_packed)?;
        ri.serialize_into(&mut ri_packed)?;
        trsm::solve_upper_right(a, &r_packed, &ri_packed, &fact, sq)?;
    }
    Ok(fact)
}

/// G = A^T*A, replicated so that every rank ends with the panel of its
/// (y mod c, x) position: row roots swap their panel into scratch and
/// broadcast, the local partial product is reduced over the contiguous
/// column group onto the z-th member, summed across the alternating
/// groups, and broadcast along depth from the contiguous rank.
fn gram<A: Scalar>(a: &mut Matrix<A>, r: &mut Matrix<A>, rect: &Rect) -> Result<()> {
    let m_loc = a.local_rows();
    let n_loc = a.local_cols();
    if r.local_rows() != n_loc || r.local_cols() != n_loc {
        return Err(LinalgError::ShapeMismatch {
            m: r.local_rows(),
            n: r.local_cols(),
            m2: n_loc,
            n2: n_loc,
        });
    }
    let is_root_row = rect.x == rect.z;
    let contig_rank = rect.column_contig.rank();
    if is_root_row {
        a.swap_data();
    }
    let mut buf = a.scratch().to_vec();
    rect.row.bcast(rect.z, &mut buf);
    if is_root_row {
        a.swap_data();
    }
    a.scratch_mut().clone_from_slice(&buf);
    summa::local_gemm(
        A::one(),
        a.scratch(),
        (m_loc, n_loc),
        true,
        a.data(),
        (m_loc, n_loc),
        false,
        A::zero(),
        r.data_mut(),
        (n_loc, n_loc),
    )?;
    rect.column_contig.reduce_sum(rect.z, r.data_mut());
    rect.column_alt.allreduce_sum(r.data_mut());
    rect.depth.bcast(contig_rank, r.data_mut());
    Ok(())
}
