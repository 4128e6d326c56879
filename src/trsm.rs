//! Deferred triangular solves over the cubic grid.
//!
//! When a factorization skipped the inverse propagation, only the diagonal
//! blocks of the recorded split tree carry complete inverses. The solvers
//! here replay that tree: per diagonal block, one SUMMA gemm folds the
//! already-solved panels into the right-hand side (alpha = -1, beta = 1)
//! and one SUMMA multiply applies the block inverse.

use tracing::trace;

use crate::cholinv::Factorization;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::summa::{self, GemmArgs};
use crate::topo::Square;
use crate::types::Scalar;

/// Replay rule of a factorization's split tree: a node is a leaf (and its
/// inverse is complete) once its dimension reaches the base case or its
/// depth leaves the skipped levels.
pub(crate) struct Plan {
    pub bc: usize,
    pub split: usize,
}

fn blocks(n: usize, depth: usize, plan: &Plan, out: &mut Vec<usize>) {
    if n <= plan.bc || depth >= plan.split {
        out.push(n);
        return;
    }
    let h = n >> 1;
    blocks(h, depth + 1, plan, out);
    blocks(n - h, depth + 1, plan, out);
}

/// Solve X * U = B in place of `b`, with `u` dense upper-triangular and
/// `ui` holding the block-diagonal inverses of the plan's leaves.
pub(crate) fn solve_xu<A: Scalar>(
    b: &mut Matrix<A>,
    u: &Matrix<A>,
    ui: &Matrix<A>,
    depth: usize,
    plan: &Plan,
    topo: &Square,
) -> Result<()> {
    let n = u.global_rows();
    let m = b.global_rows();
    let one = A::one();
    let zero = A::zero();
    let (x, y) = (topo.x, topo.y);
    let mut bs = Vec::new();
    blocks(n, depth, plan, &mut bs);
    trace!(n, nblocks = bs.len(), "trsm solve X*U=B");
    let mut off = 0;
    for nk in bs {
        let ck = off..off + nk;
        let mut bk = b.carve(0..m, ck.clone(), x, y);
        if off > 0 {
            let xs = b.carve(0..m, 0..off, x, y);
            let uk = u.carve(0..off, ck.clone(), x, y);
            summa::gemm(&xs, &uk, &mut bk, &GemmArgs { alpha: -one, beta: one }, topo)?;
        }
        let uik = ui.carve(ck.clone(), ck.clone(), x, y);
        let mut xk = bk.zeros_like();
        summa::gemm(&bk, &uik, &mut xk, &GemmArgs { alpha: one, beta: zero }, topo)?;
        b.write_back(&xk, 0..m, ck, x, y);
        off += nk;
    }
    Ok(())
}

/// Solve L * X = B in place of `b`, with `l` dense lower-triangular and
/// `li` holding the block-diagonal inverses of the plan's leaves.
pub(crate) fn solve_lx<A: Scalar>(
    l: &Matrix<A>,
    li: &Matrix<A>,
    b: &mut Matrix<A>,
    depth: usize,
    plan: &Plan,
    topo: &Square,
) -> Result<()> {
    let n = l.global_rows();
    let ncols = b.global_cols();
    let one = A::one();
    let zero = A::zero();
    let (x, y) = (topo.x, topo.y);
    let mut bs = Vec::new();
    blocks(n, depth, plan, &mut bs);
    trace!(n, nblocks = bs.len(), "trsm solve L*X=B");
    let mut off = 0;
    for nk in bs {
        let rk = off..off + nk;
        let mut bk = b.carve(rk.clone(), 0..ncols, x, y);
        if off > 0 {
            let lk = l.carve(rk.clone(), 0..off, x, y);
            let xs = b.carve(0..off, 0..ncols, x, y);
            summa::gemm(&lk, &xs, &mut bk, &GemmArgs { alpha: -one, beta: one }, topo)?;
        }
        let lik = li.carve(rk.clone(), rk.clone(), x, y);
        let mut xk = bk.zeros_like();
        summa::gemm(&lik, &bk, &mut xk, &GemmArgs { alpha: one, beta: zero }, topo)?;
        b.write_back(&xk, rk, 0..ncols, x, y);
        off += nk;
    }
    Ok(())
}

/// Solve L * X = B for a factor produced without a complete inverse.
/// `l`/`li` arrive packed lower-triangular (serialized from the factor
/// panels); the solver expands them once and replays the recorded tree.
pub fn solve_lower_left<A: Scalar>(
    l: &Matrix<A>,
    li: &Matrix<A>,
    b: &mut Matrix<A>,
    fact: &Factorization,
    topo: &Square,
) -> Result<()> {
    let ld = expand(l);
    let lid = expand(li);
    let plan = Plan {
        bc: fact.bc_dim,
        split: fact.split,
    };
    solve_lx(&ld, &lid, b, 0, &plan, topo)
}

/// Solve X * R = B (i.e. X = B * R^-1) for an upper factor produced
/// without a complete inverse.
pub fn solve_upper_right<A: Scalar>(
    b: &mut Matrix<A>,
    r: &Matrix<A>,
    ri: &Matrix<A>,
    fact: &Factorization,
    topo: &Square,
) -> Result<()> {
    let rd = expand(r);
    let rid = expand(ri);
    let plan = Plan {
        bc: fact.bc_dim,
        split: fact.split,
    };
    solve_xu(b, &rd, &rid, 0, &plan, topo)
}

fn expand<A: Scalar>(m: &Matrix<A>) -> Matrix<A> {
    if m.structure().is_triangular() {
        m.unpacked()
    } else {
        m.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_replay_matches_recursion() {
        // dims 18 with bc 2 and all levels skipped: 18 -> 9 -> 4 -> 2
        let plan = Plan { bc: 2, split: 64 };
        let mut out = Vec::new();
        blocks(18, 0, &plan, &mut out);
        assert_eq!(out.iter().sum::<usize>(), 18);
        assert!(out.iter().all(|&n| n <= 2));
        // two skipped levels on top of complete subtrees
        let plan = Plan { bc: 1, split: 2 };
        let mut out = Vec::new();
        blocks(16, 0, &plan, &mut out);
        assert_eq!(out, vec![4, 4, 4, 4]);
    }
}
