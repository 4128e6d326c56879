//! SUMMA engine: broadcast-broadcast-multiply-reduce over a cubic grid.
//!
//! One multiply follows the standard choreography: the row roots (x == z)
//! broadcast their A panel along the row communicator, the column roots
//! (y == z) broadcast their B panel along the column communicator, every
//! rank runs the local dense kernel on the received fragments, and an
//! all-reduce along the depth communicator sums the partial products so
//! that every z-layer ends with the same C.
//!
//! Packed triangular operands are broadcast at packed size; receivers
//! expand them, treating the zero triangle as zeros for the dense kernel.
//! Transposed operands are materialized beforehand with the
//! transpose-partner exchange, so the kernel always runs NoTrans.

use ndarray::linalg::general_mat_mul;
use ndarray::{ArrayView2, ArrayViewMut2, ShapeBuilder};
use std::ops::Range;
use tracing::trace;

use crate::comm::Communicator;
use crate::error::{LinalgError, Result};
use crate::matrix::{Matrix, PanelMsg};
use crate::topo::Square;
use crate::types::Scalar;

/// Scaling pair of one gemm: C <- alpha*A*B + beta*C.
#[derive(Debug, Clone, Copy)]
pub struct GemmArgs<A> {
    pub alpha: A,
    pub beta: A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Global index ranges selecting a logical sub-block of an operand.
#[derive(Debug, Clone)]
pub struct Cut {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Cut {
    pub fn new(rows: Range<usize>, cols: Range<usize>) -> Cut {
        Cut { rows, cols }
    }
}

/// Local dense kernel over column-major buffers.
pub(crate) fn local_gemm<A: Scalar>(
    alpha: A,
    a: &[A],
    adim: (usize, usize),
    ta: bool,
    b: &[A],
    bdim: (usize, usize),
    tb: bool,
    beta: A,
    c: &mut [A],
    cdim: (usize, usize),
) -> Result<()> {
    let av = ArrayView2::from_shape(adim.f(), a)?;
    let av = if ta { av.reversed_axes() } else { av };
    let bv = ArrayView2::from_shape(bdim.f(), b)?;
    let bv = if tb { bv.reversed_axes() } else { bv };
    let mut cv = ArrayViewMut2::from_shape(cdim.f(), c)?;
    if av.ncols() != bv.nrows() || cv.nrows() != av.nrows() || cv.ncols() != bv.ncols() {
        return Err(LinalgError::ShapeMismatch {
            m: av.nrows(),
            n: av.ncols(),
            m2: bv.nrows(),
            n2: bv.ncols(),
        });
    }
    general_mat_mul(alpha, &av, &bv, beta, &mut cv);
    Ok(())
}

/// Broadcast a panel from the z-root of `comm`, packed payloads staying at
/// packed size.
fn bcast_panel<A: Scalar>(
    mat: &Matrix<A>,
    comm: &Communicator,
    root: usize,
    is_root: bool,
) -> PanelMsg<A> {
    let msg = if is_root { Some(mat.panel_msg()) } else { None };
    comm.bcast_obj(root, msg)
}

fn check_k_grid<A: Scalar>(a: &Matrix<A>, b: &Matrix<A>, topo: &Square) -> Result<()> {
    if a.grid_cols() != topo.d || b.grid_rows() != topo.d {
        return Err(LinalgError::IndivisibleGrid {
            dim: a.grid_cols(),
            grid: topo.d,
        });
    }
    Ok(())
}

/// C <- alpha*A*B + beta*C, every z-layer ending with the reduced result.
pub fn gemm<A: Scalar>(
    a: &Matrix<A>,
    b: &Matrix<A>,
    c: &mut Matrix<A>,
    args: &GemmArgs<A>,
    topo: &Square,
) -> Result<()> {
    if a.global_cols() != b.global_rows()
        || a.global_rows() != c.global_rows()
        || b.global_cols() != c.global_cols()
    {
        return Err(LinalgError::ShapeMismatch {
            m: a.global_rows(),
            n: a.global_cols(),
            m2: b.global_rows(),
            n2: b.global_cols(),
        });
    }
    check_k_grid(a, b, topo)?;
    trace!(
        m = a.global_rows(),
        k = a.global_cols(),
        n = b.global_cols(),
        "summa gemm"
    );
    let pa = bcast_panel(a, &topo.row, topo.z, topo.x == topo.z);
    let pb = bcast_panel(b, &topo.column, topo.z, topo.y == topo.z);
    let (m, k) = (pa.rows, pa.cols);
    let n = pb.cols;
    if pb.rows != k || c.local_rows() != m || c.local_cols() != n {
        return Err(LinalgError::ShapeMismatch {
            m,
            n: k,
            m2: pb.rows,
            n2: pb.cols,
        });
    }
    let ea = pa.into_dense();
    let eb = pb.into_dense();
    if args.beta == A::zero() {
        local_gemm(args.alpha, &ea, (m, k), false, &eb, (k, n), false, A::zero(), c.data_mut(), (m, n))?;
        topo.depth.allreduce_sum(c.data_mut());
    } else {
        // beta folded into the depth reduction would be applied d times, so
        // the kernel writes a separate hold buffer.
        let mut hold = vec![A::zero(); m * n];
        local_gemm(args.alpha, &ea, (m, k), false, &eb, (k, n), false, A::zero(), &mut hold, (m, n))?;
        topo.depth.allreduce_sum(&mut hold);
        for (dst, src) in c.data_mut().iter_mut().zip(hold.iter()) {
            *dst = args.beta * *dst + *src;
        }
    }
    Ok(())
}

/// Triangular multiply: B <- alpha*A*B (Left) or alpha*B*A (Right), with A
/// of square or packed triangular structure. The result overwrites B on
/// every layer.
pub fn trmm<A: Scalar>(
    a: &Matrix<A>,
    b: &mut Matrix<A>,
    side: Side,
    alpha: A,
    topo: &Square,
) -> Result<()> {
    if a.global_rows() != a.global_cols() {
        return Err(LinalgError::ShapeMismatch {
            m: a.global_rows(),
            n: a.global_cols(),
            m2: a.global_rows(),
            n2: a.global_rows(),
        });
    }
    let k_ok = match side {
        Side::Left => a.global_cols() == b.global_rows(),
        Side::Right => b.global_cols() == a.global_rows(),
    };
    if !k_ok {
        return Err(LinalgError::ShapeMismatch {
            m: b.global_rows(),
            n: b.global_cols(),
            m2: a.global_rows(),
            n2: a.global_cols(),
        });
    }
    trace!(n = a.global_rows(), ?side, "summa trmm");
    let (m, n, hold) = match side {
        Side::Left => {
            check_k_grid(a, b, topo)?;
            let pa = bcast_panel(a, &topo.row, topo.z, topo.x == topo.z);
            let pb = bcast_panel(b, &topo.column, topo.z, topo.y == topo.z);
            let (m, k) = (pa.rows, pa.cols);
            let n = pb.cols;
            let ea = pa.into_dense();
            let eb = pb.into_dense();
            let mut hold = vec![A::zero(); m * n];
            local_gemm(alpha, &ea, (m, k), false, &eb, (k, n), false, A::zero(), &mut hold, (m, n))?;
            (m, n, hold)
        }
        Side::Right => {
            check_k_grid(b, a, topo)?;
            let pb = bcast_panel(b, &topo.row, topo.z, topo.x == topo.z);
            let pa = bcast_panel(a, &topo.column, topo.z, topo.y == topo.z);
            let (m, k) = (pb.rows, pb.cols);
            let n = pa.cols;
            let eb = pb.into_dense();
            let ea = pa.into_dense();
            let mut hold = vec![A::zero(); m * n];
            local_gemm(alpha, &eb, (m, k), false, &ea, (k, n), false, A::zero(), &mut hold, (m, n))?;
            (m, n, hold)
        }
    };
    let mut hold = hold;
    topo.depth.allreduce_sum(&mut hold);
    if b.local_rows() != m || b.local_cols() != n {
        return Err(LinalgError::ShapeMismatch {
            m,
            n,
            m2: b.local_rows(),
            n2: b.local_cols(),
        });
    }
    b.data_mut().clone_from_slice(&hold);
    Ok(())
}

/// Cut variant: the serializer carves the sub-operands before the multiply
/// and writes the C sub-block back afterwards when `write_c` is requested.
pub fn gemm_cut<A: Scalar>(
    a: &Matrix<A>,
    ca: &Cut,
    b: &Matrix<A>,
    cb: &Cut,
    c: &mut Matrix<A>,
    cc: &Cut,
    write_c: bool,
    args: &GemmArgs<A>,
    topo: &Square,
) -> Result<()> {
    let sub_a = a.carve(ca.rows.clone(), ca.cols.clone(), topo.x, topo.y);
    let sub_b = b.carve(cb.rows.clone(), cb.cols.clone(), topo.x, topo.y);
    let mut sub_c = c.carve(cc.rows.clone(), cc.cols.clone(), topo.x, topo.y);
    gemm(&sub_a, &sub_b, &mut sub_c, args, topo)?;
    if write_c {
        c.write_back(&sub_c, cc.rows.clone(), cc.cols.clone(), topo.x, topo.y);
    }
    Ok(())
}

/// Exchange panels with the transpose partner (y, x, z) and return the
/// distributed transpose. On the grid diagonal no communication happens.
pub fn transpose_swap<A: Scalar>(mat: &Matrix<A>, topo: &Square, tag: u64) -> Matrix<A> {
    debug_assert!(!mat.structure().is_triangular());
    debug_assert_eq!(mat.grid_rows(), mat.grid_cols());
    let partner = topo.transpose_partner();
    let recv = if partner == topo.world.rank() {
        mat.panel_msg()
    } else {
        topo.world.sendrecv(partner, tag, &mat.panel_msg())
    };
    let (r, c) = (recv.rows, recv.cols);
    let mut data = vec![A::zero(); r * c];
    for j in 0..c {
        for i in 0..r {
            data[i * c + j] = recv.data[j * r + i];
        }
    }
    Matrix::from_parts(
        mat.structure(),
        mat.global_cols(),
        mat.global_rows(),
        mat.grid_cols(),
        mat.grid_rows(),
        c,
        r,
        mat.col_shift(),
        mat.row_shift(),
        data,
    )
}
