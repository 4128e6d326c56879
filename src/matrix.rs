//! Block-cyclic distributed matrix container.
//!
//! Each rank owns one column-major panel of a global matrix distributed
//! 2D-cyclically over a slice of the process grid: element (i, j) lives on
//! grid location (i mod p_y, j mod p_x) at local offset (i / p_y, j / p_x).
//! A matrix owns three buffers: the data panel, a scratch buffer of the
//! same capacity used as the receive side of broadcast choreography, and a
//! pad buffer holding the dense square image of a packed triangular panel.
//!
//! Sub-blocks are carved out by *global* index ranges; a carved matrix
//! remembers the cyclic residue shifts of its origin so that nested carves
//! and SUMMA calls keep residue classes aligned even when a split is
//! uneven. Ranks may own zero rows or columns of a small block.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::Range;

use crate::comm::Communicator;
use crate::error::{LinalgError, Result};
use crate::types::Scalar;

/// Storage structure of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Rect,
    Square,
    UpperTri,
    LowerTri,
}

impl Structure {
    pub fn is_triangular(self) -> bool {
        match self {
            Structure::UpperTri | Structure::LowerTri => true,
            _ => false,
        }
    }
}

/// First index i >= 0 with (i + shift) % grid == coord.
pub(crate) fn first_owned(grid: usize, shift: usize, coord: usize) -> usize {
    (coord + grid - shift % grid) % grid
}

/// Number of indices i in [0, len) with (i + shift) % grid == coord.
pub(crate) fn owned_count(len: usize, grid: usize, shift: usize, coord: usize) -> usize {
    let first = first_owned(grid, shift, coord);
    if len > first {
        (len - first + grid - 1) / grid
    } else {
        0
    }
}

/// Panel payload of one broadcast or paired exchange.
#[derive(Debug, Clone)]
pub(crate) struct PanelMsg<A> {
    pub rows: usize,
    pub cols: usize,
    pub structure: Structure,
    pub data: Vec<A>,
}

impl<A: Scalar> PanelMsg<A> {
    pub fn empty() -> Self {
        PanelMsg {
            rows: 0,
            cols: 0,
            structure: Structure::Rect,
            data: Vec::new(),
        }
    }

    /// Dense column-major image; a packed triangle is expanded with an
    /// explicit zero complement.
    pub fn into_dense(self) -> Vec<A> {
        match self.structure {
            Structure::Rect | Structure::Square => self.data,
            _ => unpack_panel(self.structure, self.rows, self.cols, &self.data),
        }
    }
}

#[derive(Debug, Clone)]
struct GatherMsg<A> {
    x: usize,
    y: usize,
    rows: usize,
    cols: usize,
    row_shift: usize,
    col_shift: usize,
    data: Vec<A>,
}

/// Expand a packed triangular panel into a dense column-major buffer.
pub(crate) fn unpack_panel<A: Scalar>(
    structure: Structure,
    rows: usize,
    cols: usize,
    packed: &[A],
) -> Vec<A> {
    let mut dense = vec![A::zero(); rows * cols];
    let mut idx = 0;
    match structure {
        Structure::Rect | Structure::Square => dense.copy_from_slice(packed),
        Structure::LowerTri => {
            for j in 0..cols {
                for i in j..rows {
                    dense[j * rows + i] = packed[idx];
                    idx += 1;
                }
            }
        }
        Structure::UpperTri => {
            for j in 0..cols {
                for i in 0..=j {
                    dense[j * rows + i] = packed[idx];
                    idx += 1;
                }
            }
        }
    }
    dense
}

/// A rank's panel of a distributed matrix.
#[derive(Debug, Clone)]
pub struct Matrix<A> {
    structure: Structure,
    global_rows: usize,
    global_cols: usize,
    grid_rows: usize,
    grid_cols: usize,
    local_rows: usize,
    local_cols: usize,
    row_shift: usize,
    col_shift: usize,
    data: Vec<A>,
    scratch: Vec<A>,
    pad: Vec<A>,
}

impl<A: Scalar> Matrix<A> {
    /// Allocate the panel of a `global_rows x global_cols` matrix over a
    /// `grid_rows x grid_cols` slice grid. Dimensions must divide exactly.
    pub fn new(
        global_rows: usize,
        global_cols: usize,
        grid_rows: usize,
        grid_cols: usize,
        structure: Structure,
    ) -> Result<Matrix<A>> {
        if grid_rows == 0 || global_rows % grid_rows != 0 {
            return Err(LinalgError::IndivisibleGrid {
                dim: global_rows,
                grid: grid_rows,
            });
        }
        if grid_cols == 0 || global_cols % grid_cols != 0 {
            return Err(LinalgError::IndivisibleGrid {
                dim: global_cols,
                grid: grid_cols,
            });
        }
        let local_rows = global_rows / grid_rows;
        let local_cols = global_cols / grid_cols;
        if structure != Structure::Rect
            && (global_rows != global_cols || local_rows != local_cols)
        {
            return Err(LinalgError::ShapeMismatch {
                m: global_rows,
                n: global_cols,
                m2: local_rows,
                n2: local_cols,
            });
        }
        let elems = match structure {
            Structure::Rect | Structure::Square => local_rows * local_cols,
            _ => local_rows * (local_rows + 1) / 2,
        };
        let pad = if structure.is_triangular() {
            vec![A::zero(); local_rows * local_cols]
        } else {
            Vec::new()
        };
        Ok(Matrix {
            structure,
            global_rows,
            global_cols,
            grid_rows,
            grid_cols,
            local_rows,
            local_cols,
            row_shift: 0,
            col_shift: 0,
            data: vec![A::zero(); elems],
            scratch: vec![A::zero(); elems],
            pad,
        })
    }

    pub(crate) fn from_parts(
        structure: Structure,
        global_rows: usize,
        global_cols: usize,
        grid_rows: usize,
        grid_cols: usize,
        local_rows: usize,
        local_cols: usize,
        row_shift: usize,
        col_shift: usize,
        data: Vec<A>,
    ) -> Matrix<A> {
        debug_assert!(!structure.is_triangular());
        debug_assert_eq!(data.len(), local_rows * local_cols);
        let scratch = vec![A::zero(); data.len()];
        Matrix {
            structure,
            global_rows,
            global_cols,
            grid_rows,
            grid_cols,
            local_rows,
            local_cols,
            row_shift,
            col_shift,
            data,
            scratch,
            pad: Vec::new(),
        }
    }

    pub fn structure(&self) -> Structure {
        self.structure
    }
    pub fn global_rows(&self) -> usize {
        self.global_rows
    }
    pub fn global_cols(&self) -> usize {
        self.global_cols
    }
    pub fn grid_rows(&self) -> usize {
        self.grid_rows
    }
    pub fn grid_cols(&self) -> usize {
        self.grid_cols
    }
    pub fn local_rows(&self) -> usize {
        self.local_rows
    }
    pub fn local_cols(&self) -> usize {
        self.local_cols
    }
    pub fn num_elems(&self) -> usize {
        self.data.len()
    }
    pub(crate) fn row_shift(&self) -> usize {
        self.row_shift
    }
    pub(crate) fn col_shift(&self) -> usize {
        self.col_shift
    }

    pub fn data(&self) -> &[A] {
        &self.data
    }
    pub fn data_mut(&mut self) -> &mut [A] {
        &mut self.data
    }
    pub fn scratch(&self) -> &[A] {
        &self.scratch
    }
    pub fn scratch_mut(&mut self) -> &mut [A] {
        &mut self.scratch
    }
    pub fn pad(&self) -> &[A] {
        &self.pad
    }

    /// Swap the data and scratch buffers.
    pub fn swap_data(&mut self) {
        std::mem::swap(&mut self.data, &mut self.scratch);
    }

    /// Swap the scratch and pad buffers.
    pub fn swap_pad(&mut self) {
        std::mem::swap(&mut self.scratch, &mut self.pad);
    }

    /// Local storage offset of panel entry (i, j).
    pub fn offset(&self, i: usize, j: usize) -> usize {
        match self.structure {
            Structure::Rect | Structure::Square => j * self.local_rows + i,
            Structure::LowerTri => {
                debug_assert!(i >= j);
                j * self.local_rows - j * j.saturating_sub(1) / 2 + (i - j)
            }
            Structure::UpperTri => {
                debug_assert!(i <= j);
                j * (j + 1) / 2 + i
            }
        }
    }

    /// Dense column-major image of the panel (the pad mirror for packed
    /// triangles).
    pub fn dense_view(&self) -> &[A] {
        match self.structure {
            Structure::Rect | Structure::Square => &self.data,
            _ => {
                debug_assert_eq!(self.pad.len(), self.local_rows * self.local_cols);
                &self.pad
            }
        }
    }

    /// A matrix of the same shape and placement with a zeroed panel.
    pub fn zeros_like(&self) -> Matrix<A> {
        let mut out = self.clone();
        for v in out.data.iter_mut() {
            *v = A::zero();
        }
        for v in out.pad.iter_mut() {
            *v = A::zero();
        }
        out
    }

    pub(crate) fn panel_msg(&self) -> PanelMsg<A> {
        PanelMsg {
            rows: self.local_rows,
            cols: self.local_cols,
            structure: self.structure,
            data: self.data.clone(),
        }
    }

    fn fill<F>(&mut self, x: usize, y: usize, mut value: F)
    where
        F: FnMut(usize, usize) -> A,
    {
        debug_assert_eq!(self.row_shift, 0);
        debug_assert_eq!(self.col_shift, 0);
        let x = x % self.grid_cols;
        let y = y % self.grid_rows;
        let m = self.local_rows;
        let n = self.local_cols;
        let mut idx = 0;
        for jl in 0..n {
            let gj = x + jl * self.grid_cols;
            let (lo, hi) = match self.structure {
                Structure::Rect | Structure::Square => (0, m),
                Structure::LowerTri => (jl, m),
                Structure::UpperTri => (0, jl + 1),
            };
            for il in lo..hi {
                let gi = y + il * self.grid_rows;
                let v = value(gi, gj);
                match self.structure {
                    Structure::Rect | Structure::Square => self.data[jl * m + il] = v,
                    _ => {
                        self.data[idx] = v;
                        idx += 1;
                        self.pad[jl * m + il] = v;
                    }
                }
            }
        }
    }

    /// Seeded symmetric fill: both triangles agree because the element seed
    /// is keyed by min(i,j)*M + max(i,j). With `diagonally_dominant` the
    /// diagonal gains +M, which makes the matrix SPD.
    pub fn distribute_symmetric(&mut self, x: usize, y: usize, key: u64, diagonally_dominant: bool) {
        let m = self.global_rows as u64;
        let structure = self.structure;
        self.fill(x, y, |gi, gj| {
            let keep = match structure {
                Structure::LowerTri => gi >= gj,
                Structure::UpperTri => gi <= gj,
                _ => true,
            };
            if !keep {
                return A::zero();
            }
            let (lo, hi) = if gi <= gj { (gi, gj) } else { (gj, gi) };
            let seed = lo as u64 * m + hi as u64 + key;
            let mut rng = StdRng::seed_from_u64(seed);
            let mut v = A::rand01(&mut rng);
            if diagonally_dominant && gi == gj {
                v = v + A::from_usize(m as usize);
            }
            v
        });
    }

    /// Seeded unsymmetric fill with the same cross-rank determinism
    /// contract: any rank owning (i, j) produces the identical value.
    pub fn distribute_random(&mut self, x: usize, y: usize, key: u64) {
        let n = self.global_cols as u64;
        self.fill(x, y, |gi, gj| {
            let seed = gi as u64 * n + gj as u64 + key;
            let mut rng = StdRng::seed_from_u64(seed);
            A::rand01(&mut rng)
        });
    }

    /// `val` on the diagonal, zero elsewhere.
    pub fn distribute_identity(&mut self, x: usize, y: usize, val: A) {
        self.fill(x, y, |gi, gj| if gi == gj { val } else { A::zero() });
    }

    /// Repack the panel into `dst`'s structure. Square <-> packed triangle
    /// conversions pack or unpack the local triangle; unpacking zeroes the
    /// complement, so a round trip through a triangle is idempotent on the
    /// stored triangle and clears the rest.
    pub fn serialize_into(&self, dst: &mut Matrix<A>) -> Result<()> {
        if self.local_rows != dst.local_rows || self.local_cols != dst.local_cols {
            return Err(LinalgError::ShapeMismatch {
                m: self.local_rows,
                n: self.local_cols,
                m2: dst.local_rows,
                n2: dst.local_cols,
            });
        }
        let m = self.local_rows;
        match (self.structure, dst.structure) {
            (a, b) if a == b => {
                dst.data.clone_from_slice(&self.data);
                if a.is_triangular() {
                    dst.pad.clone_from_slice(&self.pad);
                }
            }
            (Structure::Rect, Structure::Square) | (Structure::Square, Structure::Rect) => {
                dst.data.clone_from_slice(&self.data)
            }
            (Structure::Rect, t) | (Structure::Square, t) if t.is_triangular() => {
                let mut idx = 0;
                for v in dst.pad.iter_mut() {
                    *v = A::zero();
                }
                for jl in 0..self.local_cols {
                    let (lo, hi) = match t {
                        Structure::LowerTri => (jl, m),
                        _ => (0, jl + 1),
                    };
                    for il in lo..hi {
                        let v = self.data[jl * m + il];
                        dst.data[idx] = v;
                        idx += 1;
                        dst.pad[jl * m + il] = v;
                    }
                }
            }
            (t, Structure::Rect) | (t, Structure::Square) if t.is_triangular() => {
                let dense = unpack_panel(t, m, self.local_cols, &self.data);
                dst.data.clone_from_slice(&dense);
            }
            _ => {
                return Err(LinalgError::ShapeMismatch {
                    m: self.local_rows,
                    n: self.local_cols,
                    m2: dst.local_rows,
                    n2: dst.local_cols,
                })
            }
        }
        Ok(())
    }

    /// Dense square copy of a packed triangular matrix.
    pub fn unpacked(&self) -> Matrix<A> {
        debug_assert!(self.structure.is_triangular());
        Matrix::from_parts(
            Structure::Square,
            self.global_rows,
            self.global_cols,
            self.grid_rows,
            self.grid_cols,
            self.local_rows,
            self.local_cols,
            self.row_shift,
            self.col_shift,
            self.dense_view().to_vec(),
        )
    }

    fn row_slab(&self, rows: &Range<usize>, y: usize) -> Range<usize> {
        let y = y % self.grid_rows;
        let lo = owned_count(rows.start, self.grid_rows, self.row_shift, y);
        let hi = owned_count(rows.end, self.grid_rows, self.row_shift, y);
        lo..hi
    }

    fn col_slab(&self, cols: &Range<usize>, x: usize) -> Range<usize> {
        let x = x % self.grid_cols;
        let lo = owned_count(cols.start, self.grid_cols, self.col_shift, x);
        let hi = owned_count(cols.end, self.grid_cols, self.col_shift, x);
        lo..hi
    }

    /// Copy of the sub-block at global `rows` x `cols` as an owned matrix.
    /// The caller's slice coordinates select the local slab; the child
    /// carries the accumulated residue shifts.
    pub fn carve(&self, rows: Range<usize>, cols: Range<usize>, x: usize, y: usize) -> Matrix<A> {
        debug_assert!(!self.structure.is_triangular());
        debug_assert!(rows.end <= self.global_rows && cols.end <= self.global_cols);
        let rs = self.row_slab(&rows, y);
        let cs = self.col_slab(&cols, x);
        let m = rs.len();
        let n = cs.len();
        let mut data = Vec::with_capacity(m * n);
        for jl in cs.clone() {
            let base = jl * self.local_rows;
            data.extend_from_slice(&self.data[base + rs.start..base + rs.end]);
        }
        let structure = if self.structure == Structure::Square && rows.len() == cols.len() {
            Structure::Square
        } else {
            Structure::Rect
        };
        Matrix::from_parts(
            structure,
            rows.len(),
            cols.len(),
            self.grid_rows,
            self.grid_cols,
            m,
            n,
            (self.row_shift + rows.start) % self.grid_rows,
            (self.col_shift + cols.start) % self.grid_cols,
            data,
        )
    }

    /// Write a carved sub-block back into place.
    pub fn write_back(&mut self, sub: &Matrix<A>, rows: Range<usize>, cols: Range<usize>, x: usize, y: usize) {
        debug_assert!(!self.structure.is_triangular());
        let rs = self.row_slab(&rows, y);
        let cs = self.col_slab(&cols, x);
        debug_assert_eq!(sub.local_rows, rs.len());
        debug_assert_eq!(sub.local_cols, cs.len());
        let m = rs.len();
        for (js, jl) in cs.enumerate() {
            let base = jl * self.local_rows;
            self.data[base + rs.start..base + rs.end]
                .clone_from_slice(&sub.data[js * m..js * m + m]);
        }
    }

    /// All-gather the panels over `slice` and assemble the dense global
    /// matrix, column-major, identically on every member.
    pub fn gather(&self, slice: &Communicator, x: usize, y: usize) -> Vec<A> {
        let msg = GatherMsg {
            x,
            y,
            rows: self.local_rows,
            cols: self.local_cols,
            row_shift: self.row_shift,
            col_shift: self.col_shift,
            data: self.dense_view().to_vec(),
        };
        let msgs = slice.allgather(&msg);
        let mut out = vec![A::zero(); self.global_rows * self.global_cols];
        for msg in &msgs {
            let y0 = first_owned(self.grid_rows, msg.row_shift, msg.y % self.grid_rows);
            let x0 = first_owned(self.grid_cols, msg.col_shift, msg.x % self.grid_cols);
            for jl in 0..msg.cols {
                let gj = x0 + jl * self.grid_cols;
                for il in 0..msg.rows {
                    let gi = y0 + il * self.grid_rows;
                    out[gj * self.global_rows + gi] = msg.data[jl * msg.rows + il];
                }
            }
        }
        out
    }

    /// Zero every panel entry outside the `keep` triangle of the global
    /// block. Dense structures only.
    pub fn zero_complement(&mut self, keep: crate::lapack::UPLO, x: usize, y: usize) {
        use crate::lapack::UPLO;
        debug_assert!(!self.structure.is_triangular());
        let y0 = first_owned(self.grid_rows, self.row_shift, y % self.grid_rows);
        let x0 = first_owned(self.grid_cols, self.col_shift, x % self.grid_cols);
        for jl in 0..self.local_cols {
            let gj = x0 + jl * self.grid_cols;
            for il in 0..self.local_rows {
                let gi = y0 + il * self.grid_rows;
                let drop = match keep {
                    UPLO::Lower => gi < gj,
                    UPLO::Upper => gi > gj,
                };
                if drop {
                    self.data[jl * self.local_rows + il] = A::zero();
                }
            }
        }
    }

    /// Overwrite the panel with this rank's entries of a dense global
    /// column-major block (the scatter half of the base case).
    pub fn scatter_from_global(&mut self, global: &[A], x: usize, y: usize) {
        debug_assert!(!self.structure.is_triangular());
        debug_assert_eq!(global.len(), self.global_rows * self.global_cols);
        let y0 = first_owned(self.grid_rows, self.row_shift, y % self.grid_rows);
        let x0 = first_owned(self.grid_cols, self.col_shift, x % self.grid_cols);
        for jl in 0..self.local_cols {
            let gj = x0 + jl * self.grid_cols;
            for il in 0..self.local_rows {
                let gi = y0 + il * self.grid_rows;
                self.data[jl * self.local_rows + il] = global[gj * self.global_rows + gi];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_counts() {
        // rows 0..5 over grid 2 with no shift: rank 0 owns {0,2,4}, rank 1 {1,3}
        assert_eq!(owned_count(5, 2, 0, 0), 3);
        assert_eq!(owned_count(5, 2, 0, 1), 2);
        // shifted origin by 1: rank 0 owns {1,3}, rank 1 {0,2,4}
        assert_eq!(owned_count(5, 2, 1, 0), 2);
        assert_eq!(owned_count(5, 2, 1, 1), 3);
        assert_eq!(owned_count(0, 3, 2, 1), 0);
    }

    #[test]
    fn symmetric_fill_is_symmetric_and_deterministic() {
        // assemble the full 6x6 from a 2x2 grid of panels, twice
        let assemble = || {
            let mut full = vec![0.0f64; 36];
            for y in 0..2 {
                for x in 0..2 {
                    let mut a: Matrix<f64> = Matrix::new(6, 6, 2, 2, Structure::Square).unwrap();
                    a.distribute_symmetric(x, y, 17, true);
                    for jl in 0..3 {
                        for il in 0..3 {
                            let gi = y + il * 2;
                            let gj = x + jl * 2;
                            full[gj * 6 + gi] = a.data()[jl * 3 + il];
                        }
                    }
                }
            }
            full
        };
        let a = assemble();
        let b = assemble();
        assert_eq!(a, b);
        for i in 0..6 {
            for j in 0..6 {
                assert_eq!(a[j * 6 + i], a[i * 6 + j]);
            }
            assert!(a[i * 6 + i] >= 6.0);
        }
    }

    #[test]
    fn serialize_round_trip_zeroes_complement() {
        let mut a: Matrix<f64> = Matrix::new(4, 4, 1, 1, Structure::Square).unwrap();
        a.distribute_random(0, 0, 3);
        let mut packed: Matrix<f64> = Matrix::new(4, 4, 1, 1, Structure::UpperTri).unwrap();
        a.serialize_into(&mut packed).unwrap();
        let mut back = a.zeros_like();
        packed.serialize_into(&mut back).unwrap();
        for j in 0..4 {
            for i in 0..4 {
                let v = back.data()[j * 4 + i];
                if i <= j {
                    assert_eq!(v, a.data()[j * 4 + i]);
                } else {
                    assert_eq!(v, 0.0);
                }
            }
        }
        // pad mirrors the packed panel densely
        assert_eq!(packed.dense_view(), back.data());
    }

    #[test]
    fn carve_write_back_round_trip() {
        for y in 0..2 {
            for x in 0..2 {
                let mut a: Matrix<f64> = Matrix::new(6, 6, 2, 2, Structure::Square).unwrap();
                a.distribute_random(x, y, 11);
                let orig = a.clone();
                // uneven split of the trailing block
                let sub = a.carve(3..6, 1..6, x, y);
                assert_eq!(sub.global_rows(), 3);
                assert_eq!(sub.global_cols(), 5);
                a.write_back(&sub, 3..6, 1..6, x, y);
                assert_eq!(a.data(), orig.data());
                // nested carve keeps residues straight
                let nested = sub.carve(1..3, 2..4, x, y);
                let again = sub.carve(1..3, 2..4, x, y);
                assert_eq!(nested.data(), again.data());
            }
        }
    }

    #[test]
    fn buffer_swaps_rotate_without_copying() {
        let mut a: Matrix<f64> = Matrix::new(4, 4, 1, 1, Structure::Square).unwrap();
        a.distribute_random(0, 0, 19);
        let data = a.data().to_vec();
        a.swap_data();
        assert!(a.data().iter().all(|&v| v == 0.0));
        assert_eq!(a.scratch(), &data[..]);
        a.swap_data();
        assert_eq!(a.data(), &data[..]);

        let mut t: Matrix<f64> = Matrix::new(4, 4, 1, 1, Structure::UpperTri).unwrap();
        t.distribute_random(0, 0, 20);
        let dense = t.pad().to_vec();
        t.swap_pad();
        assert_eq!(t.scratch(), &dense[..]);
    }

    #[test]
    fn identity_fill() {
        for (x, y) in &[(0usize, 0usize), (1, 0), (0, 1), (1, 1)] {
            let mut e: Matrix<f64> = Matrix::new(4, 4, 2, 2, Structure::Square).unwrap();
            e.distribute_identity(*x, *y, 3.0);
            for jl in 0..2 {
                for il in 0..2 {
                    let want = if y + il * 2 == x + jl * 2 { 3.0 } else { 0.0 };
                    assert_eq!(e.data()[jl * 2 + il], want);
                }
            }
        }
    }

    #[test]
    fn triangular_panel_offsets() {
        let lo: Matrix<f64> = Matrix::new(8, 8, 2, 2, Structure::LowerTri).unwrap();
        assert_eq!(lo.num_elems(), 10);
        assert_eq!(lo.offset(0, 0), 0);
        assert_eq!(lo.offset(3, 0), 3);
        assert_eq!(lo.offset(1, 1), 4);
        assert_eq!(lo.offset(3, 3), 9);
        let up: Matrix<f64> = Matrix::new(8, 8, 2, 2, Structure::UpperTri).unwrap();
        assert_eq!(up.offset(0, 0), 0);
        assert_eq!(up.offset(0, 1), 1);
        assert_eq!(up.offset(1, 1), 2);
        assert_eq!(up.offset(3, 3), 9);
    }
}
