//! Process-grid topologies.
//!
//! A cubic grid of side `d` (world size d^3) carries the four
//! sub-communicators SUMMA and CholInv coordinate over: slice (fixed z),
//! row (fixed y,z), column (fixed x,z) and depth (fixed x,y). The tunable
//! grid has shape (c, d, c) with world size d*c^2; its column communicator
//! is further split into a contiguous part of size c and an alternating
//! part of size d/c, and a mini-cube of size c^3 keeps a cubic sub-grid
//! available for the inner factorization. c = d recovers the cubic grid,
//! c = 1 a one-dimensional column of ranks.

use tracing::debug;

use crate::comm::Communicator;
use crate::error::{LinalgError, Result};

/// Cubic process grid of side `d`.
pub struct Square {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub d: usize,
    pub world: Communicator,
    pub row: Communicator,
    pub column: Communicator,
    pub depth: Communicator,
    pub slice: Communicator,
}

impl Square {
    /// Build the cubic topology over `world`. Fails on a non-cubic world
    /// size before any matrix is allocated.
    pub fn new(world: Communicator) -> Result<Square> {
        let size = world.size();
        let d = cube_root(size).ok_or(LinalgError::NotCubic { size })?;
        let r = world.rank();
        let x = r % d;
        let y = (r % (d * d)) / d;
        let z = r / (d * d);
        let slice = world.split(z, r);
        let sr = slice.rank();
        let row = slice.split(sr / d, sr);
        let column = slice.split(sr % d, sr);
        let depth = world.split(r % (d * d), r);
        debug!(d, x, y, z, "built cubic process grid");
        Ok(Square {
            x,
            y,
            z,
            d,
            world,
            row,
            column,
            depth,
            slice,
        })
    }

    /// World rank of the transpose partner (y, x, z). Equal to the caller's
    /// own rank on the grid diagonal.
    pub fn transpose_partner(&self) -> usize {
        self.z * self.d * self.d + self.x * self.d + self.y
    }
}

/// Tunable (2.5D) process grid of shape (c, d, c).
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub d: usize,
    pub c: usize,
    pub world: Communicator,
    pub row: Communicator,
    pub column_contig: Communicator,
    pub column_alt: Communicator,
    pub depth: Communicator,
    pub slice: Communicator,
    pub cube: Communicator,
}

impl Rect {
    /// Build the tunable topology with replication factor `c`. Worlds where
    /// `c*c` does not divide the size, or where c > d or c does not divide
    /// d, are rejected here.
    pub fn new(world: Communicator, c: usize) -> Result<Rect> {
        let size = world.size();
        if c == 0 || size % (c * c) != 0 {
            return Err(LinalgError::InvalidReplication { size, c });
        }
        let d = size / (c * c);
        if c > d || d % c != 0 {
            return Err(LinalgError::InvalidReplication { size, c });
        }
        let r = world.rank();
        let slice_size = d * c;
        let x = r % c;
        let y = (r % slice_size) / c;
        let z = r / slice_size;
        let slice = world.split(z, r);
        let sr = slice.rank();
        let row = slice.split(sr / c, sr);
        let column = slice.split(sr % c, sr);
        let cr = column.rank();
        let column_contig = column.split(cr / c, cr);
        let column_alt = column.split(cr % c, cr);
        let depth = world.split(r % slice_size, r);
        let cube = world.split((r % slice_size) / (c * c), r);
        debug!(d, c, x, y, z, "built tunable process grid");
        Ok(Rect {
            x,
            y,
            z,
            d,
            c,
            world,
            row,
            column_contig,
            column_alt,
            depth,
            slice,
            cube,
        })
    }
}

fn cube_root(n: usize) -> Option<usize> {
    let guess = (n as f64).cbrt().round() as usize;
    for d in guess.saturating_sub(1)..=guess + 1 {
        if d * d * d == n {
            return Some(d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm;

    #[test]
    fn cube_root_exact_only() {
        assert_eq!(cube_root(27), Some(3));
        assert_eq!(cube_root(1), Some(1));
        assert_eq!(cube_root(7), None);
        assert_eq!(cube_root(26), None);
    }

    #[test]
    fn cubic_coordinates_and_sizes() {
        comm::run_world(8, |world| {
            let rank = world.rank();
            let topo = Square::new(world).unwrap();
            assert_eq!(topo.d, 2);
            assert_eq!(rank, topo.z * 4 + topo.y * 2 + topo.x);
            assert_eq!(topo.row.size(), 2);
            assert_eq!(topo.column.size(), 2);
            assert_eq!(topo.depth.size(), 2);
            assert_eq!(topo.slice.size(), 4);
            assert_eq!(topo.row.rank(), topo.x);
            assert_eq!(topo.column.rank(), topo.y);
            assert_eq!(topo.depth.rank(), topo.z);
        });
    }

    #[test]
    fn transpose_partner_is_involutive() {
        comm::run_world(27, |world| {
            let topo = Square::new(world).unwrap();
            let partner = topo.transpose_partner();
            let echoed = topo.world.allgather(&topo.transpose_partner());
            assert_eq!(echoed[partner], topo.world.rank());
            if topo.x == topo.y {
                assert_eq!(partner, topo.world.rank());
            }
        });
    }

    #[test]
    fn tunable_sizes() {
        comm::run_world(16, |world| {
            let topo = Rect::new(world, 2).unwrap();
            assert_eq!(topo.d, 4);
            assert_eq!(topo.row.size(), 2);
            assert_eq!(topo.column_contig.size(), 2);
            assert_eq!(topo.column_alt.size(), 2);
            assert_eq!(topo.depth.size(), 2);
            assert_eq!(topo.slice.size(), 8);
            assert_eq!(topo.cube.size(), 8);
        });
    }
}
