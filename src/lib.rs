//! Distributed-memory dense SPD factorization over 3D process grids.
//!
//! The core of the crate is the recursive Cholesky factorization with an
//! explicit factor inverse ([`cholinv`]) and the SUMMA-style distributed
//! multiply it rides on ([`summa`]), both running over the cubic topology
//! of [`topo::Square`]. On top of them sit the deferred triangular solves
//! ([`trsm`]) and the Cholesky-based tall-skinny QR ([`cacqr`]) over the
//! tunable (2.5D) topology of [`topo::Rect`].
//!
//! Ranks are members of a [`comm::Communicator`] group; the in-process
//! transport runs a whole grid as threads, so `comm::run_world(8, ...)`
//! drives a 2x2x2 grid inside one test binary. Matrices are block-cyclic
//! panels owned per rank ([`matrix::Matrix`]), and the local kernels are
//! dense BLAS through `ndarray` plus the LAPACK `*potrf`/`*trtri` pair at
//! the recursion base case.

pub mod assert;
pub mod cacqr;
pub mod cholinv;
pub mod comm;
pub mod error;
pub mod lapack;
pub mod matrix;
pub mod summa;
pub mod topo;
pub mod trsm;
pub mod types;

pub use crate::assert::*;
pub use crate::cacqr::CacqrArgs;
pub use crate::cholinv::{CholInvArgs, Factorization};
pub use crate::error::*;
pub use crate::lapack::{Diag, UPLO};
pub use crate::matrix::{Matrix, Structure};
pub use crate::summa::{Cut, GemmArgs, Side};
pub use crate::topo::{Rect, Square};
pub use crate::types::Scalar;
