//! Solver port for dense linear systems.
//!
//! Every component of the ownership graph produces one square system with
//! two right-hand sides (bid and ask basis). A solver factors the matrix once
//! and reuses the factorization for every right-hand side.

use thiserror::Error;

use crate::domain::system::DenseMatrix;

/// Default relative pivot tolerance: a pivot at or below
/// `tolerance * max|A|` counts as zero.
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-12;

/// Why a linear system could not be solved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    /// No usable pivot was found at elimination step `pivot`.
    #[error("matrix is singular at pivot {pivot} (|pivot| = {magnitude:e})")]
    Singular { pivot: usize, magnitude: f64 },

    /// Substitution produced NaN or an infinity.
    #[error("solution is not finite in row {row}")]
    NonFinite { row: usize },

    /// A right-hand side does not match the matrix dimension.
    #[error("right-hand side has {actual} rows, matrix has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Dense direct solver for general (non-symmetric) square systems.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) so independent
/// components can be solved concurrently.
pub trait LinearSolver: Send + Sync {
    /// Return the solver name for logging.
    fn name(&self) -> &'static str;

    /// Solve `matrix · x = b` for every `b` in `rhs` using a single
    /// factorization of `matrix`.
    ///
    /// Returns one solution vector per right-hand side, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::Singular`] if the matrix cannot be factored,
    /// [`SolveError::NonFinite`] if a solution component is NaN or infinite,
    /// and [`SolveError::DimensionMismatch`] for a malformed right-hand side.
    fn solve(&self, matrix: &DenseMatrix, rhs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, SolveError>;
}
