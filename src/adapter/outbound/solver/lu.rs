//! Dense LU decomposition with partial pivoting.
//!
//! Factors `P·A = L·U` once, then answers each right-hand side with one
//! forward and one backward substitution. `L` (unit diagonal, stored below
//! the diagonal) and `U` (on and above it) share one buffer.

use crate::domain::system::DenseMatrix;
use crate::port::outbound::solver::{LinearSolver, SolveError};

pub use crate::port::outbound::solver::DEFAULT_SINGULAR_TOLERANCE;

/// LU solver for general square systems.
#[derive(Debug, Clone, Copy)]
pub struct LuSolver {
    /// A pivot at or below `singular_tolerance * max|A|` counts as zero.
    singular_tolerance: f64,
}

impl LuSolver {
    /// Create a solver with the given relative pivot tolerance.
    #[must_use]
    pub const fn new(singular_tolerance: f64) -> Self {
        Self { singular_tolerance }
    }

    #[must_use]
    pub const fn singular_tolerance(&self) -> f64 {
        self.singular_tolerance
    }
}

impl Default for LuSolver {
    fn default() -> Self {
        Self::new(DEFAULT_SINGULAR_TOLERANCE)
    }
}

impl LinearSolver for LuSolver {
    fn name(&self) -> &'static str {
        "lu"
    }

    fn solve(&self, matrix: &DenseMatrix, rhs: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, SolveError> {
        let n = matrix.dim();
        if let Some(bad) = rhs.iter().find(|b| b.len() != n) {
            return Err(SolveError::DimensionMismatch {
                expected: n,
                actual: bad.len(),
            });
        }
        if n == 0 {
            return Ok(vec![Vec::new(); rhs.len()]);
        }

        let factors = LuFactors::factor(matrix, self.singular_tolerance)?;
        rhs.iter().map(|b| factors.substitute(b)).collect()
    }
}

struct LuFactors {
    n: usize,
    lu: Vec<f64>,
    /// `perm[i]` is the original row now at position `i`.
    perm: Vec<usize>,
}

impl LuFactors {
    fn factor(matrix: &DenseMatrix, tolerance: f64) -> Result<Self, SolveError> {
        let n = matrix.dim();
        let mut lu = matrix.as_slice().to_vec();
        let mut perm: Vec<usize> = (0..n).collect();
        let threshold = tolerance * matrix.max_abs();

        for k in 0..n {
            let (pivot_row, magnitude) = (k..n)
                .map(|i| (i, lu[i * n + k].abs()))
                .fold((k, f64::NEG_INFINITY), |best, cur| {
                    if cur.1 > best.1 {
                        cur
                    } else {
                        best
                    }
                });

            if !(magnitude > threshold) {
                return Err(SolveError::Singular {
                    pivot: k,
                    magnitude,
                });
            }

            if pivot_row != k {
                for j in 0..n {
                    lu.swap(k * n + j, pivot_row * n + j);
                }
                perm.swap(k, pivot_row);
            }

            let pivot = lu[k * n + k];
            for i in (k + 1)..n {
                let factor = lu[i * n + k] / pivot;
                lu[i * n + k] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    lu[i * n + j] -= factor * lu[k * n + j];
                }
            }
        }

        Ok(Self { n, lu, perm })
    }

    fn substitute(&self, b: &[f64]) -> Result<Vec<f64>, SolveError> {
        let n = self.n;
        let mut x: Vec<f64> = self.perm.iter().map(|&row| b[row]).collect();

        for i in 0..n {
            let mut acc = x[i];
            for j in 0..i {
                acc -= self.lu[i * n + j] * x[j];
            }
            x[i] = acc;
        }

        for i in (0..n).rev() {
            let mut acc = x[i];
            for j in (i + 1)..n {
                acc -= self.lu[i * n + j] * x[j];
            }
            x[i] = acc / self.lu[i * n + i];
        }

        match x.iter().position(|v| !v.is_finite()) {
            Some(row) => Err(SolveError::NonFinite { row }),
            None => Ok(x),
        }
    }
}
