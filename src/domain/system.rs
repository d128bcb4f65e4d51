//! Per-component linear systems.
//!
//! For a component of `n` participants the net worths `X` satisfy
//!
//! ```text
//! A · X = B
//!
//! A[k][k]        = 1
//! A[k][index(L)] = -Σ shares(k, L) / leader_value_share
//! B[k][0]        = external_bid(k) + cash(k) - provision(k)
//! B[k][1]        = external_ask(k) + cash(k) - provision(k)
//! ```
//!
//! Column 0 of `B` is the bid basis, column 1 the ask basis. Both share the
//! same matrix, so one factorization solves both.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::component::Component;
use super::error::DomainError;
use super::money::to_f64;
use super::snapshot::HoldingsSnapshot;

/// Column of the right-hand side holding bid-basis values.
pub const BID_BASIS: usize = 0;

/// Column of the right-hand side holding ask-basis values.
pub const ASK_BASIS: usize = 1;

/// Square dense matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// The `n × n` identity matrix.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self { n, data }
    }

    /// Build from rows. Returns `None` if the rows do not form a square.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            return None;
        }
        Some(Self {
            n,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// Dimension of the matrix.
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.n
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        self.data[row * self.n + col] += delta;
    }

    /// Largest absolute entry, or `0.0` for an empty matrix.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Row-major entries.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Linear system for one component, ready for the solver.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// Snapshot indices in local (row) order.
    members: Vec<usize>,
    matrix: DenseMatrix,
    /// `[bid, ask]` right-hand sides.
    rhs: [Vec<f64>; 2],
    /// Provision balance per row, for reconstructing gross totals.
    provision_out: Vec<Decimal>,
}

impl LinearSystem {
    /// Build the system for `component`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EdgeOutsideComponent`] if a member holds a
    /// leader that belongs to another component. The decomposer makes this
    /// impossible for a consistent snapshot/component pair.
    pub fn build(
        component: &Component,
        snapshot: &HoldingsSnapshot,
        leader_value_share: f64,
    ) -> Result<Self, DomainError> {
        let members = component.members().to_vec();
        let n = members.len();
        let local: HashMap<usize, usize> = members
            .iter()
            .enumerate()
            .map(|(row, &idx)| (idx, row))
            .collect();

        let mut matrix = DenseMatrix::identity(n);
        let mut bid = Vec::with_capacity(n);
        let mut ask = Vec::with_capacity(n);
        let mut provision_out = Vec::with_capacity(n);

        for (row, &idx) in members.iter().enumerate() {
            let participant = snapshot.participant(idx);
            let overflow = || DomainError::ValueOverflow {
                participant: participant.id,
            };
            bid.push(to_f64(participant.base_value_bid().ok_or_else(overflow)?));
            ask.push(to_f64(participant.base_value_ask().ok_or_else(overflow)?));
            provision_out.push(participant.provision_balance);

            for edge in snapshot.edges_from(participant.id) {
                let col = snapshot
                    .index_of(edge.leader())
                    .and_then(|leader_idx| local.get(&leader_idx).copied())
                    .ok_or(DomainError::EdgeOutsideComponent {
                        follower: edge.follower(),
                        leader: edge.leader(),
                    })?;
                matrix.add(row, col, -to_f64(edge.shares()) / leader_value_share);
            }
        }

        Ok(Self {
            members,
            matrix,
            rhs: [bid, ask],
            provision_out,
        })
    }

    /// Snapshot indices in row order.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    #[must_use]
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// `[bid, ask]` right-hand sides.
    #[must_use]
    pub fn rhs(&self) -> &[Vec<f64>; 2] {
        &self.rhs
    }

    #[must_use]
    pub fn provision_out(&self) -> &[Decimal] {
        &self.provision_out
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.members.len()
    }
}
