//! Valuation pass: snapshot, decompose, solve, derive, write back.
//!
//! # Architecture
//!
//! ```text
//! ValuationStore::with_pass ──> PassScope
//!        │                        │ lock(PASS_LOCKS)
//!        │                        │ load_participants / load_edges
//!        │                        ▼
//!        │                 HoldingsSnapshot ──> decompose ──> [Component]
//!        │                                                      │
//!        │                                 solve_components (thread fan-out)
//!        │                                                      ▼
//!        │                 ValuationUpdate <── derive_component per component
//!        │                        │ apply
//!        ▼                        ▼
//!     commit ──────────> NotifierRegistry (ValuationChanged per leader)
//! ```

mod service;
mod solve;

pub use service::ValuationService;
pub use solve::solve_components;

use crate::domain::valuation::PricingParams;
use crate::port::outbound::solver::DEFAULT_SINGULAR_TOLERANCE;

/// Default component count at which solving fans out to worker threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Tunables of a valuation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationParams {
    /// Shares that represent the whole net worth of a leader.
    pub leader_value_share: f64,
    pub pricing: PricingParams,
    /// Relative pivot tolerance handed to the LU solver.
    pub singular_tolerance: f64,
    /// Minimum number of components before solving in parallel.
    pub parallel_threshold: usize,
    /// Worker threads for parallel solving. `1` disables fan-out.
    pub workers: usize,
}

impl Default for ValuationParams {
    fn default() -> Self {
        Self {
            leader_value_share: 100.0,
            pricing: PricingParams::default(),
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            workers: 1,
        }
    }
}
