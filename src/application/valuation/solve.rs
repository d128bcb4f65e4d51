//! Per-component build, solve and derive.
//!
//! Components are independent by construction, so they may be solved on a
//! rayon pool. Results are merged back in component order and the first
//! failing component (in that order) decides the reported error, which keeps
//! the outcome independent of thread scheduling.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, trace};

use super::ValuationParams;
use crate::domain::component::Component;
use crate::domain::snapshot::HoldingsSnapshot;
use crate::domain::system::LinearSystem;
use crate::domain::valuation::{derive_component, ComponentValuation};
use crate::error::{Error, Result, ValuationError};
use crate::port::outbound::solver::{LinearSolver, SolveError};

/// Solve every component and derive its valuations.
///
/// # Errors
///
/// Returns the error of the first component (in `components` order) that
/// fails to build, solve or derive. No partial results are returned.
pub fn solve_components(
    snapshot: &HoldingsSnapshot,
    components: &[Component],
    solver: &dyn LinearSolver,
    params: &ValuationParams,
) -> Result<Vec<ComponentValuation>> {
    let workers = params.workers.max(1);
    if workers == 1 || components.len() < params.parallel_threshold.max(2) {
        return components
            .iter()
            .map(|component| solve_one(snapshot, component, solver, params))
            .collect();
    }

    debug!(
        components = components.len(),
        workers,
        solver = solver.name(),
        "Solving components in parallel"
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("valuator-solve-{i}"))
        .build()
        .map_err(|e| Error::Runtime(format!("solver thread pool: {e}")))?;

    // Collect every outcome first so the reported error is the first one in
    // component order, not the first one to finish.
    let solved: Vec<Result<ComponentValuation>> = pool.install(|| {
        components
            .par_iter()
            .map(|component| solve_one(snapshot, component, solver, params))
            .collect()
    });
    solved.into_iter().collect()
}

/// Build, solve and derive one component.
fn solve_one(
    snapshot: &HoldingsSnapshot,
    component: &Component,
    solver: &dyn LinearSolver,
    params: &ValuationParams,
) -> Result<ComponentValuation> {
    let system = LinearSystem::build(component, snapshot, params.leader_value_share)?;

    let solution = solver
        .solve(system.matrix(), system.rhs())
        .map_err(|source| ValuationError::SolveFailed {
            members: component.participant_ids(snapshot),
            source,
        })?;
    let solution: [Vec<f64>; 2] =
        solution
            .try_into()
            .map_err(|returned: Vec<Vec<f64>>| ValuationError::SolveFailed {
                members: component.participant_ids(snapshot),
                source: SolveError::DimensionMismatch {
                    expected: 2,
                    actual: returned.len(),
                },
            })?;

    trace!(members = system.dim(), "Component solved");
    Ok(derive_component(&system, &solution, snapshot, &params.pricing)?)
}
