//! Valuation pass orchestration.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{solve::solve_components, ValuationParams};
use crate::domain::{component::decompose, snapshot::HoldingsSnapshot, valuation::ValuationUpdate};
use crate::error::Result;
use crate::port::inbound::valuation::{PassReport, RecomputeValuations};
use crate::port::outbound::notifier::{
    Event, NotifierRegistry, PassFailedEvent, ValuationChangedEvent,
};
use crate::port::outbound::solver::LinearSolver;
use crate::port::outbound::store::{PassScope, ValuationStore, PASS_LOCKS};

/// Runs whole-economy valuation passes against a store.
pub struct ValuationService<S> {
    store: Arc<S>,
    solver: Arc<dyn LinearSolver>,
    notifiers: Arc<NotifierRegistry>,
    params: ValuationParams,
}

impl<S: ValuationStore> ValuationService<S> {
    pub fn new(
        store: Arc<S>,
        solver: Arc<dyn LinearSolver>,
        notifiers: Arc<NotifierRegistry>,
        params: ValuationParams,
    ) -> Self {
        Self {
            store,
            solver,
            notifiers,
            params,
        }
    }

    #[must_use]
    pub fn params(&self) -> &ValuationParams {
        &self.params
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run one pass.
    ///
    /// Either every derived value is committed and one `ValuationChanged`
    /// event per leader follows, or nothing is written and a single
    /// `PassFailed` event describes why.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the pass.
    pub fn run_pass(&self) -> Result<PassReport> {
        let started = Instant::now();
        let outcome = self.store.with_pass(|scope| self.compute_and_apply(scope));

        match outcome {
            Ok(Some((update, report))) => {
                for quote in &update.quotes {
                    self.notifiers
                        .notify_all(Event::ValuationChanged(ValuationChangedEvent::from_quote(
                            quote,
                            update.valued_at,
                        )));
                }
                info!(
                    participants = report.participants,
                    leaders = report.leaders,
                    components = report.components,
                    largest_component = report.largest_component,
                    halted = report.halted_instruments,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Valuation pass committed"
                );
                Ok(report)
            }
            Ok(None) => {
                debug!("No participants to value");
                Ok(PassReport::empty())
            }
            Err(e) => {
                error!(
                    kind = %e.failure_kind(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Valuation pass rolled back"
                );
                self.notifiers
                    .notify_all(Event::PassFailed(PassFailedEvent::from_error(&e)));
                Err(e)
            }
        }
    }

    fn compute_and_apply(
        &self,
        scope: &mut dyn PassScope,
    ) -> Result<Option<(ValuationUpdate, PassReport)>> {
        scope.lock(&PASS_LOCKS)?;
        let participants = scope.load_participants()?;
        let edges = scope.load_edges()?;

        let snapshot = HoldingsSnapshot::try_new(participants, edges)?;
        if snapshot.is_empty() {
            return Ok(None);
        }

        let components = decompose(&snapshot);
        let largest_component = components.iter().map(|c| c.members().len()).max().unwrap_or(0);
        debug!(
            participants = snapshot.len(),
            edges = snapshot.edges().len(),
            components = components.len(),
            largest_component,
            "Snapshot decomposed"
        );

        let solved = solve_components(&snapshot, &components, self.solver.as_ref(), &self.params)?;

        let mut update = ValuationUpdate {
            valuations: Vec::with_capacity(snapshot.len()),
            quotes: Vec::with_capacity(snapshot.leader_count()),
            valued_at: Utc::now(),
        };
        for component in solved {
            update.valuations.extend(component.valuations);
            update.quotes.extend(component.quotes);
        }
        update.normalize();

        let halted_instruments = update.quotes.iter().filter(|q| !q.is_tradable()).count();
        if halted_instruments > 0 {
            warn!(halted_instruments, "Leader instruments below ask floor");
        }

        scope.apply(&update)?;

        let report = PassReport {
            participants: update.valuations.len(),
            leaders: update.quotes.len(),
            components: components.len(),
            largest_component,
            halted_instruments,
            valued_at: Some(update.valued_at),
        };
        Ok(Some((update, report)))
    }
}

impl<S: ValuationStore> RecomputeValuations for ValuationService<S> {
    fn recompute_now(&self) -> Result<PassReport> {
        self.run_pass()
    }
}
