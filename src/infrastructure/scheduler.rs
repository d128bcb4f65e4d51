//! Periodic pass driver.
//!
//! Passes are synchronous and may take a while on a large economy, so each
//! one runs on the blocking pool. The next tick is delayed rather than
//! bunched when a pass overruns its interval, so passes never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::port::inbound::valuation::RecomputeValuations;

/// Outcome counters of a scheduler run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSummary {
    pub committed: u64,
    pub failed: u64,
}

/// Run passes every `interval` until `shutdown` flips to `true`.
///
/// A failed pass is logged and counted; the next tick tries again.
///
/// # Errors
/// Returns an error only if a pass task panics.
pub async fn run_periodic(
    recompute: Arc<dyn RecomputeValuations>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<SchedulerSummary> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut summary = SchedulerSummary::default();

    info!(interval_secs = interval.as_secs_f64(), "Scheduler started");
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
        }

        let task = Arc::clone(&recompute);
        let outcome = tokio::task::spawn_blocking(move || task.recompute_now())
            .await
            .map_err(|e| Error::Runtime(format!("valuation pass task failed: {e}")))?;

        match outcome {
            Ok(report) => {
                summary.committed += 1;
                debug!(participants = report.participants, "Scheduled pass done");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(error = %e, "Scheduled pass failed");
            }
        }
    }

    info!(
        committed = summary.committed,
        failed = summary.failed,
        "Scheduler stopped"
    );
    Ok(summary)
}
