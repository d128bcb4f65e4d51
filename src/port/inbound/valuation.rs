//! Inbound port for triggering valuation passes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// Summary of one completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Participants valued.
    pub participants: usize,
    /// Leader instruments re-priced.
    pub leaders: usize,
    /// Connected components solved.
    pub components: usize,
    /// Member count of the largest component.
    pub largest_component: usize,
    /// Leader instruments left with zero tradable volume.
    pub halted_instruments: usize,
    /// Pass timestamp, `None` for an empty pass.
    pub valued_at: Option<DateTime<Utc>>,
}

impl PassReport {
    /// Report of a pass that found nothing to value.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            participants: 0,
            leaders: 0,
            components: 0,
            largest_component: 0,
            halted_instruments: 0,
            valued_at: None,
        }
    }

    /// Whether the pass wrote nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.participants == 0
    }
}

/// The single entry point a periodic scheduler calls.
///
/// Re-running with no intervening change to storage produces the same
/// values, so callers may invoke it as often as they like.
pub trait RecomputeValuations: Send + Sync {
    /// Recompute every leader price and participant net worth now.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the pass. Nothing was written.
    fn recompute_now(&self) -> Result<PassReport>;
}
