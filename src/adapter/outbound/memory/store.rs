//! In-memory valuation store.
//!
//! The whole store sits behind one mutex that a pass holds from open to
//! commit, so passes are serialized the same way the SQLite adapter
//! serializes them with an immediate transaction. Writes are staged on the
//! pass and only folded into the committed state when the body returns `Ok`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::{
    edge::OwnershipEdge,
    id::{InstrumentId, ParticipantId},
    participant::Participant,
    valuation::{LeaderQuote, ParticipantValuation, ValuationUpdate},
};
use crate::error::{Error, Result};
use crate::port::outbound::store::{LockMode, PassScope, StorageRegion, ValuationStore};

/// Where an injected failure fires during the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// Reading participants or edges fails.
    Load,
    /// Staging the update fails.
    Apply,
    /// The body succeeds but the commit fails.
    Commit,
}

#[derive(Debug, Default)]
struct State {
    participants: Vec<Participant>,
    edges: Vec<OwnershipEdge>,
    valuations: BTreeMap<ParticipantId, ParticipantValuation>,
    quotes: BTreeMap<InstrumentId, LeaderQuote>,
    last_valued_at: Option<DateTime<Utc>>,
    last_locks: Vec<(StorageRegion, LockMode)>,
    committed_passes: usize,
    fail_next: Option<FailPoint>,
}

/// Thread-safe store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create a store holding the given participants and edges.
    #[must_use]
    pub fn new(participants: Vec<Participant>, edges: Vec<OwnershipEdge>) -> Self {
        Self {
            state: Mutex::new(State {
                participants,
                edges,
                ..State::default()
            }),
        }
    }

    /// Replace the holdings a pass reads. Committed valuations are kept.
    pub fn replace_holdings(&self, participants: Vec<Participant>, edges: Vec<OwnershipEdge>) {
        let mut state = self.state.lock();
        state.participants = participants;
        state.edges = edges;
    }

    /// Seed a committed quote, as if an earlier pass had written it.
    pub fn seed_quote(&self, quote: LeaderQuote) {
        self.state.lock().quotes.insert(quote.instrument_id, quote);
    }

    /// Make the next pass fail at `point`. Cleared once it fires.
    pub fn fail_next(&self, point: FailPoint) {
        self.state.lock().fail_next = Some(point);
    }

    /// Committed quotes, ascending instrument id.
    #[must_use]
    pub fn quotes(&self) -> Vec<LeaderQuote> {
        self.state.lock().quotes.values().cloned().collect()
    }

    #[must_use]
    pub fn quote(&self, instrument: InstrumentId) -> Option<LeaderQuote> {
        self.state.lock().quotes.get(&instrument).cloned()
    }

    /// Committed valuations, ascending participant id.
    #[must_use]
    pub fn valuations(&self) -> Vec<ParticipantValuation> {
        self.state.lock().valuations.values().cloned().collect()
    }

    #[must_use]
    pub fn valuation(&self, participant: ParticipantId) -> Option<ParticipantValuation> {
        self.state.lock().valuations.get(&participant).cloned()
    }

    #[must_use]
    pub fn last_valued_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_valued_at
    }

    /// Lock regions requested by the most recent pass.
    #[must_use]
    pub fn last_locks(&self) -> Vec<(StorageRegion, LockMode)> {
        self.state.lock().last_locks.clone()
    }

    /// Number of passes that committed.
    #[must_use]
    pub fn committed_passes(&self) -> usize {
        self.state.lock().committed_passes
    }
}

struct MemoryPass<'a> {
    state: &'a State,
    fail: Option<FailPoint>,
    locks: Vec<(StorageRegion, LockMode)>,
    staged: Option<ValuationUpdate>,
}

impl MemoryPass<'_> {
    fn ensure_locked(&self, region: StorageRegion) -> Result<()> {
        if self.locks.iter().any(|(r, _)| *r == region) {
            Ok(())
        } else {
            Err(Error::Database(format!("{region:?} accessed without a lock")))
        }
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.fail == Some(point) {
            return Err(Error::Database(format!("injected {point:?} failure")));
        }
        Ok(())
    }
}

impl PassScope for MemoryPass<'_> {
    fn lock(&mut self, regions: &[(StorageRegion, LockMode)]) -> Result<()> {
        trace!(?regions, "Locking regions");
        self.locks.extend_from_slice(regions);
        Ok(())
    }

    fn load_participants(&mut self) -> Result<Vec<Participant>> {
        self.ensure_locked(StorageRegion::Holdings)?;
        self.ensure_locked(StorageRegion::ParticipantFinance)?;
        self.check(FailPoint::Load)?;
        Ok(self.state.participants.clone())
    }

    fn load_edges(&mut self) -> Result<Vec<OwnershipEdge>> {
        self.ensure_locked(StorageRegion::Holdings)?;
        self.check(FailPoint::Load)?;
        Ok(self.state.edges.clone())
    }

    fn apply(&mut self, update: &ValuationUpdate) -> Result<()> {
        for region in [
            StorageRegion::LeaderInstruments,
            StorageRegion::ParticipantFinance,
        ] {
            if !self
                .locks
                .iter()
                .any(|&(r, mode)| r == region && mode == LockMode::Write)
            {
                return Err(Error::Database(format!("{region:?} written without a write lock")));
            }
        }
        self.check(FailPoint::Apply)?;
        self.staged = Some(update.clone());
        Ok(())
    }
}

impl ValuationStore for MemoryStore {
    fn with_pass<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut dyn PassScope) -> Result<T>,
    {
        let mut state = self.state.lock();
        let fail = state.fail_next.take();

        let (result, locks, staged) = {
            let mut pass = MemoryPass {
                state: &state,
                fail,
                locks: Vec::new(),
                staged: None,
            };
            let result = body(&mut pass);
            (result, pass.locks, pass.staged)
        };
        state.last_locks = locks;

        let value = match result {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Memory pass rolled back");
                return Err(e);
            }
        };
        if fail == Some(FailPoint::Commit) {
            return Err(Error::Database("injected Commit failure".to_string()));
        }

        if let Some(update) = staged {
            for valuation in update.valuations {
                state.valuations.insert(valuation.participant_id, valuation);
            }
            for quote in update.quotes {
                state.quotes.insert(quote.instrument_id, quote);
            }
            state.last_valued_at = Some(update.valued_at);
        }
        state.committed_passes += 1;
        Ok(value)
    }
}
