//! Persistence port for valuation passes.
//!
//! A pass reads a consistent snapshot of holdings and writes back derived
//! prices in one transaction. The store owns the transaction; the pass body
//! runs inside it through [`ValuationStore::with_pass`] and only sees the
//! narrow [`PassScope`] interface.

use crate::domain::{edge::OwnershipEdge, participant::Participant, valuation::ValuationUpdate};
use crate::error::Result;

/// Named storage region a pass locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageRegion {
    /// Participants' positions in external assets and leader instruments.
    Holdings,
    /// Leader instrument prices and tradable volume.
    LeaderInstruments,
    /// Participants' cash, provisions and gross totals.
    ParticipantFinance,
}

/// Lock strength requested for a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Read,
    Write,
}

/// Locks every valuation pass holds for its whole duration.
pub const PASS_LOCKS: [(StorageRegion, LockMode); 3] = [
    (StorageRegion::Holdings, LockMode::Read),
    (StorageRegion::LeaderInstruments, LockMode::Write),
    (StorageRegion::ParticipantFinance, LockMode::Write),
];

/// Operations available inside one open pass transaction.
pub trait PassScope {
    /// Acquire locks on the named regions. Locks are released together when
    /// the transaction commits or rolls back.
    fn lock(&mut self, regions: &[(StorageRegion, LockMode)]) -> Result<()>;

    /// Every participant that holds any position or is a leader, with
    /// external holdings valued at bid and at ask.
    fn load_participants(&mut self) -> Result<Vec<Participant>>;

    /// Every follower → leader ownership edge. Self-holdings are excluded.
    fn load_edges(&mut self) -> Result<Vec<OwnershipEdge>>;

    /// Stage all derived values. Nothing becomes visible before commit.
    fn apply(&mut self, update: &ValuationUpdate) -> Result<()>;
}

/// Transactional storage for valuation passes.
pub trait ValuationStore: Send + Sync {
    /// Run `body` inside one exclusive transaction.
    ///
    /// Commits when `body` returns `Ok` and rolls back when it returns `Err`;
    /// in both cases every lock acquired through the scope is released
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `body`, or a storage error if the
    /// transaction cannot be opened or committed.
    fn with_pass<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce(&mut dyn PassScope) -> Result<T>;
}
