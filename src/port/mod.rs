//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (databases, numerical backends, notification sinks).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │                         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Solver  │            │   Store     │              │ Notifier  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`ValuationStore`] / [`PassScope`] - Transactional snapshot read and write-back
//! - [`LinearSolver`] - Dense multi-right-hand-side solve
//! - [`Notifier`] - Valuation and failure events
//! - [`RecomputeValuations`] - The entry point a scheduler drives

pub mod inbound;
pub mod outbound;

pub use inbound::valuation::{PassReport, RecomputeValuations};
pub use outbound::notifier::{
    Event, LogNotifier, Notifier, NotifierRegistry, NullNotifier, PassFailedEvent,
    ValuationChangedEvent,
};
pub use outbound::solver::{LinearSolver, SolveError};
pub use outbound::store::{LockMode, PassScope, StorageRegion, ValuationStore, PASS_LOCKS};
