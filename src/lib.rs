//! Valuator - Leader-ownership valuation engine.
//!
//! Values a closed economy in which participants hold cash, external assets
//! and shares of leader instruments. A leader's instrument is backed by the
//! leader's net worth, and that net worth includes the instruments the
//! leader holds, so ownership cycles make the valuation a linear system.
//!
//! # Architecture
//!
//! Each pass snapshots holdings inside one storage transaction, splits the
//! ownership graph into connected components, solves one dense system per
//! component for bid and ask bases, derives leader prices and writes
//! everything back atomically.
//!
//! # Modules
//!
//! - [`domain`] - Participants, edges, components, linear systems, pricing
//! - [`port`] - Store, solver and notifier traits
//! - [`application`] - The valuation pass
//! - [`adapter`] - SQLite and in-memory stores, LU solver, CLI
//! - [`infrastructure`] - Configuration, wiring, scheduling
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_decimal_macros::dec;
//! use valuator::adapter::outbound::memory::MemoryStore;
//! use valuator::adapter::outbound::solver::LuSolver;
//! use valuator::application::valuation::{ValuationParams, ValuationService};
//! use valuator::domain::{InstrumentId, Participant, ParticipantId};
//! use valuator::port::{NotifierRegistry, RecomputeValuations};
//!
//! let leader = Participant::new(ParticipantId::new(1))
//!     .with_cash(dec!(2000000))
//!     .leading(InstrumentId::new(1));
//! let store = Arc::new(MemoryStore::new(vec![leader], vec![]));
//! let service = ValuationService::new(
//!     Arc::clone(&store),
//!     Arc::new(LuSolver::default()),
//!     Arc::new(NotifierRegistry::new()),
//!     ValuationParams::default(),
//! );
//!
//! service.recompute_now().unwrap();
//! let quote = store.quote(InstrumentId::new(1)).unwrap();
//! assert_eq!(quote.bid_price, dec!(20000));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
