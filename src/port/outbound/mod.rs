//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the infrastructure a valuation pass depends on:
//! transactional storage, a dense linear solver, and notifications.

pub mod notifier;
pub mod solver;
pub mod store;
