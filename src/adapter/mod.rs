//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - The command line that drives valuation passes
//! - [`outbound`] - Storage backends and the linear solver

pub mod inbound;
pub mod outbound;
