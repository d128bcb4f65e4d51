//! Outbound adapters (driven side).

pub mod memory;
pub mod solver;
pub mod sqlite;
