//! Solver implementations for dense linear systems.
//!
//! Implements the `port::LinearSolver` trait with concrete backends.

pub mod lu;

pub use lu::{LuSolver, DEFAULT_SINGULAR_TOLERANCE};
