//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, runtime wiring and periodic scheduling.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`scheduler`] - Interval-driven valuation passes

pub mod bootstrap;
pub mod config;
pub mod scheduler;
