//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for participants, edges and sample economies.
//! - [`notifier`] — A [`Notifier`](crate::port::Notifier) that records events.
//! - [`config`] — Canonical test configurations.

pub mod config;
pub mod domain;
pub mod notifier;
