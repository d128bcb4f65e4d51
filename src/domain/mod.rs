//! Ownership graph, linear systems and price derivation.
//!
//! Everything here is pure and scoped to one valuation pass; storage,
//! solving backends and notifications live behind the ports in
//! [`crate::port`].

pub mod component;
pub mod edge;
pub mod error;
pub mod id;
pub mod money;
pub mod participant;
pub mod snapshot;
pub mod system;
pub mod valuation;

pub use component::{decompose, Component, DisjointSet};
pub use edge::OwnershipEdge;
pub use error::DomainError;
pub use id::{InstrumentId, ParticipantId};
pub use money::{Amount, Price, Volume};
pub use participant::Participant;
pub use snapshot::HoldingsSnapshot;
pub use system::{DenseMatrix, LinearSystem, ASK_BASIS, BID_BASIS};
pub use valuation::{
    derive_component, ComponentValuation, LeaderQuote, ParticipantValuation, PricingParams,
    ValuationUpdate,
};
