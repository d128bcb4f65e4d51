//! Domain validation errors for core domain types.
//!
//! These errors are returned when the holdings graph read from storage
//! violates an ownership invariant. Every variant is a data-integrity
//! problem: the pass that meets one aborts without writing anything.
//!
//! # Examples
//!
//! ```
//! use valuator::domain::edge::OwnershipEdge;
//! use valuator::domain::error::DomainError;
//! use valuator::domain::id::ParticipantId;
//! use rust_decimal_macros::dec;
//!
//! let me = ParticipantId::new(1);
//! let result = OwnershipEdge::try_new(me, me, dec!(10));
//!
//! assert!(matches!(result, Err(DomainError::SelfHolding { .. })));
//! ```

use thiserror::Error;

use super::id::ParticipantId;

/// Errors that occur when ownership invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A leader's position in its own instrument must never become an edge.
    #[error("participant {participant} holds its own instrument")]
    SelfHolding {
        /// The participant that appears on both ends of the edge.
        participant: ParticipantId,
    },

    /// Ownership edges carry a strictly positive share amount.
    #[error("holding of {follower} in {leader} must be positive, got {shares}")]
    NonPositiveShares {
        follower: ParticipantId,
        leader: ParticipantId,
        shares: rust_decimal::Decimal,
    },

    /// An edge names a participant that is absent from the snapshot.
    #[error("edge {follower} -> {leader} references unknown participant {missing}")]
    UnknownParticipant {
        follower: ParticipantId,
        leader: ParticipantId,
        missing: ParticipantId,
    },

    /// An edge points at a participant that owns no leader instrument.
    #[error("edge {follower} -> {leader} targets a participant without an instrument")]
    NotALeader {
        follower: ParticipantId,
        leader: ParticipantId,
    },

    /// Two participants appear more than once in the snapshot.
    #[error("participant {participant} appears more than once in the snapshot")]
    DuplicateParticipant { participant: ParticipantId },

    /// Cash, provisions and external values do not sum within the decimal
    /// range.
    #[error("base value of participant {participant} is out of range")]
    ValueOverflow { participant: ParticipantId },

    /// An edge connects a component member to a participant outside it.
    #[error("edge {follower} -> {leader} escapes its component")]
    EdgeOutsideComponent {
        follower: ParticipantId,
        leader: ParticipantId,
    },
}

impl DomainError {
    /// Participant ids involved in the violation, for diagnostics.
    #[must_use]
    pub fn participants(&self) -> Vec<ParticipantId> {
        match self {
            Self::SelfHolding { participant }
            | Self::DuplicateParticipant { participant }
            | Self::ValueOverflow { participant } => vec![*participant],
            Self::NonPositiveShares {
                follower, leader, ..
            }
            | Self::UnknownParticipant {
                follower, leader, ..
            }
            | Self::NotALeader { follower, leader }
            | Self::EdgeOutsideComponent { follower, leader } => vec![*follower, *leader],
        }
    }
}
