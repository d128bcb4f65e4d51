//! Ownership edges between followers and leaders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::ParticipantId;

/// A follower's holding of shares in a leader's instrument.
///
/// The fields are private so that every edge passes through
/// [`OwnershipEdge::try_new`]: shares are strictly positive and the follower
/// is never the leader itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipEdge {
    follower: ParticipantId,
    leader: ParticipantId,
    shares: Decimal,
}

impl OwnershipEdge {
    /// Create a validated ownership edge.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SelfHolding`] if `follower == leader` and
    /// [`DomainError::NonPositiveShares`] if `shares <= 0`.
    pub fn try_new(
        follower: ParticipantId,
        leader: ParticipantId,
        shares: Decimal,
    ) -> Result<Self, DomainError> {
        if follower == leader {
            return Err(DomainError::SelfHolding {
                participant: follower,
            });
        }
        if shares <= Decimal::ZERO {
            return Err(DomainError::NonPositiveShares {
                follower,
                leader,
                shares,
            });
        }
        Ok(Self {
            follower,
            leader,
            shares,
        })
    }

    #[must_use]
    pub const fn follower(&self) -> ParticipantId {
        self.follower
    }

    #[must_use]
    pub const fn leader(&self) -> ParticipantId {
        self.leader
    }

    #[must_use]
    pub const fn shares(&self) -> Decimal {
        self.shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn id(raw: i64) -> ParticipantId {
        ParticipantId::new(raw)
    }

    #[test]
    fn accepts_positive_holding() {
        let edge = OwnershipEdge::try_new(id(1), id(2), dec!(20)).unwrap();
        assert_eq!(edge.follower(), id(1));
        assert_eq!(edge.leader(), id(2));
        assert_eq!(edge.shares(), dec!(20));
    }

    #[test]
    fn rejects_self_holding() {
        let result = OwnershipEdge::try_new(id(3), id(3), dec!(5));
        assert_eq!(
            result,
            Err(DomainError::SelfHolding { participant: id(3) })
        );
    }

    #[test]
    fn rejects_zero_and_negative_shares() {
        assert!(matches!(
            OwnershipEdge::try_new(id(1), id(2), Decimal::ZERO),
            Err(DomainError::NonPositiveShares { .. })
        ));
        assert!(matches!(
            OwnershipEdge::try_new(id(1), id(2), dec!(-1)),
            Err(DomainError::NonPositiveShares { .. })
        ));
    }
}
