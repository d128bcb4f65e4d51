//! Builders for domain primitives used across tests.
//!
//! Leaders built here issue the instrument with the same numeric id as the
//! leader, so `instrument(7)` is the instrument led by `pid(7)`.

use rust_decimal::Decimal;

use crate::domain::{InstrumentId, OwnershipEdge, Participant, ParticipantId};

/// Create a [`ParticipantId`].
pub fn pid(raw: i64) -> ParticipantId {
    ParticipantId::new(raw)
}

/// Create an [`InstrumentId`].
pub fn instrument(raw: i64) -> InstrumentId {
    InstrumentId::new(raw)
}

/// A leader with `cash` and nothing else.
pub fn leader(raw: i64, cash: Decimal) -> Participant {
    Participant::new(pid(raw))
        .with_cash(cash)
        .leading(instrument(raw))
}

/// A non-leader with `cash` and nothing else.
pub fn follower(raw: i64, cash: Decimal) -> Participant {
    Participant::new(pid(raw)).with_cash(cash)
}

/// An ownership edge. Panics on an invalid edge.
pub fn edge(follower: i64, leader: i64, shares: Decimal) -> OwnershipEdge {
    OwnershipEdge::try_new(pid(follower), pid(leader), shares)
        .unwrap_or_else(|e| panic!("invalid test edge: {e}"))
}

/// Two leaders holding each other: 1 holds 10 shares of 2, 2 holds 20
/// shares of 1. With 100 shares per leader the net worths are
/// `X1 = 1_200_000 / 0.98` and `X2 = 2_000_000 + 0.2·X1`.
pub fn mutual_pair() -> (Vec<Participant>, Vec<OwnershipEdge>) {
    (
        vec![
            leader(1, Decimal::from(1_000_000)),
            leader(2, Decimal::from(2_000_000)),
        ],
        vec![
            edge(1, 2, Decimal::from(10)),
            edge(2, 1, Decimal::from(20)),
        ],
    )
}

/// `pairs` independent mutual pairs (ids `2k+1`, `2k+2`) plus `loners`
/// isolated followers starting at id 100_000, each with a small external
/// position.
pub fn many_pairs(pairs: i64, loners: i64) -> (Vec<Participant>, Vec<OwnershipEdge>) {
    let mut participants = Vec::new();
    let mut edges = Vec::new();
    for k in 0..pairs {
        let (a, b) = (2 * k + 1, 2 * k + 2);
        participants.push(leader(a, Decimal::from(1_000_000 + 1_000 * k)));
        participants.push(leader(b, Decimal::from(2_000_000 + 500 * k)));
        edges.push(edge(a, b, Decimal::from(10)));
        edges.push(edge(b, a, Decimal::from(20)));
    }
    for l in 0..loners {
        participants.push(
            follower(100_000 + l, Decimal::from(10 + l))
                .with_external(Decimal::from(l + 1), Decimal::from(l + 2)),
        );
    }
    (participants, edges)
}
