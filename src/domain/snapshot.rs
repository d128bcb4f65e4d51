//! Validated holdings snapshot for one valuation pass.
//!
//! A [`HoldingsSnapshot`] is the Graph Loader's output: every participant of
//! the pass with a dense index, plus the ownership edges between them. It is
//! built once per pass and dropped with it, so no lookup table outlives the
//! pass that created it.

use std::collections::HashMap;

use super::edge::OwnershipEdge;
use super::error::DomainError;
use super::id::ParticipantId;
use super::participant::Participant;

/// Participants and ownership edges read at the start of a pass.
///
/// Participants are kept in ascending id order and edges in ascending
/// `(follower, leader)` order, so two snapshots of the same data lay out
/// identically regardless of the order storage returned rows in.
#[derive(Debug, Clone, Default)]
pub struct HoldingsSnapshot {
    participants: Vec<Participant>,
    edges: Vec<OwnershipEdge>,
    index: HashMap<ParticipantId, usize>,
}

impl HoldingsSnapshot {
    /// Build and validate a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if a participant id appears twice, or if an
    /// edge references a participant that is absent or that owns no
    /// instrument.
    pub fn try_new(
        mut participants: Vec<Participant>,
        mut edges: Vec<OwnershipEdge>,
    ) -> Result<Self, DomainError> {
        participants.sort_by_key(|p| p.id);

        let mut index = HashMap::with_capacity(participants.len());
        for (i, participant) in participants.iter().enumerate() {
            if index.insert(participant.id, i).is_some() {
                return Err(DomainError::DuplicateParticipant {
                    participant: participant.id,
                });
            }
        }

        for edge in &edges {
            let (follower, leader) = (edge.follower(), edge.leader());
            if !index.contains_key(&follower) {
                return Err(DomainError::UnknownParticipant {
                    follower,
                    leader,
                    missing: follower,
                });
            }
            let Some(&leader_idx) = index.get(&leader) else {
                return Err(DomainError::UnknownParticipant {
                    follower,
                    leader,
                    missing: leader,
                });
            };
            if !participants[leader_idx].is_leader() {
                return Err(DomainError::NotALeader { follower, leader });
            }
        }

        edges.sort_by_key(|e| (e.follower(), e.leader()));

        Ok(Self {
            participants,
            edges,
            index,
        })
    }

    /// All participants, in ascending id order.
    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// All ownership edges, in ascending `(follower, leader)` order.
    #[must_use]
    pub fn edges(&self) -> &[OwnershipEdge] {
        &self.edges
    }

    /// Edges held by `follower`, in ascending leader order.
    #[must_use]
    pub fn edges_from(&self, follower: ParticipantId) -> &[OwnershipEdge] {
        let start = self.edges.partition_point(|e| e.follower() < follower);
        let end = self.edges.partition_point(|e| e.follower() <= follower);
        &self.edges[start..end]
    }

    /// Dense index of a participant.
    #[must_use]
    pub fn index_of(&self, id: ParticipantId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Participant at a dense index.
    #[must_use]
    pub fn participant(&self, idx: usize) -> &Participant {
        &self.participants[idx]
    }

    /// Number of participants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the pass has nothing to value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Number of participants that own a leader instrument.
    #[must_use]
    pub fn leader_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_leader()).count()
    }

    /// Edges as dense `(follower, leader)` index pairs.
    pub fn indexed_edges(&self) -> impl Iterator<Item = (usize, usize, &OwnershipEdge)> + '_ {
        self.edges.iter().map(move |edge| {
            // Both ends were checked in `try_new`.
            let follower = self.index[&edge.follower()];
            let leader = self.index[&edge.leader()];
            (follower, leader, edge)
        })
    }
}
