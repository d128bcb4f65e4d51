//! Component decomposition over the undirected ownership graph.
//!
//! Net worths are only interdependent inside a connected component, so each
//! component is solved as its own linear system instead of one dense system
//! over every participant.

use super::id::ParticipantId;
use super::snapshot::HoldingsSnapshot;

/// Arena-indexed disjoint set with path halving and union by size.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Create `n` singleton sets `0..n`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge the sets containing `a` and `b`. Returns `false` if they were
    /// already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    /// Number of elements in the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

/// A maximal set of participants connected through ownership edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Dense snapshot indices, ascending.
    members: Vec<usize>,
}

impl Component {
    /// Dense snapshot indices of the members, ascending.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Participant ids of the members, ascending.
    #[must_use]
    pub fn participant_ids(&self, snapshot: &HoldingsSnapshot) -> Vec<ParticipantId> {
        self.members
            .iter()
            .map(|&idx| snapshot.participant(idx).id)
            .collect()
    }
}

/// Partition the snapshot's participants into connected components.
///
/// Every participant lands in exactly one component. Components are ordered
/// by their smallest member; because the snapshot is sorted by id, that is
/// also ascending smallest participant id.
#[must_use]
pub fn decompose(snapshot: &HoldingsSnapshot) -> Vec<Component> {
    let n = snapshot.len();
    let mut sets = DisjointSet::new(n);
    for (follower, leader, _) in snapshot.indexed_edges() {
        sets.union(follower, leader);
    }

    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Component> = Vec::new();
    for idx in 0..n {
        let root = sets.find(idx);
        match slot_of_root[root] {
            Some(slot) => components[slot].members.push(idx),
            None => {
                slot_of_root[root] = Some(components.len());
                components.push(Component {
                    members: vec![idx],
                });
            }
        }
    }
    components
}
