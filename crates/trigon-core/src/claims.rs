//! Triangle ownership and claim resolution.
//!
//! Ownership only ever moves from unowned to a fixed player. A claim is
//! awarded to whoever draws the last missing side of a triangle.

use crate::board::{EdgeKey, PlayerId};
use crate::edges::EdgeSet;
use crate::triangles::{TriangleId, TriangleIndex};
use tracing::error;

/// Per-triangle owners plus the order claims happened in
#[derive(Debug, Clone, Default)]
pub struct TriangleClaims {
    owners: Vec<Option<PlayerId>>,
    order: Vec<TriangleId>,
}

impl TriangleClaims {
    /// No triangle owned yet
    pub fn new(triangle_count: usize) -> Self {
        Self {
            owners: vec![None; triangle_count],
            order: Vec::new(),
        }
    }

    /// Owner of a triangle, if claimed
    pub fn owner(&self, id: TriangleId) -> Option<PlayerId> {
        self.owners.get(id).copied().flatten()
    }

    /// Assign an owner. Returns `false` without changing anything if the
    /// triangle is unknown or already owned.
    pub fn claim(&mut self, id: TriangleId, owner: PlayerId) -> bool {
        match self.owners.get_mut(id) {
            Some(slot) if slot.is_none() => {
                *slot = Some(owner);
                self.order.push(id);
                true
            }
            _ => false,
        }
    }

    /// How many triangles a player owns
    pub fn owned_by(&self, player: PlayerId) -> usize {
        self.owners.iter().filter(|o| **o == Some(player)).count()
    }

    /// How many triangles have an owner
    pub fn claimed_count(&self) -> usize {
        self.order.len()
    }

    /// Owner of every triangle, in id order
    pub fn owners(&self) -> &[Option<PlayerId>] {
        &self.owners
    }

    /// Triangle ids in the order they were claimed
    pub fn claim_order(&self) -> &[TriangleId] {
        &self.order
    }

    /// Drop every claim
    pub fn clear(&mut self) {
        self.owners.iter_mut().for_each(|o| *o = None);
        self.order.clear();
    }
}

/// Award every triangle completed by the freshly drawn `edge`.
///
/// `edges` must already contain `edge`. Only the triangles that have `edge`
/// as a side are examined; all completed ones go to `owner` in this single
/// pass, in id order.
pub fn resolve_claims(
    index: &TriangleIndex,
    edges: &EdgeSet,
    claims: &mut TriangleClaims,
    edge: EdgeKey,
    owner: PlayerId,
) -> Vec<TriangleId> {
    debug_assert!(edges.contains(&edge), "claims resolved before edge {edge} was drawn");

    let mut claimed = Vec::new();
    for &id in index.triangles_with_edge(edge) {
        if claims.owner(id).is_some() {
            continue;
        }
        let Some(triangle) = index.get(id) else {
            continue;
        };
        if triangle.edges.iter().all(|side| edges.contains(side)) {
            let accepted = claims.claim(id, owner);
            debug_assert!(accepted, "triangle {id} claimed twice");
            if accepted {
                claimed.push(id);
            } else {
                error!(triangle = id, "triangle claim rejected after ownership check");
            }
        }
    }
    claimed
}
