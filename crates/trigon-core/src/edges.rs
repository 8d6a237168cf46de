//! The set of edges drawn so far in a match.

use crate::board::{EdgeKey, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A drawn edge together with the player who drew it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnEdge {
    pub edge: EdgeKey,
    pub owner: PlayerId,
}

/// Drawn edges keyed by canonical edge key, remembering draw order.
///
/// An edge key is present at most once.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    owners: HashMap<EdgeKey, PlayerId>,
    order: Vec<EdgeKey>,
}

impl EdgeSet {
    /// Create an empty edge set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of drawn edges
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been drawn yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the edge has been drawn
    pub fn contains(&self, edge: &EdgeKey) -> bool {
        self.owners.contains_key(edge)
    }

    /// Who drew the edge, if anyone
    pub fn owner(&self, edge: &EdgeKey) -> Option<PlayerId> {
        self.owners.get(edge).copied()
    }

    /// Record a drawn edge. Returns `false` and leaves the set untouched if
    /// the edge was already present.
    pub fn insert(&mut self, edge: EdgeKey, owner: PlayerId) -> bool {
        if self.owners.contains_key(&edge) {
            return false;
        }
        self.owners.insert(edge, owner);
        self.order.push(edge);
        true
    }

    /// Drawn edge keys, oldest first
    pub fn iter(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.order.iter().copied()
    }

    /// Drawn edges with owners, oldest first
    pub fn drawn(&self) -> Vec<DrawnEdge> {
        self.order
            .iter()
            .filter_map(|&edge| {
                let owner = self.owner(&edge)?;
                Some(DrawnEdge { edge, owner })
            })
            .collect()
    }

    /// Forget every drawn edge
    pub fn clear(&mut self) {
        self.owners.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut edges = EdgeSet::new();
        assert!(edges.insert(EdgeKey::new(1, 2), 0));
        assert!(!edges.insert(EdgeKey::new(2, 1), 1));

        assert_eq!(edges.len(), 1);
        assert_eq!(edges.owner(&EdgeKey::new(1, 2)), Some(0));
    }

    #[test]
    fn test_draw_order_is_kept() {
        let mut edges = EdgeSet::new();
        edges.insert(EdgeKey::new(3, 4), 1);
        edges.insert(EdgeKey::new(0, 1), 0);

        assert_eq!(
            edges.drawn(),
            vec![
                DrawnEdge {
                    edge: EdgeKey::new(3, 4),
                    owner: 1
                },
                DrawnEdge {
                    edge: EdgeKey::new(0, 1),
                    owner: 0
                },
            ]
        );

        edges.clear();
        assert!(edges.is_empty());
        assert!(!edges.contains(&EdgeKey::new(3, 4)));
    }
}
