//! Triangle index: every claimable 3-cycle of the board, built once per board.
//!
//! Triangles get stable integer ids at build time. The inverse map from edge
//! key to triangle ids lets claim checks after a move look only at the
//! triangles touching the new edge.

use crate::board::{BoardGraph, DotId, EdgeKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Index of a triangle in its [`TriangleIndex`]
pub type TriangleId = usize;

/// Three mutually adjacent dots and the three edges joining them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub id: TriangleId,
    /// Dot ids in ascending order
    pub dots: [DotId; 3],
    /// Canonical keys of the three sides
    pub edges: [EdgeKey; 3],
}

impl Triangle {
    fn new(id: TriangleId, dots: [DotId; 3]) -> Self {
        let [a, b, c] = dots;
        Self {
            id,
            dots,
            edges: [EdgeKey::new(a, b), EdgeKey::new(a, c), EdgeKey::new(b, c)],
        }
    }

    /// Whether the edge is one of the three sides
    pub fn has_edge(&self, edge: &EdgeKey) -> bool {
        self.edges.contains(edge)
    }
}

/// All triangles of a board plus the edge -> triangles inverse map
#[derive(Debug, Clone, Default)]
pub struct TriangleIndex {
    triangles: Vec<Triangle>,
    by_edge: HashMap<EdgeKey, Vec<TriangleId>>,
}

impl TriangleIndex {
    /// Enumerate every triangle of the board.
    ///
    /// For each dot, every pair of its neighbors that are themselves neighbors
    /// closes a triangle. Sorted dot triples deduplicate the three discoveries
    /// of each triangle, and their order fixes the ids.
    pub fn build(board: &BoardGraph) -> Self {
        let mut found: BTreeSet<[DotId; 3]> = BTreeSet::new();

        for dot in board.dots() {
            let neighbors = &dot.neighbors;
            for (i, &b) in neighbors.iter().enumerate() {
                for &c in &neighbors[i + 1..] {
                    if board.are_neighbors(b, c) {
                        let mut key = [dot.id, b, c];
                        key.sort_unstable();
                        found.insert(key);
                    }
                }
            }
        }

        let triangles: Vec<Triangle> = found
            .into_iter()
            .enumerate()
            .map(|(id, dots)| Triangle::new(id, dots))
            .collect();

        let mut by_edge: HashMap<EdgeKey, Vec<TriangleId>> = HashMap::new();
        for triangle in &triangles {
            for edge in triangle.edges {
                by_edge.entry(edge).or_default().push(triangle.id);
            }
        }

        Self { triangles, by_edge }
    }

    /// Number of triangles on the board
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the board has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Look up a triangle by id
    pub fn get(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    /// All triangles in id order
    pub fn iter(&self) -> impl Iterator<Item = &Triangle> {
        self.triangles.iter()
    }

    /// Ids of the triangles that have `edge` as a side
    pub fn triangles_with_edge(&self, edge: EdgeKey) -> &[TriangleId] {
        self.by_edge.get(&edge).map(Vec::as_slice).unwrap_or(&[])
    }
}
