//! Board graph: dots, their positions, and the potential edges between them.
//!
//! This module contains:
//! - Identifier types for dots and players
//! - `Point` positions and the canonical `EdgeKey`
//! - `BoardGraph`, the immutable point/adjacency structure every other
//!   component queries
//!
//! Boards come from an external generator (lattice tiling, masked polygon,
//! sampled outline). The engine only relies on the contract checked by
//! [`BoardGraph::new`]: unique ids, finite positions, no self-loops, no
//! duplicate neighbor entries, and symmetric adjacency.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Dot identifier, unique within a board
pub type DotId = u32;

/// Player identifier (0 or 1 in a two-player match)
pub type PlayerId = u8;

/// A 2D position in board coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Point halfway between this one and another
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Canonical key of an undirected edge: the smaller dot id always comes first.
///
/// Serialized as a two-element array; deserialization canonicalizes the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(DotId, DotId)", into = "(DotId, DotId)")]
pub struct EdgeKey {
    lo: DotId,
    hi: DotId,
}

impl EdgeKey {
    /// Build the canonical key for the pair `(a, b)` in either order
    pub fn new(a: DotId, b: DotId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Smaller endpoint
    pub fn lo(&self) -> DotId {
        self.lo
    }

    /// Larger endpoint
    pub fn hi(&self) -> DotId {
        self.hi
    }

    /// Both endpoints, smaller first
    pub fn endpoints(&self) -> (DotId, DotId) {
        (self.lo, self.hi)
    }

    /// Whether `dot` is one of the endpoints
    pub fn contains(&self, dot: DotId) -> bool {
        self.lo == dot || self.hi == dot
    }

    /// Whether the two edges meet at a common dot
    pub fn shares_endpoint(&self, other: &EdgeKey) -> bool {
        self.contains(other.lo) || self.contains(other.hi)
    }
}

impl From<(DotId, DotId)> for EdgeKey {
    fn from((a, b): (DotId, DotId)) -> Self {
        EdgeKey::new(a, b)
    }
}

impl From<EdgeKey> for (DotId, DotId) {
    fn from(key: EdgeKey) -> Self {
        key.endpoints()
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

/// A graph vertex with a position and its neighbor ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// Unique identifier
    pub id: DotId,
    /// Position as produced by the board generator
    pub position: Point,
    /// Ids of the dots this one may be joined to (order irrelevant)
    pub neighbors: Vec<DotId>,
}

impl Dot {
    /// Create a dot without neighbors
    pub fn new(id: DotId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
            neighbors: Vec::new(),
        }
    }
}

/// Ways a supplied board can break the graph contract
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Dot {0} appears more than once")]
    DuplicateDot(DotId),

    #[error("Dot {0} has a non-finite position")]
    NonFinitePosition(DotId),

    #[error("Dot {0} lists itself as a neighbor")]
    SelfLoop(DotId),

    #[error("Dot {dot} lists neighbor {neighbor} more than once")]
    DuplicateNeighbor { dot: DotId, neighbor: DotId },

    #[error("Dot {dot} lists unknown neighbor {neighbor}")]
    UnknownNeighbor { dot: DotId, neighbor: DotId },

    #[error("Dot {dot} lists {neighbor} but {neighbor} does not list {dot}")]
    AsymmetricNeighbor { dot: DotId, neighbor: DotId },
}

/// Wire form of a board: just the dots, as a generator hands them over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardLayout {
    pub dots: Vec<Dot>,
}

/// The immutable board graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BoardLayout", into = "BoardLayout")]
pub struct BoardGraph {
    /// Dots in the order the generator supplied them
    dots: Vec<Dot>,
    /// Dot id -> position in `dots`
    index: HashMap<DotId, usize>,
    /// Positions scaled so the larger bounding-box side is 1.0
    unit_positions: Vec<Point>,
    /// Every neighbor pair once, sorted
    potential_edges: Vec<EdgeKey>,
    potential_set: HashSet<EdgeKey>,
    /// Mean of the unit positions
    centroid: Point,
}

impl BoardGraph {
    /// Validate the graph contract and build the board
    pub fn new(dots: Vec<Dot>) -> Result<Self, BoardError> {
        let mut index = HashMap::with_capacity(dots.len());
        for (i, dot) in dots.iter().enumerate() {
            if !dot.position.is_finite() {
                return Err(BoardError::NonFinitePosition(dot.id));
            }
            if index.insert(dot.id, i).is_some() {
                return Err(BoardError::DuplicateDot(dot.id));
            }
        }

        let mut potential_set = HashSet::new();
        for dot in &dots {
            let mut seen = HashSet::with_capacity(dot.neighbors.len());
            for &neighbor in &dot.neighbors {
                if neighbor == dot.id {
                    return Err(BoardError::SelfLoop(dot.id));
                }
                if !seen.insert(neighbor) {
                    return Err(BoardError::DuplicateNeighbor {
                        dot: dot.id,
                        neighbor,
                    });
                }
                let other = index
                    .get(&neighbor)
                    .map(|&i| &dots[i])
                    .ok_or(BoardError::UnknownNeighbor {
                        dot: dot.id,
                        neighbor,
                    })?;
                if !other.neighbors.contains(&dot.id) {
                    return Err(BoardError::AsymmetricNeighbor {
                        dot: dot.id,
                        neighbor,
                    });
                }
                potential_set.insert(EdgeKey::new(dot.id, neighbor));
            }
        }

        let mut potential_edges: Vec<EdgeKey> = potential_set.iter().copied().collect();
        potential_edges.sort_unstable();

        let unit_positions = normalize(&dots);
        let centroid = if unit_positions.is_empty() {
            Point::default()
        } else {
            let n = unit_positions.len() as f64;
            let (sx, sy) = unit_positions
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Point::new(sx / n, sy / n)
        };

        Ok(Self {
            dots,
            index,
            unit_positions,
            potential_edges,
            potential_set,
            centroid,
        })
    }

    /// Build a board from positioned dots and an undirected edge list.
    ///
    /// Repeated pairs in `pairs` collapse into one neighbor entry.
    pub fn from_edges<I>(points: I, pairs: &[(DotId, DotId)]) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (DotId, Point)>,
    {
        let mut dots: Vec<Dot> = points
            .into_iter()
            .map(|(id, position)| Dot {
                id,
                position,
                neighbors: Vec::new(),
            })
            .collect();
        let slots: HashMap<DotId, usize> =
            dots.iter().enumerate().map(|(i, d)| (d.id, i)).collect();

        for &(a, b) in pairs {
            if a == b {
                return Err(BoardError::SelfLoop(a));
            }
            let ia = *slots.get(&a).ok_or(BoardError::UnknownNeighbor {
                dot: b,
                neighbor: a,
            })?;
            let ib = *slots.get(&b).ok_or(BoardError::UnknownNeighbor {
                dot: a,
                neighbor: b,
            })?;
            if !dots[ia].neighbors.contains(&b) {
                dots[ia].neighbors.push(b);
            }
            if !dots[ib].neighbors.contains(&a) {
                dots[ib].neighbors.push(a);
            }
        }

        Self::new(dots)
    }

    // ==================== Query Methods ====================

    /// Number of dots
    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    /// Whether the board has no dots at all
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// All dots in generator order
    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    /// Look up a dot by id
    pub fn dot(&self, id: DotId) -> Option<&Dot> {
        self.index.get(&id).map(|&i| &self.dots[i])
    }

    /// Whether a dot with this id exists
    pub fn contains(&self, id: DotId) -> bool {
        self.index.contains_key(&id)
    }

    /// Neighbor ids of a dot (empty for unknown ids)
    pub fn neighbors(&self, id: DotId) -> &[DotId] {
        self.dot(id).map(|d| d.neighbors.as_slice()).unwrap_or(&[])
    }

    /// Whether `a` and `b` are mutual neighbors
    pub fn are_neighbors(&self, a: DotId, b: DotId) -> bool {
        a != b && self.potential_set.contains(&EdgeKey::new(a, b))
    }

    /// Every potential edge exactly once, sorted by key
    pub fn potential_edges(&self) -> &[EdgeKey] {
        &self.potential_edges
    }

    /// Position in the generator's coordinates
    pub fn position(&self, id: DotId) -> Option<Point> {
        self.dot(id).map(|d| d.position)
    }

    /// Position in normalized board units
    pub fn unit_position(&self, id: DotId) -> Option<Point> {
        self.index.get(&id).map(|&i| self.unit_positions[i])
    }

    /// Endpoints of an edge in normalized board units
    pub fn segment(&self, edge: EdgeKey) -> Option<(Point, Point)> {
        Some((self.unit_position(edge.lo())?, self.unit_position(edge.hi())?))
    }

    /// Centroid of all dots in normalized board units
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Largest distance from the centroid to any dot, in normalized units
    pub fn radius(&self) -> f64 {
        self.unit_positions
            .iter()
            .map(|p| p.distance_to(&self.centroid))
            .fold(0.0, f64::max)
    }
}

impl TryFrom<BoardLayout> for BoardGraph {
    type Error = BoardError;

    fn try_from(layout: BoardLayout) -> Result<Self, Self::Error> {
        BoardGraph::new(layout.dots)
    }
}

impl From<BoardGraph> for BoardLayout {
    fn from(board: BoardGraph) -> Self {
        BoardLayout { dots: board.dots }
    }
}

/// Map positions into the unit box anchored at the bounding-box minimum
fn normalize(dots: &[Dot]) -> Vec<Point> {
    if dots.is_empty() {
        return Vec::new();
    }

    let (min_x, min_y, max_x, max_y) = dots.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(min_x, min_y, max_x, max_y), d| {
            (
                min_x.min(d.position.x),
                min_y.min(d.position.y),
                max_x.max(d.position.x),
                max_y.max(d.position.y),
            )
        },
    );

    // Work in halves so spans near f64::MAX stay finite
    let half = |v: f64| v / 2.0;
    let half_extent = (half(max_x) - half(min_x)).max(half(max_y) - half(min_y));
    // Single dot or all dots stacked on one spot
    let half_extent = if half_extent > f64::EPSILON / 2.0 {
        half_extent
    } else {
        0.5
    };

    dots.iter()
        .map(|d| {
            Point::new(
                (half(d.position.x) - half(min_x)) / half_extent,
                (half(d.position.y) - half(min_y)) / half_extent,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn triangle_board() -> BoardGraph {
        BoardGraph::from_edges(
            [
                (0, Point::new(0.0, 0.0)),
                (1, Point::new(2.0, 0.0)),
                (2, Point::new(1.0, 2.0)),
            ],
            &[(0, 1), (1, 2), (2, 0)],
        )
        .unwrap()
    }

    #[test]
    fn test_edge_key_is_canonical() {
        assert_eq!(EdgeKey::new(5, 2), EdgeKey::new(2, 5));
        assert_eq!(EdgeKey::new(5, 2).endpoints(), (2, 5));
        assert!(EdgeKey::new(1, 2).shares_endpoint(&EdgeKey::new(2, 9)));
        assert!(!EdgeKey::new(1, 2).shares_endpoint(&EdgeKey::new(3, 4)));
    }

    #[test]
    fn test_from_edges_builds_symmetric_lists() {
        let board = triangle_board();
        assert_eq!(board.dot_count(), 3);
        assert_eq!(
            board.potential_edges(),
            &[EdgeKey::new(0, 1), EdgeKey::new(0, 2), EdgeKey::new(1, 2)]
        );
        for dot in board.dots() {
            for &n in &dot.neighbors {
                assert!(board.neighbors(n).contains(&dot.id));
            }
        }
        assert!(board.are_neighbors(2, 0));
        assert!(!board.are_neighbors(0, 0));
    }

    #[test]
    fn test_repeated_pairs_collapse() {
        let board = BoardGraph::from_edges(
            [(0, Point::new(0.0, 0.0)), (1, Point::new(1.0, 0.0))],
            &[(0, 1), (1, 0), (0, 1)],
        )
        .unwrap();
        assert_eq!(board.neighbors(0), &[1]);
        assert_eq!(board.potential_edges().len(), 1);
    }

    #[test]
    fn test_contract_violations_are_rejected() {
        let mut a = Dot::new(0, 0.0, 0.0);
        let mut b = Dot::new(1, 1.0, 0.0);
        a.neighbors.push(1);
        assert_eq!(
            BoardGraph::new(vec![a.clone(), b.clone()]).unwrap_err(),
            BoardError::AsymmetricNeighbor { dot: 0, neighbor: 1 }
        );

        b.neighbors = vec![0, 0];
        assert_eq!(
            BoardGraph::new(vec![a.clone(), b.clone()]).unwrap_err(),
            BoardError::DuplicateNeighbor { dot: 1, neighbor: 0 }
        );

        let mut lonely = Dot::new(7, 0.0, 0.0);
        lonely.neighbors.push(7);
        assert_eq!(
            BoardGraph::new(vec![lonely]).unwrap_err(),
            BoardError::SelfLoop(7)
        );

        a.neighbors = vec![42];
        assert_eq!(
            BoardGraph::new(vec![a]).unwrap_err(),
            BoardError::UnknownNeighbor { dot: 0, neighbor: 42 }
        );

        assert_eq!(
            BoardGraph::new(vec![Dot::new(3, 0.0, 0.0), Dot::new(3, 1.0, 1.0)]).unwrap_err(),
            BoardError::DuplicateDot(3)
        );

        assert_eq!(
            BoardGraph::new(vec![Dot::new(1, f64::NAN, 0.0)]).unwrap_err(),
            BoardError::NonFinitePosition(1)
        );
    }

    #[test]
    fn test_unit_positions_ignore_generator_scale() {
        let small = triangle_board();
        let large = BoardGraph::from_edges(
            [
                (0, Point::new(100.0, 50.0)),
                (1, Point::new(300.0, 50.0)),
                (2, Point::new(200.0, 250.0)),
            ],
            &[(0, 1), (1, 2), (2, 0)],
        )
        .unwrap();

        for id in 0..3 {
            assert_eq!(small.unit_position(id), large.unit_position(id));
        }
        assert_eq!(small.unit_position(1), Some(Point::new(1.0, 0.0)));
        assert_eq!(small.unit_position(2), Some(Point::new(0.5, 1.0)));
    }

    #[test]
    fn test_centroid_and_radius() {
        let board = BoardGraph::from_edges(
            [
                (0, Point::new(0.0, 0.0)),
                (1, Point::new(1.0, 0.0)),
                (2, Point::new(1.0, 1.0)),
                (3, Point::new(0.0, 1.0)),
            ],
            &[(0, 1), (1, 2), (2, 3), (3, 0)],
        )
        .unwrap();
        assert_eq!(board.centroid(), Point::new(0.5, 0.5));
        assert!((board.radius() - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_huge_coordinates_stay_finite() {
        let big = 1e308;
        let board = BoardGraph::from_edges(
            [
                (0, Point::new(-big, -big)),
                (1, Point::new(big, -big)),
                (2, Point::new(big, big)),
                (3, Point::new(-big, big)),
            ],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)],
        )
        .unwrap();

        assert_eq!(board.unit_position(0), Some(Point::new(0.0, 0.0)));
        assert_eq!(board.unit_position(2), Some(Point::new(1.0, 1.0)));
        assert_eq!(board.centroid(), Point::new(0.5, 0.5));
        assert!(board.radius().is_finite());
        assert!(crate::geometry::edges_cross(
            &board,
            EdgeKey::new(0, 2),
            EdgeKey::new(1, 3)
        ));
        assert!(!crate::geometry::edges_cross(
            &board,
            EdgeKey::new(0, 1),
            EdgeKey::new(2, 3)
        ));
    }

    #[test]
    fn test_json_board_goes_through_validation() {
        let board = triangle_board();
        let json = serde_json::to_string(&board).unwrap();
        let parsed: BoardGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.potential_edges(), board.potential_edges());

        let broken = r#"{"dots":[{"id":0,"position":{"x":0.0,"y":0.0},"neighbors":[1]},
                                  {"id":1,"position":{"x":1.0,"y":0.0},"neighbors":[]}]}"#;
        assert!(serde_json::from_str::<BoardGraph>(broken).is_err());
    }
}
