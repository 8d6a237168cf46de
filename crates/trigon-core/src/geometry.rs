//! Segment crossing tests for drawn edges.
//!
//! Edges are straight segments between dot positions. A candidate edge is
//! rejected if it crosses any drawn edge it does not share an endpoint with.
//! Two segments meeting at a shared dot never count as crossing.
//!
//! All tests run on normalized board units (see [`BoardGraph::unit_position`]),
//! so the tolerance below has the same meaning for every board generator.

use crate::board::{BoardGraph, EdgeKey, Point};

/// Tolerance for orientation and containment tests, in normalized board units.
///
/// Orientation values within this distance of zero are treated as collinear,
/// and bounding-box containment is widened by it on every side.
pub const CROSSING_EPSILON: f64 = 1e-9;

/// Turn direction of the ordered triple `(p, q, r)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
    Collinear,
}

/// Classify the ordered triple by the sign of the cross product `(q - p) x (r - p)`
pub fn orientation(p: Point, q: Point, r: Point) -> Orientation {
    let cross = (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    if cross > CROSSING_EPSILON {
        Orientation::CounterClockwise
    } else if cross < -CROSSING_EPSILON {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Whether `r` lies inside the bounding box of segment `p`-`q` (widened by the tolerance).
///
/// Only meaningful when the three points are already known to be collinear.
fn within_box(p: Point, q: Point, r: Point) -> bool {
    r.x <= p.x.max(q.x) + CROSSING_EPSILON
        && r.x >= p.x.min(q.x) - CROSSING_EPSILON
        && r.y <= p.y.max(q.y) + CROSSING_EPSILON
        && r.y >= p.y.min(q.y) - CROSSING_EPSILON
}

/// Whether segments `p1`-`p2` and `q1`-`q2` intersect anywhere, touching included.
///
/// Callers exclude segments that share an endpoint before asking.
pub fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    let strictly_apart = |a: Orientation, b: Orientation| {
        a != Orientation::Collinear && b != Orientation::Collinear && a != b
    };
    if strictly_apart(o1, o2) && strictly_apart(o3, o4) {
        return true;
    }

    // Collinear cases: an endpoint lying on the other segment
    (o1 == Orientation::Collinear && within_box(p1, p2, q1))
        || (o2 == Orientation::Collinear && within_box(p1, p2, q2))
        || (o3 == Orientation::Collinear && within_box(q1, q2, p1))
        || (o4 == Orientation::Collinear && within_box(q1, q2, p2))
}

/// Whether two board edges cross. Edges meeting at a dot never do.
pub fn edges_cross(board: &BoardGraph, a: EdgeKey, b: EdgeKey) -> bool {
    if a.shares_endpoint(&b) {
        return false;
    }
    match (board.segment(a), board.segment(b)) {
        (Some((p1, p2)), Some((q1, q2))) => segments_cross(p1, p2, q1, q2),
        _ => false,
    }
}

/// The first drawn edge the candidate would cross, if any
pub fn first_crossing<I>(board: &BoardGraph, candidate: EdgeKey, existing: I) -> Option<EdgeKey>
where
    I: IntoIterator<Item = EdgeKey>,
{
    existing
        .into_iter()
        .find(|&edge| edges_cross(board, candidate, edge))
}

/// Would drawing `candidate` cross any of `existing`?
pub fn crosses<I>(board: &BoardGraph, candidate: EdgeKey, existing: I) -> bool
where
    I: IntoIterator<Item = EdgeKey>,
{
    first_crossing(board, candidate, existing).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_orientation_signs() {
        assert_eq!(
            orientation(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            orientation(p(0.0, 0.0), p(1.0, 0.0), p(1.0, -1.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            orientation(p(0.0, 0.0), p(1.0, 1.0), p(0.5, 0.5)),
            Orientation::Collinear
        );
    }

    #[test]
    fn test_proper_crossing() {
        assert!(segments_cross(p(0.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(1.0, 0.0)));
    }

    #[test]
    fn test_parallel_segments_do_not_cross() {
        assert!(!segments_cross(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.5), p(1.0, 0.5)));
    }

    #[test]
    fn test_disjoint_collinear_segments() {
        assert!(!segments_cross(p(0.0, 0.0), p(0.3, 0.0), p(0.5, 0.0), p(1.0, 0.0)));
    }

    #[test]
    fn test_collinear_overlap_crosses() {
        assert!(segments_cross(p(0.0, 0.0), p(0.6, 0.0), p(0.4, 0.0), p(1.0, 0.0)));
        // One segment fully inside the other
        assert!(segments_cross(p(0.0, 0.0), p(1.0, 0.0), p(0.2, 0.0), p(0.4, 0.0)));
    }

    #[test]
    fn test_endpoint_on_segment_crosses() {
        // T-junction: q1 sits in the middle of p
        assert!(segments_cross(p(0.0, 0.0), p(1.0, 0.0), p(0.5, 0.0), p(0.5, 1.0)));
    }

    #[test]
    fn test_near_miss_beyond_tolerance() {
        assert!(!segments_cross(p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1e-6), p(0.5, 1.0)));
    }

    #[test]
    fn test_degenerate_segment() {
        // Zero-length segment sitting on another one
        assert!(segments_cross(p(0.5, 0.0), p(0.5, 0.0), p(0.0, 0.0), p(1.0, 0.0)));
        // Zero-length segment away from it
        assert!(!segments_cross(p(0.5, 0.5), p(0.5, 0.5), p(0.0, 0.0), p(1.0, 0.0)));
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        let board = BoardGraph::from_edges(
            [
                (0, p(0.0, 0.0)),
                (1, p(1.0, 0.0)),
                (2, p(1.0, 1.0)),
                (3, p(0.0, 1.0)),
            ],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)],
        )
        .unwrap();

        let diagonal = EdgeKey::new(0, 2);
        assert!(!edges_cross(&board, diagonal, EdgeKey::new(0, 1)));
        assert!(!edges_cross(&board, diagonal, EdgeKey::new(2, 3)));
        assert!(edges_cross(&board, diagonal, EdgeKey::new(1, 3)));

        let drawn = [EdgeKey::new(0, 1), EdgeKey::new(1, 3)];
        assert_eq!(
            first_crossing(&board, diagonal, drawn),
            Some(EdgeKey::new(1, 3))
        );
        assert!(!crosses(&board, EdgeKey::new(2, 3), drawn));
    }
}
