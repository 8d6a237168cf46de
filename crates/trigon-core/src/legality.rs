//! Move legality: may this edge be drawn right now?
//!
//! A move is legal when its dots are mutual neighbors, the edge is not drawn
//! yet, and it crosses no drawn edge. Drawing an edge never makes another
//! edge legal, so a list of legal moves only ever shrinks as play goes on.

use crate::board::{BoardGraph, DotId, EdgeKey};
use crate::edges::EdgeSet;
use crate::geometry::{edges_cross, first_crossing};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a requested edge cannot be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IllegalMove {
    #[error("Dot {0} is not on the board")]
    UnknownDot(DotId),

    #[error("An edge needs two different dots (got {0} twice)")]
    SameDot(DotId),

    #[error("Dots {a} and {b} are not neighbors")]
    NotNeighbors { a: DotId, b: DotId },

    #[error("Edge {0} is already drawn")]
    AlreadyDrawn(EdgeKey),

    #[error("Edge {candidate} would cross drawn edge {blocking}")]
    Crosses { candidate: EdgeKey, blocking: EdgeKey },
}

/// Validate drawing the edge between `a` and `b`, returning its canonical key
pub fn check_move(
    board: &BoardGraph,
    edges: &EdgeSet,
    a: DotId,
    b: DotId,
) -> Result<EdgeKey, IllegalMove> {
    for dot in [a, b] {
        if !board.contains(dot) {
            return Err(IllegalMove::UnknownDot(dot));
        }
    }
    if a == b {
        return Err(IllegalMove::SameDot(a));
    }
    if !board.are_neighbors(a, b) {
        return Err(IllegalMove::NotNeighbors { a, b });
    }

    let candidate = EdgeKey::new(a, b);
    if edges.contains(&candidate) {
        return Err(IllegalMove::AlreadyDrawn(candidate));
    }
    if let Some(blocking) = first_crossing(board, candidate, edges.iter()) {
        return Err(IllegalMove::Crosses {
            candidate,
            blocking,
        });
    }

    Ok(candidate)
}

/// Whether drawing the edge between `a` and `b` is legal right now
pub fn is_legal(board: &BoardGraph, edges: &EdgeSet, a: DotId, b: DotId) -> bool {
    check_move(board, edges, a, b).is_ok()
}

/// Whether a potential edge of the board is still drawable
fn is_open(board: &BoardGraph, edges: &EdgeSet, edge: EdgeKey) -> bool {
    !edges.contains(&edge) && first_crossing(board, edge, edges.iter()).is_none()
}

/// Every legal move, each unordered pair once. Recomputed on every call.
pub fn legal_moves(board: &BoardGraph, edges: &EdgeSet) -> Vec<EdgeKey> {
    board
        .potential_edges()
        .iter()
        .copied()
        .filter(|&edge| is_open(board, edges, edge))
        .collect()
}

/// Whether at least one legal move exists
pub fn has_legal_move(board: &BoardGraph, edges: &EdgeSet) -> bool {
    board
        .potential_edges()
        .iter()
        .any(|&edge| is_open(board, edges, edge))
}

/// Narrow a list of currently legal moves to those still legal once `drawn` is added.
///
/// Exact because legality is monotone: the only moves lost are `drawn`
/// itself and the ones crossing it.
pub fn retain_legal_after(board: &BoardGraph, candidates: &mut Vec<EdgeKey>, drawn: EdgeKey) {
    candidates.retain(|&edge| edge != drawn && !edges_cross(board, edge, drawn));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;
    use pretty_assertions::assert_eq;

    /// Unit square with both diagonals
    fn crossed_square() -> BoardGraph {
        BoardGraph::from_edges(
            [
                (0, Point::new(0.0, 0.0)),
                (1, Point::new(1.0, 0.0)),
                (2, Point::new(1.0, 1.0)),
                (3, Point::new(0.0, 1.0)),
                (4, Point::new(5.0, 5.0)),
            ],
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2), (1, 3)],
        )
        .unwrap()
    }

    #[test]
    fn test_rejection_reasons() {
        let board = crossed_square();
        let mut edges = EdgeSet::new();
        edges.insert(EdgeKey::new(0, 2), 0);

        assert_eq!(check_move(&board, &edges, 0, 9), Err(IllegalMove::UnknownDot(9)));
        assert_eq!(check_move(&board, &edges, 1, 1), Err(IllegalMove::SameDot(1)));
        assert_eq!(
            check_move(&board, &edges, 0, 4),
            Err(IllegalMove::NotNeighbors { a: 0, b: 4 })
        );
        assert_eq!(
            check_move(&board, &edges, 2, 0),
            Err(IllegalMove::AlreadyDrawn(EdgeKey::new(0, 2)))
        );
        assert_eq!(
            check_move(&board, &edges, 3, 1),
            Err(IllegalMove::Crosses {
                candidate: EdgeKey::new(1, 3),
                blocking: EdgeKey::new(0, 2),
            })
        );
        assert_eq!(check_move(&board, &edges, 1, 0), Ok(EdgeKey::new(0, 1)));
    }

    #[test]
    fn test_legal_moves_exclude_drawn_and_crossing() {
        let board = crossed_square();
        let mut edges = EdgeSet::new();
        assert_eq!(legal_moves(&board, &edges).len(), 6);

        edges.insert(EdgeKey::new(1, 3), 1);
        let legal = legal_moves(&board, &edges);
        assert_eq!(
            legal,
            vec![
                EdgeKey::new(0, 1),
                EdgeKey::new(0, 3),
                EdgeKey::new(1, 2),
                EdgeKey::new(2, 3),
            ]
        );
        assert!(legal.iter().all(|e| !edges.contains(e)));
        assert!(has_legal_move(&board, &edges));
    }

    #[test]
    fn test_retain_matches_recomputation() {
        let board = crossed_square();
        let edges = EdgeSet::new();
        let mut candidates = legal_moves(&board, &edges);

        let drawn = EdgeKey::new(0, 2);
        retain_legal_after(&board, &mut candidates, drawn);

        let mut after = edges.clone();
        after.insert(drawn, 0);
        assert_eq!(candidates, legal_moves(&board, &after));
    }

    #[test]
    fn test_board_without_edges_has_no_moves() {
        let board = BoardGraph::from_edges([(0, Point::new(0.0, 0.0))], &[]).unwrap();
        assert!(legal_moves(&board, &EdgeSet::new()).is_empty());
        assert!(!has_legal_move(&board, &EdgeSet::new()));
    }
}
