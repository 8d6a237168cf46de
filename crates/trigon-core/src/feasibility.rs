//! How many edges can a player draw in a row this turn without getting stuck?
//!
//! The exact answer is a search over move orders, too expensive to run on
//! every roll. Instead we run a fixed number of randomized greedy trials:
//! each trial draws uniformly random legal edges until it hits the depth cap
//! or runs out of moves, and the longest run wins. Every run is a real
//! sequence of legal draws, so the result never overstates what is
//! achievable. It may understate it, which only makes rolls smaller.

use crate::board::{BoardGraph, EdgeKey};
use crate::edges::EdgeSet;
use crate::legality::{legal_moves, retain_legal_after};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Highest value a die can show, and so the deepest run worth looking for
pub const MAX_DEPTH: u8 = 6;

/// Default number of greedy trials per roll
pub const DEFAULT_TRIALS: u32 = 32;

/// Result of a feasibility estimate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeasibilityReport {
    /// Longest run of sequential legal draws found
    pub best_run: u8,
    /// The draws that achieved `best_run`, in order
    pub witness: Vec<EdgeKey>,
    /// Trials actually run (stops early once the cap is reached)
    pub trials_run: u32,
}

/// Estimate the longest run of legal draws, up to `depth_cap` (at most [`MAX_DEPTH`]).
///
/// `edges` is only read: trials work on a shrinking copy of the legal-move
/// list instead of drawing speculative edges.
pub fn estimate<R: Rng + ?Sized>(
    board: &BoardGraph,
    edges: &EdgeSet,
    depth_cap: u8,
    trials: u32,
    rng: &mut R,
) -> FeasibilityReport {
    let depth_cap = depth_cap.min(MAX_DEPTH);
    let legal = legal_moves(board, edges);
    if legal.is_empty() || depth_cap == 0 {
        return FeasibilityReport::default();
    }

    let mut best: Vec<EdgeKey> = Vec::new();
    let mut trials_run = 0;
    for _ in 0..trials.max(1) {
        trials_run += 1;
        let run = greedy_run(board, legal.clone(), depth_cap, rng);
        if run.len() > best.len() {
            best = run;
        }
        if best.len() >= depth_cap as usize {
            break;
        }
    }

    trace!(
        legal = legal.len(),
        best_run = best.len(),
        trials_run,
        "feasibility estimate"
    );

    FeasibilityReport {
        best_run: best.len() as u8,
        witness: best,
        trials_run,
    }
}

/// One trial: keep drawing random legal edges until stuck or at the cap
fn greedy_run<R: Rng + ?Sized>(
    board: &BoardGraph,
    mut candidates: Vec<EdgeKey>,
    depth_cap: u8,
    rng: &mut R,
) -> Vec<EdgeKey> {
    let mut run = Vec::with_capacity(depth_cap as usize);
    while run.len() < depth_cap as usize && !candidates.is_empty() {
        let pick = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        retain_legal_after(board, &mut candidates, pick);
        run.push(pick);
    }
    run
}

/// Exact longest run by backtracking over every move order.
///
/// Exponential in `depth_cap`; meant for small boards and for checking the
/// estimator, not for live play.
pub fn exhaustive_max_run(board: &BoardGraph, edges: &EdgeSet, depth_cap: u8) -> u8 {
    fn search(board: &BoardGraph, candidates: &[EdgeKey], remaining: u8) -> u8 {
        if remaining == 0 || candidates.is_empty() {
            return 0;
        }
        let mut best = 0;
        for &pick in candidates {
            let mut next = candidates.to_vec();
            retain_legal_after(board, &mut next, pick);
            best = best.max(1 + search(board, &next, remaining - 1));
            if best == remaining {
                break;
            }
        }
        best
    }

    search(board, &legal_moves(board, edges), depth_cap.min(MAX_DEPTH))
}
