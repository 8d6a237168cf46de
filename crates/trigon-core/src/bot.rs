//! Computer opponent for Trigon.
//!
//! This module provides different difficulty levels:
//! - Easy: Random legal edges
//! - Medium: Greedy scoring without looking at the opponent's reply
//! - Hard: Greedy scoring plus the opponent's best single reply
//!
//! Scoring is one ply deep. For every legal edge it counts the triangles the
//! edge completes, the triangles it leaves one edge short, how many of those
//! the opponent could finish next, and the opponent's best immediate reply.
//! How much each signal matters depends on whether the bot still has edges
//! left to draw this turn.

use crate::actions::{GameAction, GameEvent};
use crate::board::{EdgeKey, PlayerId};
use crate::game::{GameError, GamePhase, MatchState};
use crate::geometry::edges_cross;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Scores this close to the best are treated as ties
const SCORE_TOLERANCE: f64 = 1e-6;

/// Random jitter added to every score
const JITTER: f64 = 1e-7;

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Weight of each move signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub immediate: f64,
    pub setup: f64,
    pub danger: f64,
    pub opponent_reply: f64,
}

/// Scoring weights for both halves of a turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotWeights {
    /// Used while more edges follow this one
    pub building: SignalWeights,
    /// Used for the last edge of the turn
    pub closing: SignalWeights,
    /// Bonus for an edge whose midpoint sits on the centroid
    pub centrality: f64,
}

impl Default for BotWeights {
    fn default() -> Self {
        Self {
            building: SignalWeights {
                immediate: 10.0,
                setup: 3.0,
                danger: 1.0,
                opponent_reply: 1.0,
            },
            closing: SignalWeights {
                immediate: 10.0,
                setup: 1.0,
                danger: 4.0,
                opponent_reply: 5.0,
            },
            centrality: 0.5,
        }
    }
}

/// What one candidate edge would do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSignals {
    /// Triangles the edge completes
    pub immediate: u32,
    /// Triangles left exactly one edge short
    pub setup: u32,
    /// Setup triangles whose last edge stays drawable
    pub danger: u32,
    /// Most triangles a single reply could then complete
    pub opponent_best_reply: u32,
}

/// Board facts shared by every candidate of one decision
struct Position {
    legal: Vec<EdgeKey>,
    legal_set: HashSet<EdgeKey>,
    /// Missing edge of each unowned triangle that lacks exactly one side
    open: HashMap<EdgeKey, u32>,
}

impl Position {
    fn new(game: &MatchState) -> Self {
        let legal = game.legal_moves();
        let legal_set = legal.iter().copied().collect();

        let mut open = HashMap::new();
        for triangle in game.triangles().iter() {
            if game.claims().owner(triangle.id).is_some() {
                continue;
            }
            let mut missing = triangle
                .edges
                .iter()
                .filter(|side| !game.edges().contains(side));
            if let (Some(&edge), None) = (missing.next(), missing.next()) {
                *open.entry(edge).or_insert(0) += 1;
            }
        }

        Self {
            legal,
            legal_set,
            open,
        }
    }

    /// Whether `edge` is still drawable once `drawn` is on the board
    fn open_after(&self, game: &MatchState, edge: EdgeKey, drawn: EdgeKey) -> bool {
        edge != drawn && self.legal_set.contains(&edge) && !edges_cross(game.board(), edge, drawn)
    }

    fn signals(&self, game: &MatchState, candidate: EdgeKey, with_reply: bool) -> MoveSignals {
        let mut immediate = 0;
        let mut setups = Vec::new();

        for &id in game.triangles().triangles_with_edge(candidate) {
            if game.claims().owner(id).is_some() {
                continue;
            }
            let Some(triangle) = game.triangles().get(id) else {
                continue;
            };
            let mut missing = triangle
                .edges
                .iter()
                .copied()
                .filter(|&side| side != candidate && !game.edges().contains(&side));
            match (missing.next(), missing.next()) {
                (None, _) => immediate += 1,
                (Some(edge), None) => setups.push(edge),
                _ => {}
            }
        }

        let danger = setups
            .iter()
            .filter(|&&edge| self.open_after(game, edge, candidate))
            .count() as u32;

        let opponent_best_reply = if with_reply {
            let mut replies: HashMap<EdgeKey, u32> = self
                .open
                .iter()
                .filter(|&(&edge, _)| edge != candidate)
                .map(|(&edge, &count)| (edge, count))
                .collect();
            for &edge in &setups {
                *replies.entry(edge).or_insert(0) += 1;
            }
            replies
                .into_iter()
                .filter(|&(edge, _)| self.open_after(game, edge, candidate))
                .map(|(_, count)| count)
                .max()
                .unwrap_or(0)
        } else {
            0
        };

        MoveSignals {
            immediate,
            setup: setups.len() as u32,
            danger,
            opponent_best_reply,
        }
    }
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub difficulty: BotDifficulty,
    pub weights: BotWeights,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, difficulty: BotDifficulty) -> Self {
        Self {
            player_id,
            difficulty,
            weights: BotWeights::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, difficulty: BotDifficulty, seed: u64) -> Self {
        Self {
            player_id,
            difficulty,
            weights: BotWeights::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next action for this bot, or `None` when it is not the bot's move
    pub fn choose_action(&mut self, game: &MatchState) -> Option<GameAction> {
        if game.current_player() != self.player_id {
            return None;
        }

        match game.phase() {
            GamePhase::AwaitingRoll => Some(GameAction::RollDice),
            GamePhase::Drawing { .. } => {
                let (a, b) = self.choose_move(game)?.endpoints();
                Some(GameAction::DrawEdge { a, b })
            }
            GamePhase::Setup | GamePhase::GameOver { .. } => None,
        }
    }

    /// Pick the edge to draw next
    pub fn choose_move(&mut self, game: &MatchState) -> Option<EdgeKey> {
        match self.difficulty {
            BotDifficulty::Easy => game.legal_moves().choose(&mut self.rng).copied(),
            BotDifficulty::Medium => self.choose_scored(game, false),
            BotDifficulty::Hard => self.choose_scored(game, true),
        }
    }

    /// Play the bot's turn to its end: roll, then draw every rolled edge
    pub fn play_turn(&mut self, game: &mut MatchState) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        while let Some(action) = self.choose_action(game) {
            let step = game.apply_action(self.player_id, action)?;
            let turn_over = step
                .iter()
                .any(|e| matches!(e, GameEvent::TurnEnded { .. } | GameEvent::GameOver { .. }));
            events.extend(step);
            if turn_over {
                break;
            }
        }
        Ok(events)
    }

    fn choose_scored(&mut self, game: &MatchState, with_reply: bool) -> Option<EdgeKey> {
        let position = Position::new(game);
        if position.legal.is_empty() {
            return None;
        }

        let weights = if game.remaining() > 1 {
            self.weights.building
        } else {
            self.weights.closing
        };
        let board = game.board();
        let centroid = board.centroid();
        let radius = board.radius();

        let scored: Vec<(EdgeKey, f64)> = position
            .legal
            .iter()
            .map(|&edge| {
                let signals = position.signals(game, edge, with_reply);
                let mut score = weights.immediate * f64::from(signals.immediate)
                    + weights.setup * f64::from(signals.setup)
                    - weights.danger * f64::from(signals.danger)
                    - weights.opponent_reply * f64::from(signals.opponent_best_reply);
                if radius > 0.0 {
                    if let Some((p, q)) = board.segment(edge) {
                        let offset = p.midpoint(&q).distance_to(&centroid) / radius;
                        score += self.weights.centrality * (1.0 - offset);
                    }
                }
                score += self.rng.gen::<f64>() * JITTER;
                (edge, score)
            })
            .collect();

        let best = scored
            .iter()
            .map(|&(_, score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        let top: Vec<EdgeKey> = scored
            .iter()
            .filter(|&&(_, score)| best - score <= SCORE_TOLERANCE)
            .map(|&(edge, _)| edge)
            .collect();

        let choice = top.choose(&mut self.rng).copied();
        trace!(
            player = self.player_id,
            candidates = scored.len(),
            tied = top.len(),
            best,
            ?choice,
            "bot move"
        );
        choice
    }
}
