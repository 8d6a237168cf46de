//! Core game state machine.
//!
//! This module contains `MatchState`, which owns everything that changes
//! during a match (drawn edges, triangle owners, scores, turn and dice
//! state) and enforces the turn cycle:
//!
//! `Setup -> AwaitingRoll -> Drawing { remaining } -> AwaitingRoll (next player)`,
//! repeating until `GameOver`.
//!
//! Every transition first makes sure a legal move still exists; if none
//! does the match ends, whoever's turn it is.

use crate::actions::{GameAction, GameEvent};
use crate::board::{BoardGraph, DotId, EdgeKey, PlayerId};
use crate::claims::{resolve_claims, TriangleClaims};
use crate::edges::{DrawnEdge, EdgeSet};
use crate::feasibility::{self, FeasibilityReport, DEFAULT_TRIALS, MAX_DEPTH};
use crate::legality::{self, IllegalMove};
use crate::player::{Player, PlayerSpec};
use crate::triangles::{TriangleId, TriangleIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Number of seats in a match
pub const PLAYER_COUNT: usize = 2;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Board loaded, players not seated yet
    Setup,

    /// Current player must roll before drawing
    AwaitingRoll,

    /// Current player is drawing the edges they rolled
    Drawing {
        /// Edges still to draw this turn
        remaining: u8,
    },

    /// No legal move remains. `winner` is `None` on a tie.
    GameOver { winner: Option<PlayerId> },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("A match needs exactly 2 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("Game is over")]
    GameOver,
}

/// Rule knobs for a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Highest die face (1..=6)
    pub max_dice: u8,
    /// Greedy trials the feasibility estimate runs per roll
    pub feasibility_trials: u32,
    /// A player who claimed a triangle during the turn rolls again
    pub extra_turn_on_capture: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_dice: MAX_DEPTH,
            feasibility_trials: DEFAULT_TRIALS,
            extra_turn_on_capture: false,
        }
    }
}

/// The most recent accepted draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub player: PlayerId,
    pub edge: EdgeKey,
    /// Triangles this draw claimed (possibly none)
    pub claimed: Vec<TriangleId>,
}

/// A triangle as the presentation layer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleView {
    pub id: TriangleId,
    pub dots: [DotId; 3],
    pub owner: Option<PlayerId>,
}

/// Read-only copy of everything a UI needs to draw the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub dice_roll: Option<u8>,
    pub remaining: u8,
    pub players: Vec<Player>,
    pub edges: Vec<DrawnEdge>,
    pub triangles: Vec<TriangleView>,
    pub claim_order: Vec<TriangleId>,
    pub last_move: Option<LastMove>,
}

/// Everything that changes during a match, plus the board it is played on
#[derive(Debug, Clone)]
pub struct MatchState {
    board: BoardGraph,
    triangles: TriangleIndex,
    edges: EdgeSet,
    claims: TriangleClaims,
    players: Vec<Player>,
    current_player: PlayerId,
    /// Turn number (starts at 1 once play begins)
    turn_number: u32,
    dice_roll: Option<u8>,
    phase: GamePhase,
    last_move: Option<LastMove>,
    /// Whether the current player claimed anything this turn
    captured_this_turn: bool,
    config: RuleConfig,
    /// Drives dice and feasibility trials
    rng: StdRng,
}

impl MatchState {
    /// Load a board; play starts with [`MatchState::start_match`]
    pub fn new(board: BoardGraph, config: RuleConfig) -> Self {
        Self::with_rng(board, config, StdRng::from_entropy())
    }

    /// Same as [`MatchState::new`] with a pinned random source
    pub fn with_seed(board: BoardGraph, config: RuleConfig, seed: u64) -> Self {
        Self::with_rng(board, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(board: BoardGraph, config: RuleConfig, rng: StdRng) -> Self {
        let triangles = TriangleIndex::build(&board);
        let claims = TriangleClaims::new(triangles.len());
        debug!(
            dots = board.dot_count(),
            edges = board.potential_edges().len(),
            triangles = triangles.len(),
            "board loaded"
        );

        Self {
            board,
            triangles,
            edges: EdgeSet::new(),
            claims,
            players: Vec::new(),
            current_player: 0,
            turn_number: 0,
            dice_roll: None,
            phase: GamePhase::Setup,
            last_move: None,
            captured_this_turn: false,
            config,
            rng,
        }
    }

    // ==================== Queries ====================

    pub fn board(&self) -> &BoardGraph {
        &self.board
    }

    pub fn triangles(&self) -> &TriangleIndex {
        &self.triangles
    }

    pub fn edges(&self) -> &EdgeSet {
        &self.edges
    }

    pub fn claims(&self) -> &TriangleClaims {
        &self.claims
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by ID
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn dice_roll(&self) -> Option<u8> {
        self.dice_roll
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn last_move(&self) -> Option<&LastMove> {
        self.last_move.as_ref()
    }

    /// Edges left to draw this turn (0 outside the drawing phase)
    pub fn remaining(&self) -> u8 {
        match self.phase {
            GamePhase::Drawing { remaining } => remaining,
            _ => 0,
        }
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver { .. })
    }

    /// Get the winner if the game is finished and not tied
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::GameOver { winner } => winner,
            _ => None,
        }
    }

    /// Scores in seat order
    pub fn scores(&self) -> Vec<u32> {
        self.players.iter().map(|p| p.score).collect()
    }

    /// Every legal move right now
    pub fn legal_moves(&self) -> Vec<EdgeKey> {
        legality::legal_moves(&self.board, &self.edges)
    }

    pub fn is_legal(&self, a: DotId, b: DotId) -> bool {
        legality::is_legal(&self.board, &self.edges, a, b)
    }

    pub fn has_legal_move(&self) -> bool {
        legality::has_legal_move(&self.board, &self.edges)
    }

    /// Run the feasibility estimate against the current edges
    pub fn feasibility(&mut self) -> FeasibilityReport {
        feasibility::estimate(
            &self.board,
            &self.edges,
            self.config.max_dice.clamp(1, MAX_DEPTH),
            self.config.feasibility_trials,
            &mut self.rng,
        )
    }

    /// Read-only copy for the presentation layer
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.phase,
            current_player: self.current_player,
            turn_number: self.turn_number,
            dice_roll: self.dice_roll,
            remaining: self.remaining(),
            players: self.players.clone(),
            edges: self.edges.drawn(),
            triangles: self
                .triangles
                .iter()
                .map(|t| TriangleView {
                    id: t.id,
                    dots: t.dots,
                    owner: self.claims.owner(t.id),
                })
                .collect(),
            claim_order: self.claims.claim_order().to_vec(),
            last_move: self.last_move.clone(),
        }
    }

    // ==================== Actions ====================

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match action {
            GameAction::StartMatch(players) => self.start_match(players),
            GameAction::RollDice => self.roll_dice(player),
            GameAction::DrawEdge { a, b } => self.attempt_move(player, a, b),
            GameAction::ResetMatch => Ok(self.reset_match()),
        }
    }

    /// Seat the players and begin play with the first seat to move
    pub fn start_match(&mut self, players: Vec<PlayerSpec>) -> Result<Vec<GameEvent>, GameError> {
        if matches!(
            self.phase,
            GamePhase::AwaitingRoll | GamePhase::Drawing { .. }
        ) {
            return Err(GameError::InvalidPhase);
        }
        if players.len() != PLAYER_COUNT {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }

        self.players = players
            .into_iter()
            .enumerate()
            .map(|(i, spec)| Player::new(i as PlayerId, spec))
            .collect();

        Ok(self.begin_play(GameEvent::MatchStarted { first_player: 0 }))
    }

    /// Clear the board and restart with the same players
    pub fn reset_match(&mut self) -> Vec<GameEvent> {
        if self.players.is_empty() {
            self.edges.clear();
            self.claims.clear();
            self.phase = GamePhase::Setup;
            return vec![GameEvent::MatchReset];
        }
        self.begin_play(GameEvent::MatchReset)
    }

    /// Roll the die, capped by how many edges can actually be drawn in a row
    pub fn roll_dice(&mut self, player: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.require_turn(player)?;
        if self.phase != GamePhase::AwaitingRoll {
            return Err(GameError::InvalidPhase);
        }

        let mut events = Vec::new();
        let report = self.feasibility();
        let cap = report.best_run.min(self.config.max_dice.clamp(1, MAX_DEPTH));

        if cap == 0 {
            // Nothing drawable: show the lowest face, then end the match
            self.dice_roll = Some(1);
            events.push(GameEvent::DiceRolled {
                player,
                value: 1,
                cap,
            });
            events.push(self.finish());
            return Ok(events);
        }

        let value = self.rng.gen_range(1..=cap);
        self.dice_roll = Some(value);
        self.captured_this_turn = false;
        self.phase = GamePhase::Drawing { remaining: value };
        debug!(player, value, cap, turn = self.turn_number, "dice rolled");

        events.push(GameEvent::DiceRolled { player, value, cap });
        Ok(events)
    }

    /// Draw the edge between `a` and `b` for the current player
    pub fn attempt_move(
        &mut self,
        player: PlayerId,
        a: DotId,
        b: DotId,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.require_turn(player)?;
        let GamePhase::Drawing { remaining } = self.phase else {
            return Err(GameError::InvalidPhase);
        };

        if !self.has_legal_move() {
            self.finish();
            return Err(GameError::GameOver);
        }

        let edge = legality::check_move(&self.board, &self.edges, a, b)?;
        Ok(self.commit_edge(player, edge, remaining))
    }

    // ==================== Internals ====================

    fn require_turn(&self, player: PlayerId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::GameOver { .. } => Err(GameError::GameOver),
            GamePhase::Setup => Err(GameError::InvalidPhase),
            _ if player != self.current_player => Err(GameError::NotYourTurn),
            _ => Ok(()),
        }
    }

    /// Draw, claim, score, then spend one edge of the budget, as one step
    fn commit_edge(&mut self, player: PlayerId, edge: EdgeKey, remaining: u8) -> Vec<GameEvent> {
        let mut events = Vec::new();

        let inserted = self.edges.insert(edge, player);
        debug_assert!(inserted, "edge {edge} drawn twice");
        if !inserted {
            error!(%edge, player, "duplicate edge insertion ignored");
            return events;
        }

        let claimed = resolve_claims(&self.triangles, &self.edges, &mut self.claims, edge, player);
        let remaining = remaining.saturating_sub(1);
        debug!(player, %edge, remaining, claimed = claimed.len(), "edge drawn");
        events.push(GameEvent::EdgeDrawn {
            player,
            edge,
            remaining,
        });

        if !claimed.is_empty() {
            self.captured_this_turn = true;
            if let Some(p) = self.players.get_mut(player as usize) {
                p.score += claimed.len() as u32;
                events.push(GameEvent::TrianglesClaimed {
                    player,
                    triangles: claimed.clone(),
                    score: p.score,
                });
            }
        }
        self.last_move = Some(LastMove {
            player,
            edge,
            claimed,
        });

        if !self.has_legal_move() {
            events.push(self.finish());
        } else if remaining == 0 {
            events.push(self.end_turn());
        } else {
            self.phase = GamePhase::Drawing { remaining };
        }

        events
    }

    fn end_turn(&mut self) -> GameEvent {
        let player = self.current_player;
        let next_player = if self.config.extra_turn_on_capture && self.captured_this_turn {
            player
        } else {
            ((player as usize + 1) % self.players.len()) as PlayerId
        };

        self.current_player = next_player;
        self.turn_number += 1;
        self.dice_roll = None;
        self.captured_this_turn = false;
        self.phase = GamePhase::AwaitingRoll;
        debug!(player, next_player, turn = self.turn_number, "turn ended");

        GameEvent::TurnEnded {
            player,
            next_player,
        }
    }

    fn finish(&mut self) -> GameEvent {
        let winner = self.leader();
        self.phase = GamePhase::GameOver { winner };
        debug!(?winner, scores = ?self.scores(), "game over");

        GameEvent::GameOver {
            winner,
            scores: self.scores(),
        }
    }

    /// Highest scorer, or `None` if the top score is shared
    fn leader(&self) -> Option<PlayerId> {
        let best = self.players.iter().map(|p| p.score).max()?;
        let mut leaders = self.players.iter().filter(|p| p.score == best);
        match (leaders.next(), leaders.next()) {
            (Some(p), None) => Some(p.id),
            _ => None,
        }
    }

    fn begin_play(&mut self, first_event: GameEvent) -> Vec<GameEvent> {
        self.edges.clear();
        self.claims.clear();
        for player in &mut self.players {
            player.score = 0;
        }
        self.current_player = 0;
        self.turn_number = 1;
        self.dice_roll = None;
        self.last_move = None;
        self.captured_this_turn = false;
        self.phase = GamePhase::AwaitingRoll;

        let mut events = vec![first_event];
        if !self.has_legal_move() {
            events.push(self.finish());
        }
        events
    }
}
