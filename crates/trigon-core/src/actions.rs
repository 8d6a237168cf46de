//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions.

use crate::board::{DotId, EdgeKey, PlayerId};
use crate::player::PlayerSpec;
use crate::triangles::TriangleId;
use serde::{Deserialize, Serialize};

/// All possible actions a player (or the host) can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Seat the players and start playing
    StartMatch(Vec<PlayerSpec>),
    /// Roll the die at the start of a turn
    RollDice,
    /// Draw the edge between two dots
    DrawEdge { a: DotId, b: DotId },
    /// Clear the board and start over with the same players
    ResetMatch,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Players were seated and play began
    MatchStarted { first_player: PlayerId },

    /// The die was rolled; `cap` is the feasibility cap it was drawn under
    DiceRolled { player: PlayerId, value: u8, cap: u8 },

    /// An edge was drawn
    EdgeDrawn {
        player: PlayerId,
        edge: EdgeKey,
        remaining: u8,
    },

    /// One edge closed one or more triangles
    TrianglesClaimed {
        player: PlayerId,
        triangles: Vec<TriangleId>,
        score: u32,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// No legal move remains. `winner` is `None` on a tie.
    GameOver {
        winner: Option<PlayerId>,
        scores: Vec<u32>,
    },

    /// The board was cleared
    MatchReset,
}
