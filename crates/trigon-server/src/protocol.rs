//! WebSocket protocol messages for Trigon.

use serde::{Deserialize, Serialize};
use trigon_core::{BoardLayout, BotDifficulty, DotId, GameEvent, MatchSnapshot, PlayerId};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Load a board and start a match against the computer
    StartMatch {
        board: BoardLayout,
        player_name: String,
        difficulty: BotDifficulty,
        #[serde(default)]
        computer_first: bool,
        /// Pins dice and computer choices
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Roll the die at the start of the human's turn
    RollDice,

    /// Draw the edge between two dots
    AttemptMove { a: DotId, b: DotId },

    /// Clear the board and start over
    ResetMatch,

    /// Ask for the current snapshot
    RequestState,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the connection's session ID
    Welcome { session_id: Uuid },

    /// Match started
    MatchStarted { state: MatchSnapshot },

    /// Match state updated
    State { state: MatchSnapshot },

    /// Outcome of the human's action
    ActionResult {
        success: bool,
        events: Vec<GameEvent>,
        error: Option<String>,
    },

    /// The computer took one step of its turn
    ComputerAction { events: Vec<GameEvent> },

    /// Seat to move changed
    TurnChanged { player_id: PlayerId, is_computer: bool },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,

    /// Match finished; `winner` is `None` on a tie
    GameOver {
        winner: Option<PlayerId>,
        winner_name: Option<String>,
        scores: Vec<u32>,
    },
}
