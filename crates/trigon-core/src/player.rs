//! Player identity and score.

use crate::board::PlayerId;
use serde::{Deserialize, Serialize};

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 2 {
            0 => PlayerColor::Red,
            _ => PlayerColor::Blue,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xE74C3C,
            PlayerColor::Blue => 0x3498DB,
        }
    }
}

/// Who makes the moves for a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Computer,
}

/// What a caller supplies to seat a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub kind: PlayerKind,
}

impl PlayerSpec {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
        }
    }

    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Computer,
        }
    }
}

/// A seated player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub kind: PlayerKind,
    /// Triangles claimed so far; only ever increases during a match
    pub score: u32,
}

impl Player {
    /// Create a new player with a zero score
    pub fn new(id: PlayerId, spec: PlayerSpec) -> Self {
        Self {
            id,
            name: spec.name,
            color: PlayerColor::for_player(id),
            kind: spec.kind,
            score: 0,
        }
    }

    /// Whether the engine's opponent policy moves for this player
    pub fn is_computer(&self) -> bool {
        self.kind == PlayerKind::Computer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(1, PlayerSpec::computer("Bot"));
        assert_eq!(player.score, 0);
        assert_eq!(player.color, PlayerColor::Blue);
        assert!(player.is_computer());
    }

    #[test]
    fn test_colors_alternate() {
        assert_eq!(PlayerColor::for_player(0), PlayerColor::Red);
        assert_eq!(PlayerColor::for_player(1), PlayerColor::Blue);
        assert_ne!(PlayerColor::Red.hex_code(), PlayerColor::Blue.hex_code());
    }
}
