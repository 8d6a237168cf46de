//! Trigon - a dice-driven triangle claiming game on dot graphs
//!
//! Two players take turns rolling a die and drawing that many straight,
//! non-crossing edges between neighboring dots. Whoever draws the last side
//! of a triangle claims it. The match ends when no edge can be drawn.
//!
//! # Architecture
//!
//! The engine is platform-agnostic. It can be compiled to:
//! - Native Rust for server-side game hosting
//! - WebAssembly for client-side single-player
//!
//! # Modules
//!
//! - [`board`]: Dots, positions and the potential edges between them
//! - [`geometry`]: Segment crossing tests
//! - [`triangles`]: Precomputed triangles and the edge-to-triangle index
//! - [`edges`]: Edges drawn so far
//! - [`legality`]: Which edges may be drawn right now
//! - [`claims`]: Triangle ownership
//! - [`feasibility`]: How large a roll can still be completed
//! - [`game`]: Turn state machine
//! - [`bot`]: Computer opponent

pub mod actions;
pub mod board;
pub mod bot;
pub mod claims;
pub mod edges;
pub mod feasibility;
pub mod game;
pub mod geometry;
pub mod legality;
pub mod player;
pub mod triangles;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{BoardError, BoardGraph, BoardLayout, Dot, DotId, EdgeKey, PlayerId, Point};
pub use bot::{Bot, BotDifficulty, BotWeights};
pub use claims::TriangleClaims;
pub use edges::{DrawnEdge, EdgeSet};
pub use feasibility::FeasibilityReport;
pub use game::{GameError, GamePhase, LastMove, MatchSnapshot, MatchState, RuleConfig};
pub use legality::IllegalMove;
pub use player::{Player, PlayerColor, PlayerKind, PlayerSpec};
pub use triangles::{Triangle, TriangleId, TriangleIndex};
