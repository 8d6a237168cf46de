//! WebAssembly bindings for the Trigon engine.
//!
//! Everything crosses the boundary as JSON strings.

use crate::actions::GameAction;
use crate::board::BoardGraph;
use crate::bot::{Bot, BotDifficulty};
use crate::game::{MatchState, RuleConfig};
use crate::player::PlayerSpec;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{context}: {e}"))
}

fn parse_difficulty(difficulty: &str) -> BotDifficulty {
    match difficulty {
        "Easy" => BotDifficulty::Easy,
        "Hard" => BotDifficulty::Hard,
        _ => BotDifficulty::Medium,
    }
}

/// WASM-exposed match wrapper
#[wasm_bindgen]
pub struct WasmMatch {
    state: MatchState,
}

#[wasm_bindgen]
impl WasmMatch {
    /// Load a board (`{"dots": [...]}`) with optional rules JSON (empty for defaults)
    #[wasm_bindgen(constructor)]
    pub fn new(board_json: &str, rules_json: &str) -> Result<WasmMatch, JsValue> {
        let board: BoardGraph =
            serde_json::from_str(board_json).map_err(|e| js_error("Invalid board", e))?;
        let config: RuleConfig = if rules_json.trim().is_empty() {
            RuleConfig::default()
        } else {
            serde_json::from_str(rules_json).map_err(|e| js_error("Invalid rules", e))?
        };

        Ok(WasmMatch {
            state: MatchState::new(board, config),
        })
    }

    /// Seat a human (player 0) against the computer (player 1)
    #[wasm_bindgen(js_name = startMatch)]
    pub fn start_match(&mut self, human_name: &str) -> Result<String, JsValue> {
        let events = self
            .state
            .start_match(vec![
                PlayerSpec::human(human_name),
                PlayerSpec::computer("Computer"),
            ])
            .map_err(|e| js_error("Start failed", e))?;
        serde_json::to_string(&events).map_err(|e| js_error("Serialization failed", e))
    }

    /// Get a snapshot of the match as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current player ID
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player()
    }

    /// Get every legal edge as a JSON array of `[a, b]` pairs
    #[wasm_bindgen(js_name = getLegalMoves)]
    pub fn get_legal_moves(&self) -> String {
        serde_json::to_string(&self.state.legal_moves()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction =
            serde_json::from_str(action_json).map_err(|e| js_error("Invalid action JSON", e))?;

        let events = self
            .state
            .apply_action(player, action)
            .map_err(|e| js_error("Action failed", e))?;
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Roll for `player`
    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self, player: u8) -> Result<String, JsValue> {
        self.apply_action(player, r#""RollDice""#)
    }

    /// Draw the edge between two dots for `player`
    #[wasm_bindgen(js_name = attemptMove)]
    pub fn attempt_move(&mut self, player: u8, a: u32, b: u32) -> Result<String, JsValue> {
        let events = self
            .state
            .attempt_move(player, a, b)
            .map_err(|e| js_error("Move rejected", e))?;
        Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Clear the board and restart with the same players
    #[wasm_bindgen(js_name = resetMatch)]
    pub fn reset_match(&mut self) -> String {
        serde_json::to_string(&self.state.reset_match()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winner (if the game is finished and not tied)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<u8> {
        self.state.winner()
    }

    /// Get the bot's next action for a player as JSON (`null` if it has none)
    /// difficulty: "Easy", "Medium", or "Hard"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, player: u8, difficulty: &str) -> String {
        let mut bot = Bot::new(player, parse_difficulty(difficulty));
        match bot.choose_action(&self.state) {
            Some(action) => serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }
}
