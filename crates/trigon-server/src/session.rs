//! One client's match against the computer.

use thiserror::Error;
use tracing::debug;
use trigon_core::{
    BoardError, BoardGraph, BoardLayout, Bot, BotDifficulty, DotId, GameAction, GameError,
    GameEvent, MatchSnapshot, MatchState, PlayerId, PlayerSpec, RuleConfig,
};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No match in progress")]
    NoMatch,

    #[error("Invalid board: {0}")]
    InvalidBoard(#[from] BoardError),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// What a client needs to hear after a state change
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub events: Vec<GameEvent>,
    pub snapshot: MatchSnapshot,
    /// The computer moves next
    pub bot_to_move: bool,
    pub generation: u64,
}

/// A connected client, its match and the computer opponent.
pub struct GameSession {
    pub id: Uuid,
    rules: RuleConfig,
    game: Option<MatchState>,
    bot: Option<Bot>,
    human_seat: PlayerId,
    /// Bumped whenever a running computer turn must stop
    generation: u64,
}

impl GameSession {
    pub fn new(id: Uuid, rules: RuleConfig) -> Self {
        Self {
            id,
            rules,
            game: None,
            bot: None,
            human_seat: 0,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bot_seat(&self) -> PlayerId {
        1 - self.human_seat
    }

    pub fn snapshot(&self) -> Option<MatchSnapshot> {
        self.game.as_ref().map(MatchState::snapshot)
    }

    /// Stop any computer turn in flight
    pub fn cancel(&mut self) {
        self.generation += 1;
    }

    /// Load a board and start a fresh match, dropping any previous one
    pub fn start_match(
        &mut self,
        layout: BoardLayout,
        player_name: String,
        difficulty: BotDifficulty,
        computer_first: bool,
        seed: Option<u64>,
    ) -> Result<SessionUpdate, SessionError> {
        let board = BoardGraph::try_from(layout)?;
        self.cancel();

        let mut game = match seed {
            Some(seed) => MatchState::with_seed(board, self.rules, seed),
            None => MatchState::new(board, self.rules),
        };
        self.human_seat = PlayerId::from(computer_first);
        let bot_seat = self.bot_seat();
        let bot = match seed {
            Some(seed) => Bot::with_seed(bot_seat, difficulty, seed.wrapping_add(1)),
            None => Bot::new(bot_seat, difficulty),
        };

        let human = PlayerSpec::human(player_name);
        let computer = PlayerSpec::computer("Computer");
        let seats = if computer_first {
            vec![computer, human]
        } else {
            vec![human, computer]
        };
        let events = game.start_match(seats)?;

        debug!(
            session = %self.id,
            human_seat = self.human_seat,
            ?difficulty,
            ?seed,
            "match started"
        );
        self.game = Some(game);
        self.bot = Some(bot);
        self.update(events)
    }

    /// Apply an action for the human seat
    pub fn apply_human(&mut self, action: GameAction) -> Result<SessionUpdate, SessionError> {
        let seat = self.human_seat;
        let game = self.game.as_mut().ok_or(SessionError::NoMatch)?;
        let events = game.apply_action(seat, action)?;
        self.update(events)
    }

    pub fn roll_dice(&mut self) -> Result<SessionUpdate, SessionError> {
        self.apply_human(GameAction::RollDice)
    }

    pub fn attempt_move(&mut self, a: DotId, b: DotId) -> Result<SessionUpdate, SessionError> {
        self.apply_human(GameAction::DrawEdge { a, b })
    }

    /// Clear the board; a computer turn in flight is abandoned
    pub fn reset_match(&mut self) -> Result<SessionUpdate, SessionError> {
        let game = self.game.as_mut().ok_or(SessionError::NoMatch)?;
        let events = game.reset_match();
        self.cancel();
        self.update(events)
    }

    /// Whether the computer has the next move
    pub fn bot_to_move(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| !g.is_finished() && g.current_player() == self.bot_seat())
    }

    /// One computer action (a roll or one edge). `None` when it is not the computer's move.
    pub fn bot_step(&mut self) -> Result<Option<SessionUpdate>, SessionError> {
        let (Some(game), Some(bot)) = (self.game.as_mut(), self.bot.as_mut()) else {
            return Err(SessionError::NoMatch);
        };
        let Some(action) = bot.choose_action(game) else {
            return Ok(None);
        };
        let events = game.apply_action(bot.player_id, action)?;
        self.update(events).map(Some)
    }

    fn update(&self, events: Vec<GameEvent>) -> Result<SessionUpdate, SessionError> {
        let snapshot = self.snapshot().ok_or(SessionError::NoMatch)?;
        Ok(SessionUpdate {
            events,
            snapshot,
            bot_to_move: self.bot_to_move(),
            generation: self.generation,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trigon_core::{Dot, GamePhase};

    /// Unit square with one diagonal, as a client would send it
    pub(crate) fn diamond_layout() -> BoardLayout {
        let mut dots = vec![
            Dot::new(0, 0.0, 0.0),
            Dot::new(1, 1.0, 0.0),
            Dot::new(2, 1.0, 1.0),
            Dot::new(3, 0.0, 1.0),
        ];
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)] {
            dots[a].neighbors.push(b as DotId);
            dots[b].neighbors.push(a as DotId);
        }
        BoardLayout { dots }
    }

    fn one_edge_rules() -> RuleConfig {
        RuleConfig {
            max_dice: 1,
            ..RuleConfig::default()
        }
    }

    #[test]
    fn test_actions_need_a_match() {
        let mut session = GameSession::new(Uuid::new_v4(), RuleConfig::default());
        assert!(matches!(session.roll_dice(), Err(SessionError::NoMatch)));
        assert!(matches!(session.reset_match(), Err(SessionError::NoMatch)));
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_bad_board_is_rejected() {
        let mut session = GameSession::new(Uuid::new_v4(), RuleConfig::default());
        let mut layout = diamond_layout();
        layout.dots[0].neighbors.push(9);

        let result = session.start_match(layout, "Ann".into(), BotDifficulty::Easy, false, Some(1));
        assert!(matches!(result, Err(SessionError::InvalidBoard(_))));
    }

    #[test]
    fn test_human_then_computer_turn() {
        let mut session = GameSession::new(Uuid::new_v4(), one_edge_rules());
        let update = session
            .start_match(diamond_layout(), "Ann".into(), BotDifficulty::Hard, false, Some(3))
            .unwrap();
        assert!(!update.bot_to_move);
        assert_eq!(update.snapshot.players[0].name, "Ann");

        session.roll_dice().unwrap();
        let update = session.attempt_move(0, 1).unwrap();
        assert!(update.bot_to_move);

        // Human cannot act during the computer's turn
        assert!(matches!(
            session.roll_dice(),
            Err(SessionError::Game(GameError::NotYourTurn))
        ));

        let rolled = session.bot_step().unwrap().unwrap();
        assert!(matches!(rolled.events[0], GameEvent::DiceRolled { player: 1, .. }));
        let drew = session.bot_step().unwrap().unwrap();
        assert!(matches!(drew.events[0], GameEvent::EdgeDrawn { player: 1, .. }));
        assert!(!drew.bot_to_move);
        assert!(session.bot_step().unwrap().is_none());
    }

    #[test]
    fn test_computer_can_open() {
        let mut session = GameSession::new(Uuid::new_v4(), RuleConfig::default());
        let update = session
            .start_match(diamond_layout(), "Ann".into(), BotDifficulty::Easy, true, Some(5))
            .unwrap();
        assert_eq!(session.bot_seat(), 0);
        assert!(update.bot_to_move);
        assert_eq!(update.snapshot.players[0].name, "Computer");
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut session = GameSession::new(Uuid::new_v4(), one_edge_rules());
        let started = session
            .start_match(diamond_layout(), "Ann".into(), BotDifficulty::Easy, false, Some(7))
            .unwrap();
        session.roll_dice().unwrap();
        session.attempt_move(0, 2).unwrap();

        let reset = session.reset_match().unwrap();
        assert!(reset.generation > started.generation);
        assert!(reset.snapshot.edges.is_empty());
        assert_eq!(reset.snapshot.phase, GamePhase::AwaitingRoll);
    }
}
