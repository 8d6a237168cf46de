//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{GameSession, SessionError, SessionUpdate};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use trigon_core::GameEvent;
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// One session per connection
    pub sessions: DashMap<Uuid, GameSession>,
    /// Mapping from session ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            senders: DashMap::new(),
            config,
        }
    }

    /// Send a message to a session's connection.
    pub fn send(&self, session_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&session_id) {
            let _ = sender.send(msg);
        }
    }

    fn send_error(&self, session_id: Uuid, e: impl ToString) {
        self.send(
            session_id,
            ServerMessage::Error {
                message: e.to_string(),
            },
        );
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Trigon server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let session_id = Uuid::new_v4();
    state
        .sessions
        .insert(session_id, GameSession::new(session_id, state.config.rules));

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.senders.insert(session_id, tx);

    let welcome = ServerMessage::Welcome { session_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(session_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", session_id, e);
                    state.send_error(session_id, format!("Invalid message: {e}"));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", session_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send(session_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", session_id, e);
                break;
            }
            _ => {}
        }
    }

    // Dropping the session stops any computer turn still running for it
    state.sessions.remove(&session_id);
    state.senders.remove(&session_id);
    send_task.abort();

    info!("Connection closed for {}", session_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(session_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    let Some(mut session) = state.sessions.get_mut(&session_id) else {
        warn!("Message for unknown session {}", session_id);
        return;
    };

    let result = match msg {
        ClientMessage::StartMatch {
            board,
            player_name,
            difficulty,
            computer_first,
            seed,
        } => session
            .start_match(board, player_name, difficulty, computer_first, seed)
            .map(|update| (update, Reply::Started)),
        ClientMessage::RollDice => session.roll_dice().map(|u| (u, Reply::Action)),
        ClientMessage::AttemptMove { a, b } => {
            session.attempt_move(a, b).map(|u| (u, Reply::Action))
        }
        ClientMessage::ResetMatch => session.reset_match().map(|u| (u, Reply::State)),
        ClientMessage::RequestState => match session.snapshot() {
            Some(snapshot) => {
                drop(session);
                state.send(session_id, ServerMessage::State { state: snapshot });
                return;
            }
            None => Err(SessionError::NoMatch),
        },
        ClientMessage::Ping => {
            drop(session);
            state.send(session_id, ServerMessage::Pong);
            return;
        }
    };
    drop(session);

    match result {
        Ok((update, reply)) => {
            let bot_to_move = update.bot_to_move;
            let generation = update.generation;
            publish(state, session_id, update, reply);

            if bot_to_move {
                tokio::spawn(run_bot_turn(Arc::clone(state), session_id, generation));
            }
        }
        Err(SessionError::Game(e)) => {
            state.send(
                session_id,
                ServerMessage::ActionResult {
                    success: false,
                    events: vec![],
                    error: Some(e.to_string()),
                },
            );
        }
        Err(e) => state.send_error(session_id, e),
    }
}

/// How an update is announced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Started,
    Action,
    Computer,
    State,
}

/// Send everything a client needs after one state change.
fn publish(state: &ServerState, session_id: Uuid, update: SessionUpdate, reply: Reply) {
    let SessionUpdate {
        events, snapshot, ..
    } = update;

    let turn_changed = events.iter().any(|e| {
        matches!(
            e,
            GameEvent::MatchStarted { .. } | GameEvent::TurnEnded { .. } | GameEvent::MatchReset
        )
    });
    let game_over = events.iter().find_map(|e| match e {
        GameEvent::GameOver { winner, scores } => Some((*winner, scores.clone())),
        _ => None,
    });

    match reply {
        Reply::Started => state.send(
            session_id,
            ServerMessage::MatchStarted {
                state: snapshot.clone(),
            },
        ),
        Reply::Action => state.send(
            session_id,
            ServerMessage::ActionResult {
                success: true,
                events,
                error: None,
            },
        ),
        Reply::Computer => state.send(session_id, ServerMessage::ComputerAction { events }),
        Reply::State => {}
    }
    if reply != Reply::Started {
        state.send(
            session_id,
            ServerMessage::State {
                state: snapshot.clone(),
            },
        );
    }

    if turn_changed && game_over.is_none() {
        let player_id = snapshot.current_player;
        let is_computer = snapshot
            .players
            .get(player_id as usize)
            .is_some_and(|p| p.is_computer());
        state.send(
            session_id,
            ServerMessage::TurnChanged {
                player_id,
                is_computer,
            },
        );
    }

    if let Some((winner, scores)) = game_over {
        let winner_name = winner
            .and_then(|w| snapshot.players.get(w as usize))
            .map(|p| p.name.clone());
        state.send(
            session_id,
            ServerMessage::GameOver {
                winner,
                winner_name,
                scores,
            },
        );
    }
}

/// Play the computer's turn one step at a time, pausing before each step.
///
/// Stops when the turn passes back, the match ends, the session is gone, or
/// its generation moved past `generation` (reset, restart). Returns the
/// number of steps applied.
pub async fn run_bot_turn(state: Arc<ServerState>, session_id: Uuid, generation: u64) -> usize {
    let mut steps = 0;
    loop {
        tokio::time::sleep(state.config.bot_delay).await;

        let update = {
            let Some(mut session) = state.sessions.get_mut(&session_id) else {
                debug!(%session_id, "session closed during computer turn");
                return steps;
            };
            if session.generation() != generation {
                debug!(%session_id, generation, "computer turn cancelled");
                return steps;
            }
            match session.bot_step() {
                Ok(Some(update)) => update,
                Ok(None) => return steps,
                Err(e) => {
                    error!(%session_id, "computer move failed: {}", e);
                    return steps;
                }
            }
        };

        steps += 1;
        let keep_going = update.bot_to_move;
        publish(&state, session_id, update, Reply::Computer);
        if !keep_going {
            return steps;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::diamond_layout;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use trigon_core::{BotDifficulty, RuleConfig};

    fn test_state(
        bot_delay: Duration,
    ) -> (Arc<ServerState>, Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let config = ServerConfig {
            bot_delay,
            rules: RuleConfig {
                max_dice: 1,
                ..RuleConfig::default()
            },
            ..ServerConfig::default()
        };
        let state = Arc::new(ServerState::new(config));
        let id = Uuid::new_v4();
        state.sessions.insert(id, GameSession::new(id, state.config.rules));
        let (tx, rx) = mpsc::unbounded_channel();
        state.senders.insert(id, tx);
        (state, id, rx)
    }

    fn start(state: &ServerState, id: Uuid) -> u64 {
        let mut session = state.sessions.get_mut(&id).unwrap();
        session
            .start_match(diamond_layout(), "Ann".into(), BotDifficulty::Hard, true, Some(11))
            .unwrap()
            .generation
    }

    #[tokio::test]
    async fn test_computer_plays_its_turn() {
        let (state, id, mut rx) = test_state(Duration::ZERO);
        let generation = start(&state, id);

        let steps = run_bot_turn(Arc::clone(&state), id, generation).await;
        assert_eq!(steps, 2);

        let session = state.sessions.get(&id).unwrap();
        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(snapshot.current_player, 1 - session.bot_seat());
        drop(session);

        let mut saw_turn_change = false;
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::TurnChanged { is_computer, .. } = msg {
                assert!(!is_computer);
                saw_turn_change = true;
            }
        }
        assert!(saw_turn_change);
    }

    #[tokio::test]
    async fn test_reset_cancels_computer_turn() {
        let (state, id, _rx) = test_state(Duration::from_millis(50));
        let generation = start(&state, id);

        let handle = tokio::spawn(run_bot_turn(Arc::clone(&state), id, generation));
        state.sessions.get_mut(&id).unwrap().reset_match().unwrap();

        assert_eq!(handle.await.unwrap(), 0);
        let snapshot = state.sessions.get(&id).unwrap().snapshot().unwrap();
        assert!(snapshot.edges.is_empty());
        assert_eq!(snapshot.dice_roll, None);
    }

    #[tokio::test]
    async fn test_closed_session_stops_computer_turn() {
        let (state, id, _rx) = test_state(Duration::from_millis(20));
        let generation = start(&state, id);

        let handle = tokio::spawn(run_bot_turn(Arc::clone(&state), id, generation));
        state.sessions.remove(&id);

        assert_eq!(handle.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejected_move_reports_failure() {
        let (state, id, mut rx) = test_state(Duration::from_secs(60));

        handle_message(
            id,
            ClientMessage::StartMatch {
                board: diamond_layout(),
                player_name: "Ann".into(),
                difficulty: BotDifficulty::Easy,
                computer_first: false,
                seed: Some(2),
            },
            &state,
        );
        handle_message(id, ClientMessage::RollDice, &state);
        handle_message(id, ClientMessage::AttemptMove { a: 1, b: 3 }, &state);

        let mut failures = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let ServerMessage::ActionResult {
                success: false,
                error,
                ..
            } = msg
            {
                failures.push(error);
            }
        }
        assert_eq!(failures.len(), 1);
        assert!(failures[0].is_some());
    }
}
