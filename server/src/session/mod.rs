//! Battle session controller
//!
//! One coordinating task drives a match through its phases:
//!
//! ```text
//! AwaitingSelection ──both selected──▶ InProgress ──all fainted──▶ Finished
//!         │                                 │
//!         └────────── disconnect ───────────┴──▶ lobby closed, no winner
//! ```
//!
//! During `InProgress` one cooldown watcher per seat runs alongside the
//! coordinator. Watchers never touch trainer state themselves; they report
//! elapsed timers back to the coordinator, which is the only writer.

mod cooldown;
mod dispatch;

use duel_battle::{Message, MessageKind, Pair, Rules, Seat, TrainerBattleStatus};
use duel_protocol::{ERR_INVALID_MESSAGE_FORMAT, ERR_INVALID_MESSAGE_TYPE, parse_message};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::lobby::{Lobby, LobbyEvent};

use cooldown::watch_cooldown;

/// Elapsed-timer reports buffered per match
const COOLDOWN_EVENTS: usize = 8;

/// A player joining the match
#[derive(Debug)]
pub struct Entrant {
    pub status: TrainerBattleStatus,
    pub auth_token: String,
}

/// Lifecycle of a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for both players to pick a pokemon
    AwaitingSelection,
    /// Combat in progress
    InProgress,
    /// One side has no pokemon left
    Finished { winner: String },
}

impl Phase {
    pub fn is_selecting(&self) -> bool {
        matches!(self, Phase::AwaitingSelection)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished { .. })
    }

    pub fn winner(&self) -> Option<&str> {
        match self {
            Phase::Finished { winner } => Some(winner.as_str()),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("An error occurred with user {username} ({seat})")]
    Disconnected { seat: Seat, username: String },
}

/// One match between two trainers
pub struct BattleSession<R> {
    lobby: Lobby,
    auth_tokens: Pair<String>,
    players: Pair<TrainerBattleStatus>,
    phase: Phase,
    start: watch::Sender<bool>,
    rules: R,
    config: SessionConfig,
}

impl<R: Rules> BattleSession<R> {
    pub fn new(lobby: Lobby, entrants: Pair<Entrant>, rules: R, config: SessionConfig) -> Self {
        let Pair { home, away } = entrants;
        let (start, _) = watch::channel(false);

        Self {
            lobby,
            auth_tokens: Pair::new(home.auth_token, away.auth_token),
            players: Pair::new(home.status, away.status),
            phase: Phase::AwaitingSelection,
            start,
            rules,
            config,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_selecting(&self) -> bool {
        self.phase.is_selecting()
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn winner(&self) -> Option<&str> {
        self.phase.winner()
    }

    pub fn player(&self, seat: Seat) -> &TrainerBattleStatus {
        &self.players[seat]
    }

    pub fn auth_token(&self, seat: Seat) -> &str {
        &self.auth_tokens[seat]
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    /// Receiver that turns true once players may send gameplay messages
    pub fn subscribe_start(&self) -> watch::Receiver<bool> {
        self.start.subscribe()
    }

    /// Run the whole match: setup, combat and, on success, the finish sequence
    pub async fn run(mut self) -> Result<String, SessionError> {
        let winner = self.start().await?;
        self.finish(&winner).await;
        Ok(winner)
    }

    /// Run setup and combat, returning the winner's username.
    ///
    /// A disconnect in either phase closes the lobby and ends the match with
    /// no winner.
    pub async fn start(&mut self) -> Result<String, SessionError> {
        self.start.send_replace(true);
        self.lobby.started = true;

        self.setup().await?;
        self.combat().await
    }

    /// Announce the winner, wait for both clients to leave, then close the lobby
    pub async fn finish(&mut self, winner: &str) {
        self.lobby.finished = true;
        self.lobby.broadcast(&Message::new(
            MessageKind::Finish,
            vec![winner.to_string()],
        ));

        self.lobby.wait_disconnects().await;
        self.lobby.close();
    }

    async fn setup(&mut self) -> Result<(), SessionError> {
        self.lobby.broadcast(&Message::bare(MessageKind::Start));
        info!(lobby = %self.lobby.id, "Sent START message");

        while !(self.players.home.has_selected() && self.players.away.has_selected()) {
            self.log_status();

            match self.lobby.next_event().await {
                LobbyEvent::Message(seat, frame) => self.handle_selection(seat, &frame),
                LobbyEvent::Disconnected(seat) => return Err(self.abort(seat)),
            }
        }

        info!(lobby = %self.lobby.id, "Battle setup finished");
        self.phase = Phase::InProgress;
        Ok(())
    }

    async fn combat(&mut self) -> Result<String, SessionError> {
        let (elapsed_tx, mut elapsed_rx) = mpsc::channel(COOLDOWN_EVENTS);
        let watchers = Pair::new(
            tokio::spawn(watch_cooldown(
                Seat::Home,
                self.players.home.cooldown.subscribe(),
                elapsed_tx.clone(),
            )),
            tokio::spawn(watch_cooldown(
                Seat::Away,
                self.players.away.cooldown.subscribe(),
                elapsed_tx,
            )),
        );

        let result = loop {
            if let Phase::Finished { winner } = &self.phase {
                break Ok(winner.clone());
            }
            self.log_status();

            tokio::select! {
                event = self.lobby.next_event() => match event {
                    LobbyEvent::Message(seat, frame) => self.handle_player_move(seat, &frame),
                    LobbyEvent::Disconnected(seat) => break Err(self.abort(seat)),
                },
                Some(seat) = elapsed_rx.recv() => self.on_cooldown_elapsed(seat),
            }
        };

        for (_, watcher) in watchers.iter() {
            watcher.abort();
        }
        result
    }

    /// Setup-phase handling of one frame
    fn handle_selection(&mut self, seat: Seat, frame: &str) {
        let Some(message) = self.parse_or_reply(seat, frame) else {
            return;
        };

        if message.kind != MessageKind::SelectPokemon {
            warn!(%seat, kind = %message.kind, "Only SELECT_POKEMON is accepted during setup");
            self.reply_error(seat, ERR_INVALID_MESSAGE_TYPE);
            return;
        }

        self.resolve_selection(seat, &message);
    }

    fn parse_or_reply(&self, seat: Seat, frame: &str) -> Option<Message> {
        match parse_message(frame) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(%seat, error = %e, "Failed to parse player message");
                self.reply_error(seat, ERR_INVALID_MESSAGE_FORMAT);
                None
            }
        }
    }

    fn reply_error(&self, seat: Seat, description: &str) {
        self.lobby.outbox(seat).send(&Message::error(description));
    }

    /// Clear a seat's defending/cooldown flags if its timer really elapsed
    fn on_cooldown_elapsed(&mut self, seat: Seat) {
        if self.phase.is_finished() {
            return;
        }

        let player = &mut self.players[seat];
        if !player.cooldown.is_elapsed() {
            debug!(%seat, "Cooldown was re-armed, ignoring stale expiry");
            return;
        }

        player.clear_cooldown();
        info!(%seat, username = %player.username, "Removed cooldown status");
    }

    /// Log the disconnect, close the lobby and build the match failure
    fn abort(&mut self, seat: Seat) -> SessionError {
        let err = SessionError::Disconnected {
            seat,
            username: self.lobby.username(seat).to_string(),
        };
        error!(lobby = %self.lobby.id, error = %err, "Aborting match");
        self.lobby.close();
        err
    }

    fn log_status(&self) {
        debug!(
            lobby = %self.lobby.id,
            selecting = self.phase.is_selecting(),
            "Battle status"
        );

        for (seat, player) in self.players.iter() {
            match player.selected_pokemon() {
                Some(pokemon) => debug!(
                    %seat,
                    defending = player.defending,
                    cooldown = player.on_cooldown,
                    pokemon = %pokemon.id,
                    species = %pokemon.species,
                    damage = pokemon.damage,
                    hp = pokemon.hp,
                    max_hp = pokemon.max_hp,
                    "Player status"
                ),
                None => debug!(
                    %seat,
                    defending = player.defending,
                    cooldown = player.on_cooldown,
                    "Player status"
                ),
            }
        }
    }
}
