//! Session controller for real-time two-player battles.
//!
//! A [`Lobby`] couples two player connections; a [`BattleSession`] drives the
//! match over it: pokemon selection, combat with per-player cooldowns, and the
//! finish sequence. [`serve`] wires both to websocket connections.

pub mod config;
pub mod lobby;
pub mod server;
pub mod session;
pub mod transport;

pub use config::{ServerConfig, SessionConfig};
pub use lobby::{Lobby, LobbyEvent, TrainerEndpoint};
pub use server::{serve, start_match};
pub use session::{BattleSession, Entrant, Phase, SessionError};
