//! Trainer battle state and combat rules for duel sessions.
//!
//! # Overview
//!
//! `duel-battle` sits between `duel-protocol` (wire format) and the session
//! controller in `duel-server`:
//!
//! ```text
//! duel-protocol (envelopes)
//!        │
//!        ▼
//! duel-battle (domain types + rules) ← THIS CRATE
//!        │
//!        ▼
//! duel-server (lobby, session, cooldown watchers)
//! ```
//!
//! # Main Types
//!
//! - [`Pokemon`], [`Item`], [`ItemEffect`] - combatants and inventory
//! - [`TrainerBattleStatus`] - one player's mutable combat state
//! - [`Seat`], [`Pair`] - the two fixed player slots
//! - [`CooldownTimer`] - re-armable per-player deadline
//! - [`Outbox`] - outbound channel to one player
//! - [`Rules`], [`StandardRules`] - move resolution

pub mod cooldown;
pub mod outbox;
pub mod rules;
pub mod types;

pub use cooldown::{CooldownTimer, DEFAULT_COOLDOWN, format_cooldown};
pub use outbox::Outbox;
pub use rules::{
    RuleError, Rules, StandardRules, update_adversary_of_pokemon_changes, update_trainer_pokemon,
};
pub use types::{Item, ItemEffect, Pair, Pokemon, Seat, TrainerBattleStatus};

pub use duel_protocol::{Message, MessageKind};
