//! Move resolution
//!
//! The session controller delegates every gameplay action to a [`Rules`]
//! implementation. Resolvers mutate the trainer state they are given, may
//! reply to the acting trainer through its [`Outbox`], and report whether any
//! combat state changed.

mod notify;
mod standard;

use duel_protocol::Message;
use thiserror::Error;

use crate::outbox::Outbox;
use crate::types::{Pokemon, TrainerBattleStatus};

pub use notify::{update_adversary_of_pokemon_changes, update_trainer_pokemon};
pub use standard::StandardRules;

/// Why a well-formed move was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("trainer is on cooldown")]
    OnCooldown,

    #[error("no pokemon selected")]
    NoPokemonSelected,

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("unknown pokemon: {0}")]
    UnknownPokemon(String),

    #[error("pokemon has no HP left: {0}")]
    PokemonFainted(String),

    #[error("target has no HP left: {0}")]
    TargetFainted(String),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("item already used: {0}")]
    ItemAlreadyUsed(String),

    #[error("item cannot be used on the selected pokemon: {0}")]
    ItemNotApplicable(String),
}

/// Resolvers for the four gameplay actions.
///
/// Each returns `Ok(changed)` on success, where `changed` reports whether
/// combat state was modified.
pub trait Rules: Send + Sync {
    /// Choose the active pokemon (setup and mid-match)
    fn select_pokemon(
        &self,
        message: &Message,
        trainer: &mut TrainerBattleStatus,
        out: &Outbox,
    ) -> Result<bool, RuleError>;

    /// Attack the opponent's selected pokemon
    fn attack(
        &self,
        issuer: &mut TrainerBattleStatus,
        out: &Outbox,
        opponent_defending: bool,
        opponent_pokemon: Option<&mut Pokemon>,
    ) -> Result<bool, RuleError>;

    fn defend(&self, issuer: &mut TrainerBattleStatus, out: &Outbox) -> Result<bool, RuleError>;

    fn use_item(
        &self,
        message: &Message,
        issuer: &mut TrainerBattleStatus,
        out: &Outbox,
    ) -> Result<bool, RuleError>;
}
