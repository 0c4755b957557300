//! State-change notifications

use duel_protocol::{Message, MessageKind};

use crate::outbox::Outbox;
use crate::types::Pokemon;

/// Tell a trainer the current state of their own pokemon
pub fn update_trainer_pokemon(pokemon: &Pokemon, out: &Outbox) {
    out.send(&Message::new(
        MessageKind::UpdatePlayerPokemon,
        vec![pokemon.to_payload()],
    ));
}

/// Tell a trainer the current state of their adversary's pokemon
pub fn update_adversary_of_pokemon_changes(pokemon: &Pokemon, out: &Outbox) {
    out.send(&Message::new(
        MessageKind::UpdateAdversaryPokemon,
        vec![pokemon.to_payload()],
    ));
}
