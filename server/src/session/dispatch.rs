//! Combat-phase move resolution

use duel_battle::{
    Message, MessageKind, RuleError, Rules, Seat, format_cooldown,
    update_adversary_of_pokemon_changes, update_trainer_pokemon,
};
use duel_protocol::ERR_INVALID_MESSAGE_TYPE;
use tracing::{error, info, warn};

use super::{BattleSession, Phase};

impl<R: Rules> BattleSession<R> {
    /// Handle one raw frame from `seat` during combat
    pub(super) fn handle_player_move(&mut self, seat: Seat, frame: &str) {
        if self.phase.is_finished() {
            return;
        }

        let Some(message) = self.parse_or_reply(seat, frame) else {
            return;
        };

        match &message.kind {
            MessageKind::Attack => self.resolve_attack(seat),
            MessageKind::Defend => self.resolve_defend(seat),
            MessageKind::UseItem => self.resolve_use_item(seat, &message),
            MessageKind::SelectPokemon => self.resolve_selection(seat, &message),
            other => {
                error!(%seat, kind = %other, "Cannot handle message type");
                self.reply_error(seat, ERR_INVALID_MESSAGE_TYPE);
            }
        }
    }

    fn resolve_attack(&mut self, seat: Seat) {
        let opponent_seat = seat.opponent();
        let (issuer, opponent) = self.players.split_mut(seat);
        let opponent_defending = opponent.defending;

        let result = self.rules.attack(
            issuer,
            self.lobby.outbox(seat),
            opponent_defending,
            opponent.selected_pokemon_mut(),
        );

        match result {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => return self.reject(seat, &e),
        }

        if self.players[opponent_seat].all_fainted() {
            self.conclude(seat);
        }

        let out = self.lobby.outbox(opponent_seat);
        if let Some(pokemon) = self.players[opponent_seat].selected_pokemon() {
            update_trainer_pokemon(pokemon, out);
            update_adversary_of_pokemon_changes(pokemon, out);
        }
    }

    fn resolve_defend(&mut self, seat: Seat) {
        let result = self
            .rules
            .defend(&mut self.players[seat], self.lobby.outbox(seat));

        match result {
            Ok(_) => self.lobby.outbox(seat.opponent()).send(&Message::new(
                MessageKind::AdversaryDefending,
                vec![format_cooldown(self.config.cooldown)],
            )),
            Err(e) => self.reject(seat, &e),
        }
    }

    fn resolve_use_item(&mut self, seat: Seat, message: &Message) {
        let result = self
            .rules
            .use_item(message, &mut self.players[seat], self.lobby.outbox(seat));

        match result {
            Ok(_) => self.notify_adversary(seat),
            Err(e) => self.reject(seat, &e),
        }
    }

    /// Pokemon selection, shared by setup and mid-match reselection
    pub(super) fn resolve_selection(&mut self, seat: Seat, message: &Message) {
        let result = self.rules.select_pokemon(
            message,
            &mut self.players[seat],
            self.lobby.outbox(seat),
        );

        match result {
            Ok(_) => self.notify_adversary(seat),
            Err(e) => self.reject(seat, &e),
        }
    }

    /// Tell the opponent of `seat` about `seat`'s selected pokemon
    fn notify_adversary(&self, seat: Seat) {
        if let Some(pokemon) = self.players[seat].selected_pokemon() {
            update_adversary_of_pokemon_changes(pokemon, self.lobby.outbox(seat.opponent()));
        }
    }

    /// Answer a rejected move so the player is not left guessing
    fn reject(&self, seat: Seat, err: &RuleError) {
        warn!(%seat, error = %err, "Move rejected");
        self.lobby.outbox(seat).send(&Message::error(err.to_string()));
    }

    /// Record `seat` as the winner. Only the first call has any effect.
    pub(super) fn conclude(&mut self, seat: Seat) {
        if self.phase.is_finished() {
            return;
        }

        let winner = self.players[seat].username.clone();
        info!(lobby = %self.lobby.id, winner = %winner, "Battle ended");
        for (side, player) in self.players.iter() {
            for pokemon in player.pokemons.values() {
                info!(
                    seat = %side,
                    trainer = %player.username,
                    pokemon = %pokemon.id,
                    hp = pokemon.hp,
                    "Final pokemon state"
                );
            }
        }

        self.phase = Phase::Finished { winner };
    }
}
