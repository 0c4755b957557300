//! Default rules engine

use std::time::Duration;

use duel_protocol::{Message, MessageKind};

use super::notify::{update_adversary_of_pokemon_changes, update_trainer_pokemon};
use super::{RuleError, Rules};
use crate::cooldown::DEFAULT_COOLDOWN;
use crate::outbox::Outbox;
use crate::types::{Pokemon, TrainerBattleStatus};

/// Straightforward damage rules
///
/// - attacks deal the attacker's `damage`, halved against a defending target
/// - attacking and defending put the trainer on cooldown
/// - nothing is allowed while on cooldown
#[derive(Debug, Clone)]
pub struct StandardRules {
    pub cooldown: Duration,
}

impl StandardRules {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }
}

impl Default for StandardRules {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl Rules for StandardRules {
    fn select_pokemon(
        &self,
        message: &Message,
        trainer: &mut TrainerBattleStatus,
        out: &Outbox,
    ) -> Result<bool, RuleError> {
        let id = message
            .arg(0)
            .ok_or(RuleError::MissingArgument("pokemon id"))?;

        if trainer.on_cooldown {
            return Err(RuleError::OnCooldown);
        }

        let pokemon = trainer
            .pokemons
            .get(id)
            .ok_or_else(|| RuleError::UnknownPokemon(id.to_string()))?;

        if !pokemon.is_alive() {
            return Err(RuleError::PokemonFainted(id.to_string()));
        }

        update_trainer_pokemon(pokemon, out);
        trainer.selected = Some(id.to_string());
        Ok(true)
    }

    fn attack(
        &self,
        issuer: &mut TrainerBattleStatus,
        out: &Outbox,
        opponent_defending: bool,
        opponent_pokemon: Option<&mut Pokemon>,
    ) -> Result<bool, RuleError> {
        if issuer.on_cooldown {
            return Err(RuleError::OnCooldown);
        }

        let attacker = issuer
            .selected_pokemon()
            .ok_or(RuleError::NoPokemonSelected)?;
        if !attacker.is_alive() {
            return Err(RuleError::PokemonFainted(attacker.id.clone()));
        }

        let target = opponent_pokemon.ok_or(RuleError::NoPokemonSelected)?;
        if !target.is_alive() {
            return Err(RuleError::TargetFainted(target.id.clone()));
        }

        let damage = if opponent_defending {
            attacker.damage / 2
        } else {
            attacker.damage
        };

        target.take_damage(damage);
        issuer.start_cooldown(self.cooldown);
        update_adversary_of_pokemon_changes(target, out);

        Ok(damage > 0)
    }

    fn defend(&self, issuer: &mut TrainerBattleStatus, _out: &Outbox) -> Result<bool, RuleError> {
        if issuer.on_cooldown {
            return Err(RuleError::OnCooldown);
        }

        issuer.defending = true;
        issuer.start_cooldown(self.cooldown);
        Ok(true)
    }

    fn use_item(
        &self,
        message: &Message,
        issuer: &mut TrainerBattleStatus,
        out: &Outbox,
    ) -> Result<bool, RuleError> {
        let id = message.arg(0).ok_or(RuleError::MissingArgument("item id"))?;

        if issuer.on_cooldown {
            return Err(RuleError::OnCooldown);
        }
        if issuer.used_items.contains_key(id) {
            return Err(RuleError::ItemAlreadyUsed(id.to_string()));
        }

        let effect = issuer
            .items
            .get(id)
            .map(|item| item.effect.clone())
            .ok_or_else(|| RuleError::UnknownItem(id.to_string()))?;

        let pokemon = issuer
            .selected_pokemon_mut()
            .ok_or(RuleError::NoPokemonSelected)?;

        if !effect.apply(pokemon) {
            return Err(RuleError::ItemNotApplicable(id.to_string()));
        }
        update_trainer_pokemon(pokemon, out);

        if let Some(item) = issuer.items.remove(id) {
            out.send(&Message::new(MessageKind::RemoveItem, vec![item.to_payload()]));
            issuer.used_items.insert(item.id.clone(), item);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, ItemEffect};
    use duel_protocol::parse_message;
    use tokio::sync::mpsc;

    fn create_test_trainer(name: &str) -> TrainerBattleStatus {
        TrainerBattleStatus::new(
            name,
            [
                Pokemon::new("pika", "Pikachu", 35, 10),
                Pokemon::new("char", "Charmander", 39, 12),
            ],
            [
                Item::new("potion", "Potion", ItemEffect::Potion { heal: 20 }),
                Item::new("revive", "Revive", ItemEffect::Revive),
            ],
        )
    }

    fn outbox() -> (Outbox, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Outbox::new(tx), rx)
    }

    fn kinds(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<MessageKind> {
        let mut kinds = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            kinds.push(parse_message(&frame).unwrap().kind);
        }
        kinds
    }

    fn select(id: &str) -> Message {
        Message::new(MessageKind::SelectPokemon, vec![id.to_string()])
    }

    #[test]
    fn test_select_pokemon() {
        let rules = StandardRules::default();
        let mut trainer = create_test_trainer("ash");
        let (out, mut rx) = outbox();

        assert_eq!(rules.select_pokemon(&select("char"), &mut trainer, &out), Ok(true));
        assert_eq!(trainer.selected.as_deref(), Some("char"));
        assert_eq!(kinds(&mut rx), vec![MessageKind::UpdatePlayerPokemon]);
    }

    #[test]
    fn test_select_rejections() {
        let rules = StandardRules::default();
        let mut trainer = create_test_trainer("ash");
        let (out, mut rx) = outbox();

        assert_eq!(
            rules.select_pokemon(&Message::bare(MessageKind::SelectPokemon), &mut trainer, &out),
            Err(RuleError::MissingArgument("pokemon id"))
        );
        assert_eq!(
            rules.select_pokemon(&select("mew"), &mut trainer, &out),
            Err(RuleError::UnknownPokemon("mew".to_string()))
        );

        trainer.pokemons.get_mut("pika").unwrap().take_damage(100);
        assert_eq!(
            rules.select_pokemon(&select("pika"), &mut trainer, &out),
            Err(RuleError::PokemonFainted("pika".to_string()))
        );

        assert!(trainer.selected.is_none());
        assert!(kinds(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attack_deals_damage() {
        let rules = StandardRules::default();
        let mut issuer = create_test_trainer("ash");
        let mut opponent = create_test_trainer("gary");
        issuer.selected = Some("char".to_string());
        opponent.selected = Some("pika".to_string());
        let (out, mut rx) = outbox();

        let changed = rules.attack(&mut issuer, &out, false, opponent.selected_pokemon_mut());

        assert_eq!(changed, Ok(true));
        assert_eq!(opponent.pokemons["pika"].hp, 23);
        assert!(issuer.on_cooldown);
        assert!(!issuer.cooldown.is_elapsed());
        assert_eq!(kinds(&mut rx), vec![MessageKind::UpdateAdversaryPokemon]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attack_against_defender_is_halved() {
        let rules = StandardRules::default();
        let mut issuer = create_test_trainer("ash");
        let mut opponent = create_test_trainer("gary");
        issuer.selected = Some("char".to_string());
        opponent.selected = Some("pika".to_string());
        let (out, _rx) = outbox();

        rules
            .attack(&mut issuer, &out, true, opponent.selected_pokemon_mut())
            .unwrap();

        assert_eq!(opponent.pokemons["pika"].hp, 29);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attack_rejections() {
        let rules = StandardRules::default();
        let mut issuer = create_test_trainer("ash");
        let mut opponent = create_test_trainer("gary");
        let (out, _rx) = outbox();

        assert_eq!(
            rules.attack(&mut issuer, &out, false, opponent.selected_pokemon_mut()),
            Err(RuleError::NoPokemonSelected)
        );

        issuer.selected = Some("char".to_string());
        opponent.selected = Some("pika".to_string());
        opponent.selected_pokemon_mut().unwrap().take_damage(100);
        assert_eq!(
            rules.attack(&mut issuer, &out, false, opponent.selected_pokemon_mut()),
            Err(RuleError::TargetFainted("pika".to_string()))
        );

        issuer.on_cooldown = true;
        assert_eq!(
            rules.attack(&mut issuer, &out, false, opponent.selected_pokemon_mut()),
            Err(RuleError::OnCooldown)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_defend() {
        let rules = StandardRules::new(Duration::from_millis(500));
        let mut issuer = create_test_trainer("ash");
        let (out, _rx) = outbox();

        assert_eq!(rules.defend(&mut issuer, &out), Ok(true));
        assert!(issuer.defending);
        assert!(issuer.on_cooldown);

        assert_eq!(rules.defend(&mut issuer, &out), Err(RuleError::OnCooldown));

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(issuer.cooldown.is_elapsed());
    }

    #[test]
    fn test_use_item() {
        let rules = StandardRules::default();
        let mut issuer = create_test_trainer("ash");
        issuer.selected = Some("pika".to_string());
        issuer.selected_pokemon_mut().unwrap().take_damage(30);
        let (out, mut rx) = outbox();
        let potion = Message::new(MessageKind::UseItem, vec!["potion".to_string()]);

        assert_eq!(rules.use_item(&potion, &mut issuer, &out), Ok(true));
        assert_eq!(issuer.pokemons["pika"].hp, 25);
        assert!(!issuer.items.contains_key("potion"));
        assert!(issuer.used_items.contains_key("potion"));
        assert_eq!(
            kinds(&mut rx),
            vec![MessageKind::UpdatePlayerPokemon, MessageKind::RemoveItem]
        );

        assert_eq!(
            rules.use_item(&potion, &mut issuer, &out),
            Err(RuleError::ItemAlreadyUsed("potion".to_string()))
        );
    }

    #[test]
    fn test_use_item_not_applicable_keeps_item() {
        let rules = StandardRules::default();
        let mut issuer = create_test_trainer("ash");
        issuer.selected = Some("pika".to_string());
        let (out, _rx) = outbox();
        let revive = Message::new(MessageKind::UseItem, vec!["revive".to_string()]);

        assert_eq!(
            rules.use_item(&revive, &mut issuer, &out),
            Err(RuleError::ItemNotApplicable("revive".to_string()))
        );
        assert!(issuer.items.contains_key("revive"));
        assert!(issuer.used_items.is_empty());
    }
}
