//! Per-player combat state

use std::collections::BTreeMap;
use std::time::Duration;

use super::item::Item;
use super::pokemon::Pokemon;
use crate::cooldown::CooldownTimer;

/// One trainer's mutable state for the length of a match
#[derive(Debug)]
pub struct TrainerBattleStatus {
    /// Trainer's username (the winner identity)
    pub username: String,

    /// Owned pokemon by id
    pub pokemons: BTreeMap<String, Pokemon>,

    /// Items still available, by id
    pub items: BTreeMap<String, Item>,

    /// Items consumed this match, by id
    pub used_items: BTreeMap<String, Item>,

    /// Id of the active pokemon
    pub selected: Option<String>,

    /// Incoming attacks are softened while set
    pub defending: bool,

    /// Moves are rejected while set
    pub on_cooldown: bool,

    /// Clears `defending`/`on_cooldown` when it elapses
    pub cooldown: CooldownTimer,
}

impl TrainerBattleStatus {
    pub fn new(
        username: impl Into<String>,
        pokemons: impl IntoIterator<Item = Pokemon>,
        items: impl IntoIterator<Item = Item>,
    ) -> Self {
        Self {
            username: username.into(),
            pokemons: pokemons.into_iter().map(|p| (p.id.clone(), p)).collect(),
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
            used_items: BTreeMap::new(),
            selected: None,
            defending: false,
            on_cooldown: false,
            cooldown: CooldownTimer::new(),
        }
    }

    pub fn selected_pokemon(&self) -> Option<&Pokemon> {
        self.selected.as_ref().and_then(|id| self.pokemons.get(id))
    }

    pub fn selected_pokemon_mut(&mut self) -> Option<&mut Pokemon> {
        let id = self.selected.as_ref()?;
        self.pokemons.get_mut(id)
    }

    pub fn has_selected(&self) -> bool {
        self.selected_pokemon().is_some()
    }

    /// True when no owned pokemon has HP left
    pub fn all_fainted(&self) -> bool {
        self.pokemons.values().all(|p| !p.is_alive())
    }

    /// Put the trainer on cooldown and (re)arm the timer
    pub fn start_cooldown(&mut self, duration: Duration) {
        self.on_cooldown = true;
        self.cooldown.reset(duration);
    }

    pub fn clear_cooldown(&mut self) {
        self.defending = false;
        self.on_cooldown = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_trainer() -> TrainerBattleStatus {
        TrainerBattleStatus::new(
            "ash",
            [
                Pokemon::new("pika", "Pikachu", 35, 10),
                Pokemon::new("char", "Charmander", 39, 12),
            ],
            [],
        )
    }

    #[test]
    fn test_new_trainer() {
        let trainer = create_test_trainer();
        assert_eq!(trainer.username, "ash");
        assert_eq!(trainer.pokemons.len(), 2);
        assert!(!trainer.has_selected());
        assert!(!trainer.defending);
        assert!(!trainer.on_cooldown);
    }

    #[test]
    fn test_selected_pokemon() {
        let mut trainer = create_test_trainer();
        trainer.selected = Some("char".to_string());
        assert_eq!(trainer.selected_pokemon().unwrap().species, "Charmander");

        trainer.selected_pokemon_mut().unwrap().take_damage(9);
        assert_eq!(trainer.pokemons["char"].hp, 30);

        trainer.selected = Some("missing".to_string());
        assert!(!trainer.has_selected());
    }

    #[test]
    fn test_all_fainted() {
        let mut trainer = create_test_trainer();
        assert!(!trainer.all_fainted());

        trainer.pokemons.get_mut("pika").unwrap().take_damage(100);
        assert!(!trainer.all_fainted());

        trainer.pokemons.get_mut("char").unwrap().take_damage(100);
        assert!(trainer.all_fainted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_flags() {
        let mut trainer = create_test_trainer();
        trainer.defending = true;
        trainer.start_cooldown(Duration::from_secs(2));
        assert!(trainer.on_cooldown);
        assert!(!trainer.cooldown.is_elapsed());

        trainer.clear_cooldown();
        assert!(!trainer.defending);
        assert!(!trainer.on_cooldown);
    }
}
