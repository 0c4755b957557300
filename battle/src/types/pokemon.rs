//! Pokemon combat state

use serde::{Deserialize, Serialize};

/// A combatant owned by a trainer
///
/// HP is signed so that overkill damage never wraps; [`Pokemon::take_damage`]
/// clamps at zero anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Unique id within the trainer's team
    pub id: String,

    /// Species name
    pub species: String,

    /// Level (1-100)
    #[serde(default = "default_level")]
    pub level: u8,

    /// Current HP
    pub hp: i32,

    /// Maximum HP
    pub max_hp: i32,

    /// Damage dealt by one attack
    pub damage: i32,
}

fn default_level() -> u8 {
    100
}

impl Pokemon {
    /// Create a pokemon at full HP
    pub fn new(id: impl Into<String>, species: impl Into<String>, max_hp: i32, damage: i32) -> Self {
        Self {
            id: id.into(),
            species: species.into(),
            level: default_level(),
            hp: max_hp,
            max_hp,
            damage,
        }
    }

    /// Check if the pokemon still has HP
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Stats a trainer may bring into a match: `0 < hp <= max_hp`, `damage >= 0`
    pub fn has_valid_stats(&self) -> bool {
        self.hp > 0 && self.hp <= self.max_hp && self.damage >= 0
    }

    /// Subtract HP, never going below zero
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = self.hp.saturating_sub(amount.max(0)).max(0);
    }

    /// Restore HP, never going above max
    pub fn heal(&mut self, amount: i32) {
        self.hp = self.hp.saturating_add(amount.max(0)).min(self.max_hp);
    }

    /// JSON payload used as an envelope argument
    pub fn to_payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
