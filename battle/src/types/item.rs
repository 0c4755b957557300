//! Inventory items

use serde::{Deserialize, Serialize};

use super::pokemon::Pokemon;

/// What an item does when used on the selected pokemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemEffect {
    /// Restore HP on a pokemon that is still alive
    Potion { heal: i32 },
    /// Bring a fainted pokemon back at half HP
    Revive,
}

impl ItemEffect {
    /// Potions must heal a positive amount
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Potion { heal } => *heal > 0,
            Self::Revive => true,
        }
    }

    /// Apply to a pokemon. Returns false if the effect does not apply.
    pub fn apply(&self, pokemon: &mut Pokemon) -> bool {
        match self {
            Self::Potion { heal } => {
                if !pokemon.is_alive() || pokemon.hp >= pokemon.max_hp {
                    return false;
                }
                pokemon.heal(*heal);
                true
            }
            Self::Revive => {
                if pokemon.is_alive() {
                    return false;
                }
                pokemon.hp = (pokemon.max_hp / 2).max(1);
                true
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub effect: ItemEffect,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, effect: ItemEffect) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            effect,
        }
    }

    /// JSON payload used as an envelope argument
    pub fn to_payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
