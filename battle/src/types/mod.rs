//! Domain types for a two-player battle

mod item;
mod pokemon;
mod seat;
mod trainer;

pub use item::{Item, ItemEffect};
pub use pokemon::Pokemon;
pub use seat::{Pair, Seat};
pub use trainer::TrainerBattleStatus;
