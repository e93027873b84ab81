//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by spawn order)
//! - No rendering or platform dependencies

pub mod combat;
pub mod enemy;
pub mod level;
pub mod loot;
pub mod physics;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyState, EnemyVariant};
pub use level::{StageParams, Tile, TileGrid, generate_level};
pub use loot::{
    EquipItem, Equipment, EquipmentSlot, FallbackLoot, LootDescriptor, LootKind, PendingLoot,
    RemoteLoot, fast_loot, should_equip,
};
pub use physics::{Body, overlaps};
pub use state::{FloatingText, GamePhase, GameState, Particle, Player, PlayerStats, colors};
pub use tick::{TickInput, tick};
