//! Cape Quest - a side-scrolling platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, physics, enemies,
//!   combat, loot, game state)
//!
//! The crate is headless: a host feeds `TickInput` into `sim::tick` at a
//! fixed rate and renders whatever it finds in the returned state.

pub mod sim;

pub use sim::{GamePhase, GameState, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Simulation rate in ticks per second
    pub const TICK_RATE: u32 = 60;

    /// Tile edge length in pixels
    pub const TILE_SIZE: f32 = 48.0;
    /// Stage height in tile rows
    pub const LEVEL_HEIGHT: usize = 12;
    /// Stage width in tile columns before the per-stage bonus
    pub const LEVEL_WIDTH_BASE: usize = 150;
    /// Stages per world; the last one is the boss arena
    pub const STAGES_PER_WORLD: u32 = 13;

    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.65;
    /// Jump impulse (negative is up)
    pub const JUMP_FORCE: f32 = -14.0;
    /// Extra jump impulse while boots are equipped
    pub const BOOTS_JUMP_BONUS: f32 = -1.0;
    /// Player horizontal speed cap
    pub const MOVE_SPEED: f32 = 6.0;
    /// Horizontal acceleration per tick while a direction is held
    pub const MOVE_ACCEL: f32 = 0.8;
    /// Horizontal velocity damping per tick
    pub const FRICTION: f32 = 0.85;

    /// Enemy patrol speed before stage scaling
    pub const ENEMY_SPEED_BASE: f32 = 2.0;
    /// Enemies farther than this from the player are not simulated
    pub const ENEMY_ACTIVE_RANGE: f32 = 1000.0;
    /// Ticks a defeated enemy stays down (30 seconds)
    pub const RESPAWN_DELAY_TICKS: u64 = 30 * TICK_RATE as u64;

    /// Player collision box
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    /// Respawn point at the start of every stage
    pub const PLAYER_SPAWN_X: f32 = 100.0;
    pub const PLAYER_SPAWN_Y: f32 = 100.0;

    /// Lives on a fresh run
    pub const INITIAL_LIVES: u32 = 3;

    /// Upward impulse after a successful stomp
    pub const STOMP_BOUNCE: f32 = -10.0;
    /// Impulses applied to the player on a side hit
    pub const HURT_LIFT: f32 = -5.0;
    pub const HURT_PUSH: f32 = 8.0;
    /// Impulses applied to an enemy that survives a stomp
    pub const KNOCKBACK_PUSH: f32 = 8.0;
    pub const KNOCKBACK_LIFT: f32 = -4.0;

    /// Viewport width the camera clamps against
    pub const VIEW_WIDTH: f32 = 800.0;
    /// Camera chase factor per tick
    pub const CAMERA_LERP: f32 = 0.1;

    /// Ticks between flagpole touch and the next stage (4 seconds)
    pub const STAGE_CLEAR_TICKS: u32 = 4 * TICK_RATE;
}

/// Tile column or row containing a pixel coordinate
#[inline]
pub fn tile_coord(v: f32) -> i32 {
    (v / consts::TILE_SIZE).floor() as i32
}

/// Pixel coordinate of a tile's top-left corner
#[inline]
pub fn tile_origin(index: i32) -> f32 {
    index as f32 * consts::TILE_SIZE
}
