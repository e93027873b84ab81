//! Game state and core simulation types
//!
//! Everything the simulation reads or writes between ticks lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::level::{TileGrid, generate_level};
use super::loot::{Equipment, FallbackLoot, LootDescriptor, PendingLoot, RemoteLoot};
use super::physics::Body;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Loot card on screen; the world is frozen
    LootModal,
    /// Flag reached; a banner counts down to the next stage
    LevelComplete,
    /// Out of lives; waits for an external restart
    GameOver,
}

/// The hero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Last horizontal direction held, 1 or -1
    pub facing: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            body: Body::new(
                Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
                Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            ),
            facing: 1.0,
        }
    }
}

/// Run-wide progression stats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    pub lives: u32,
    pub level: u32,
    pub xp: u32,
    /// XP needed for the next level
    pub max_xp: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub equipment: Equipment,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            lives: INITIAL_LIVES,
            level: 1,
            xp: 0,
            max_xp: 300,
            hp: 3,
            max_hp: 3,
            equipment: Equipment::default(),
        }
    }
}

impl PlayerStats {
    /// Flat damage reduction from equipped gear
    pub fn defense(&self) -> u32 {
        self.equipment.defense()
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Packed 0xRRGGBB
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Floating combat text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub pos: Vec2,
    pub text: String,
    /// Packed 0xRRGGBB
    pub color: u32,
    /// 0-1, decreases over time
    pub life: f32,
    /// Vertical drift per tick
    pub vy: f32,
}

/// Packed 0xRRGGBB palette for effects
pub mod colors {
    pub const WHITE: u32 = 0xFFFFFF;
    pub const RED: u32 = 0xFF0000;
    pub const GOLD: u32 = 0xFFD700;
    pub const GREEN: u32 = 0x00FF00;
    pub const GRAY: u32 = 0x888888;
    pub const BROWN: u32 = 0x8B4513;
    pub const MINT: u32 = 0x88FF88;
}

/// Burst of particles at a point, velocities fanned out by the rng
pub(crate) fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut Pcg32,
    pos: Vec2,
    count: usize,
    color: u32,
) {
    for _ in 0..count {
        particles.push(Particle {
            pos,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 12.0,
                (rng.random::<f32>() - 0.5) * 12.0,
            ),
            color,
            life: 1.0,
            size: 6.0,
        });
    }
}

/// Push a text that drifts up and fades
pub(crate) fn spawn_text(
    texts: &mut Vec<FloatingText>,
    pos: Vec2,
    text: impl Into<String>,
    color: u32,
) {
    texts.push(FloatingText {
        pos,
        text: text.into(),
        color,
        life: 1.0,
        vy: -2.0,
    });
}

/// Complete game state, deterministic given the seed and the input stream
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Every roll in the run draws from this stream
    pub(crate) rng: Pcg32,
    /// Current stage, 1-based
    pub stage: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Ticks left on the stage-clear banner
    pub stage_clear_ticks: u32,
    /// Tile grid of the current stage
    pub grid: TileGrid,
    pub player: Player,
    pub stats: PlayerStats,
    /// Enemy roster in spawn order
    pub enemies: Vec<Enemy>,
    /// Camera left edge in pixels
    pub camera_x: f32,
    /// Resolve mob corpse loot on contact instead of prompting
    pub auto_loot: bool,
    /// Dead enemy the player overlaps, eligible for a manual loot roll
    pub loot_target: Option<u32>,
    /// Loot card shown while the modal is up
    pub found_loot: Option<LootDescriptor>,
    /// In-flight boss loot request
    pub(crate) pending_loot: Option<PendingLoot>,
    /// Boss loot source
    pub(crate) remote_loot: Box<dyn RemoteLoot>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Floating combat text
    pub floating_texts: Vec<FloatingText>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Fresh run on stage 1 with the default offline loot source
    pub fn new(seed: u64) -> Self {
        Self::with_loot_source(seed, Box::new(FallbackLoot))
    }

    /// Fresh run with a custom boss loot source
    pub fn with_loot_source(seed: u64, remote_loot: Box<dyn RemoteLoot>) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            stage: 1,
            time_ticks: 0,
            phase: GamePhase::Playing,
            stage_clear_ticks: 0,
            grid: TileGrid::new(0, 0),
            player: Player::default(),
            stats: PlayerStats::default(),
            enemies: Vec::new(),
            camera_x: 0.0,
            auto_loot: false,
            loot_target: None,
            found_loot: None,
            pending_loot: None,
            remote_loot,
            particles: Vec::new(),
            floating_texts: Vec::new(),
            next_id: 1,
        };
        state.load_stage();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build the current stage and reset the per-stage runtime state.
    /// Effects are cleared first so generation can post its own banners.
    pub fn load_stage(&mut self) {
        self.particles.clear();
        self.floating_texts.clear();
        self.pending_loot = None;
        self.found_loot = None;
        generate_level(self);
        self.phase = GamePhase::Playing;
        self.stats.hp = self.stats.max_hp;
        self.stage_clear_ticks = 0;
    }

    /// Start the run over from stage 1 with fresh stats. The host calls
    /// this to leave the game-over screen.
    pub fn restart(&mut self) {
        self.stage = 1;
        self.stats = PlayerStats::default();
        self.load_stage();
        log::info!("run restarted");
    }
}
