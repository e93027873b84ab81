//! Procedural stage generation
//!
//! Stages are built column by column with safety rules layered over the
//! random rolls: bordered edges, flat start and finish zones, no chained
//! pits, and every pit followed by a landing wide enough to recover on.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyVariant};
use super::state::{GameState, colors, spawn_text};
use crate::consts::*;
use crate::tile_coord;

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    /// Terrain, platforms, the flagpole base
    Ground,
    /// Raised brick obstacle
    Block,
}

impl Tile {
    /// Anything but air stops movement
    #[inline]
    pub fn is_solid(self) -> bool {
        self != Tile::Empty
    }
}

/// Row-major tile grid with pixel-space queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            tiles: vec![Tile::Empty; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Stage width in pixels
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    /// Tile at (col, row); anything out of bounds reads as open air
    pub fn tile(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return Tile::Empty;
        }
        self.tiles[row as usize * self.width + col as usize]
    }

    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        debug_assert!(col < self.width && row < self.height);
        self.tiles[row * self.width + col] = tile;
    }

    /// True when the tile containing the pixel coordinate is solid
    #[inline]
    pub fn solid_at(&self, x: f32, y: f32) -> bool {
        self.tile(tile_coord(x), tile_coord(y)).is_solid()
    }
}

/// Stage knobs derived from the stage number
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageParams {
    /// 1-based world number
    pub world: u32,
    /// 1-based position within the world
    pub sub_stage: u32,
    pub is_boss: bool,
    /// Stage width in tile columns
    pub width: usize,
    /// Chance per column decision of opening a pit
    pub pit_chance: f32,
    /// Column step of the floor enemy pass
    pub enemy_stride: usize,
}

impl StageParams {
    pub fn for_stage(stage: u32) -> Self {
        debug_assert!(stage >= 1);
        let world = stage.div_ceil(STAGES_PER_WORLD);
        let sub_stage = (stage - 1) % STAGES_PER_WORLD + 1;
        let is_boss = sub_stage == STAGES_PER_WORLD;
        let width = if is_boss {
            60
        } else {
            LEVEL_WIDTH_BASE + sub_stage as usize * 10
        };
        let pit_chance = if is_boss {
            0.0
        } else {
            0.1 + sub_stage as f32 * 0.03
        };
        let enemy_stride = (10.0 - sub_stage as f32 * 0.5).max(8.0).round() as usize;
        Self {
            world,
            sub_stage,
            is_boss,
            width,
            pit_chance,
            enemy_stride,
        }
    }
}

/// Build the stage for `state.stage`, replacing the grid and enemy roster
/// and resetting the player to the spawn point.
pub fn generate_level(state: &mut GameState) {
    let params = StageParams::for_stage(state.stage);
    let width = params.width;
    let variant = EnemyVariant::for_world(params.world);

    let mut grid = TileGrid::new(width, LEVEL_HEIGHT);
    state.enemies.clear();

    // Columns flat_end.. are the guaranteed-solid finish zone
    let flat_end = width - 20;
    let mut x = 0usize;
    let mut just_did_pit = false;

    // --- TERRAIN ---
    while x < width {
        // Flat start and finish zones
        if x < 15 || x >= flat_end {
            grid.set(x, LEVEL_HEIGHT - 1, Tile::Ground);
            grid.set(x, LEVEL_HEIGHT - 2, Tile::Ground);
            x += 1;
            continue;
        }

        // Pits never chain and never reach into the finish zone
        let dig_pit = !just_did_pit
            && x + 3 <= flat_end
            && state.rng.random::<f32>() < params.pit_chance;
        if dig_pit {
            x += 2 + state.rng.random_range(0..2);
            just_did_pit = true;
            continue;
        }

        // Ground segment; a pit landing is at least 4 columns wide
        let min_len = if just_did_pit { 4 } else { 1 };
        let seg_len = min_len.max(1 + state.rng.random_range(0..4));
        for i in 0..seg_len {
            if x >= flat_end {
                break;
            }
            grid.set(x, LEVEL_HEIGHT - 1, Tile::Ground);
            grid.set(x, LEVEL_HEIGHT - 2, Tile::Ground);

            // Raised features; the first two columns of a pit landing stay clear
            if !just_did_pit || i > 1 {
                let roll: f32 = state.rng.random();
                if !params.is_boss && roll > 0.96 {
                    // Two-tall brick obstacle
                    grid.set(x, LEVEL_HEIGHT - 3, Tile::Block);
                    grid.set(x, LEVEL_HEIGHT - 4, Tile::Block);
                } else if !params.is_boss && roll > 0.8 {
                    // Floating platform, sometimes two tiles wide
                    let h = 4 + state.rng.random_range(0..2);
                    let py = LEVEL_HEIGHT - h;
                    grid.set(x, py, Tile::Ground);
                    if x + 1 < width && state.rng.random::<f32>() > 0.5 {
                        grid.set(x + 1, py, Tile::Ground);
                    }
                    if state.rng.random::<f32>() > 0.7 {
                        let id = state.next_entity_id();
                        let pos = Vec2::new(x as f32 * TILE_SIZE, (py - 1) as f32 * TILE_SIZE);
                        state
                            .enemies
                            .push(Enemy::mob(id, pos, ENEMY_SPEED_BASE, variant));
                    }
                }
            }
            x += 1;
        }
        just_did_pit = false;
    }

    // --- BOUNDS AND FLAG ---
    for row in 0..LEVEL_HEIGHT {
        grid.set(0, row, Tile::Ground);
        grid.set(width - 1, row, Tile::Ground);
    }
    grid.set(width - 5, LEVEL_HEIGHT - 3, Tile::Ground);

    // --- ENEMIES ---
    if params.is_boss {
        let pos = Vec2::new(
            (width - 15) as f32 * TILE_SIZE,
            (LEVEL_HEIGHT - 3) as f32 * TILE_SIZE - 32.0,
        );
        let hp = 3 + params.world as i32;
        let id = state.next_entity_id();
        state.enemies.push(Enemy::boss(id, pos, hp, variant));
        spawn_text(
            &mut state.floating_texts,
            Vec2::new(100.0, 100.0),
            "BOSS INCOMING!",
            colors::RED,
        );
        log::info!("stage {}: boss arena, boss hp {}", state.stage, hp);
    } else {
        // Floor enemy pass over the open ground
        let mut ex = 20;
        while ex < width.saturating_sub(25) {
            if grid.tile(ex as i32, LEVEL_HEIGHT as i32 - 2) == Tile::Ground
                && grid.tile(ex as i32, LEVEL_HEIGHT as i32 - 3) == Tile::Empty
                && state.rng.random::<f32>() > 0.3
            {
                let id = state.next_entity_id();
                let pos = Vec2::new(
                    ex as f32 * TILE_SIZE,
                    (LEVEL_HEIGHT - 3) as f32 * TILE_SIZE,
                );
                state
                    .enemies
                    .push(Enemy::mob(id, pos, -ENEMY_SPEED_BASE, variant));
            }
            ex += params.enemy_stride;
        }
    }

    log::info!(
        "stage {} generated: {}x{} tiles, {} enemies",
        state.stage,
        width,
        LEVEL_HEIGHT,
        state.enemies.len()
    );

    state.grid = grid;
    state.player.body.pos = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
    state.player.body.vel = Vec2::ZERO;
    state.camera_x = 0.0;
    state.loot_target = None;
}
