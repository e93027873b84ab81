//! Enemy entities, patrol AI and the downed/respawn cycle

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::TileGrid;
use super::physics::{self, Body};
use super::state::{Particle, colors, spawn_burst};
use crate::consts::*;
use crate::{tile_coord, tile_origin};

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Patrolling and dangerous
    Alive,
    /// Downed; stands back up once the timer expires
    Dead {
        /// Tick at which the enemy returns
        respawn_at: u64,
        /// A loot roll has already been claimed from this corpse
        looted: bool,
    },
}

/// Creature family; worlds rotate through the three
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyVariant {
    Blob,
    Crab,
    Eye,
}

impl EnemyVariant {
    pub fn for_world(world: u32) -> Self {
        match world % 3 {
            1 => Self::Blob,
            2 => Self::Crab,
            _ => Self::Eye,
        }
    }
}

/// A patrolling walker or a boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    /// Spawn point, reused on respawn
    pub home: Vec2,
    pub hp: i32,
    pub max_hp: i32,
    pub is_boss: bool,
    pub variant: EnemyVariant,
    pub state: EnemyState,
}

impl Enemy {
    /// Regular 32x32 walker
    pub fn mob(id: u32, pos: Vec2, vel_x: f32, variant: EnemyVariant) -> Self {
        let mut body = Body::new(pos, Vec2::splat(32.0));
        body.vel.x = vel_x;
        Self {
            id,
            body,
            home: pos,
            hp: 1,
            max_hp: 1,
            is_boss: false,
            variant,
            state: EnemyState::Alive,
        }
    }

    /// 64x64 boss, opening with a charge toward the player side
    pub fn boss(id: u32, pos: Vec2, hp: i32, variant: EnemyVariant) -> Self {
        let mut body = Body::new(pos, Vec2::splat(64.0));
        body.vel.x = -ENEMY_SPEED_BASE * 1.5;
        Self {
            id,
            body,
            home: pos,
            hp,
            max_hp: hp,
            is_boss: true,
            variant,
            state: EnemyState::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    /// Corpse that still has a loot roll available
    pub fn lootable(&self) -> bool {
        matches!(self.state, EnemyState::Dead { looted: false, .. })
    }
}

/// Patrol speed for a stage; knockback decays back toward this
pub fn patrol_speed(stage: u32) -> f32 {
    ENEMY_SPEED_BASE + (stage % 10) as f32 * 0.1
}

/// One tick of patrol AI and movement for a living enemy
pub fn update_alive(enemy: &mut Enemy, grid: &TileGrid, stage: u32) {
    let body = &mut enemy.body;
    body.vel.y += GRAVITY;

    // Knockback decays toward patrol speed; a slow crawl snaps back up
    let target = patrol_speed(stage);
    let speed = body.vel.x.abs();
    if speed > target {
        body.vel.x *= 0.9;
    } else if speed < target && speed > 0.1 {
        body.vel.x = body.vel.x.signum() * target;
    }

    let grounded = physics::on_ground(body, grid);
    let next_x = body.pos.x + body.vel.x;
    let lead_x = if body.vel.x > 0.0 {
        next_x + body.size.x
    } else {
        next_x
    };

    // Wall ahead at foot height
    let wall = grid.solid_at(lead_x, body.pos.y + body.size.y - 4.0);
    // Pit ahead; ignored while the enemy is still flying from a knockback
    let pit = grounded
        && body.vel.x.abs() <= target * 1.5
        && !grid.solid_at(lead_x, body.bottom() + 2.0);

    if wall || pit {
        body.vel.x = -body.vel.x;
    } else {
        body.pos.x = next_x;
    }

    physics::step_vertical(body, grid);
}

/// Corpse physics: keep falling until ground is underneath
pub fn settle_corpse(enemy: &mut Enemy, grid: &TileGrid) {
    let body = &mut enemy.body;
    if !grid.solid_at(body.pos.x, body.bottom() + 2.0) {
        body.vel.y += GRAVITY;
        body.pos.y += body.vel.y;
        if grid.solid_at(body.pos.x, body.bottom()) {
            body.pos.y = tile_origin(tile_coord(body.pos.y)) + (TILE_SIZE - body.size.y);
            body.vel.y = 0.0;
        }
    }
}

/// Stand a downed enemy back up at its spawn point
pub fn respawn(enemy: &mut Enemy, stage: u32, rng: &mut Pcg32, particles: &mut Vec<Particle>) {
    enemy.state = EnemyState::Alive;
    enemy.hp = enemy.max_hp;
    enemy.body.pos = enemy.home;
    let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    enemy.body.vel = Vec2::new(patrol_speed(stage) * dir, 0.0);
    spawn_burst(particles, rng, enemy.body.center(), 12, colors::MINT);
}
