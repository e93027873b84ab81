//! Fixed-timestep simulation loop
//!
//! One `tick` call advances the world a single step. The pipeline order is
//! fixed: player physics, hazard and win checks, camera, enemies, loot
//! bookkeeping, effect aging. All randomness draws from the state's seeded
//! stream, so a seed plus an input log replays a run exactly.

use glam::Vec2;

use super::combat;
use super::enemy::{self, EnemyState};
use super::loot::{EquipItem, EquipmentSlot, LootKind, fast_loot, should_equip};
use super::physics;
use super::state::{GamePhase, GameState, colors, spawn_text};
use crate::consts::*;

/// Control signals sampled by the host once per tick. Movement flags are
/// level-triggered (held keys); the action flags are edge-triggered and
/// should be raised for a single tick per press.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Loot the corpse under the player
    pub interact: bool,
    /// Take the item on the loot card
    pub accept_loot: bool,
    /// Dismiss the loot card
    pub decline_loot: bool,
}

/// Advance the simulation by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    match state.phase {
        GamePhase::Playing => {
            tick_playing(state, input);
            state.time_ticks += 1;
        }
        GamePhase::LootModal => tick_loot_modal(state, input),
        GamePhase::LevelComplete => tick_level_complete(state),
        GamePhase::GameOver => {}
    }
}

fn tick_playing(state: &mut GameState, input: &TickInput) {
    step_player(state, input);

    // Falling out of the world costs a life
    if state.player.body.pos.y > LEVEL_HEIGHT as f32 * TILE_SIZE + 100.0 {
        combat::handle_player_death(state);
    }

    // Reaching the flagpole wins the stage; the rest of the tick still
    // runs so the camera and enemies settle under the banner
    let flag_x = (state.grid.width() as f32 - 5.0) * TILE_SIZE;
    if state.phase == GamePhase::Playing && state.player.body.pos.x >= flag_x {
        state.phase = GamePhase::LevelComplete;
        state.stage_clear_ticks = STAGE_CLEAR_TICKS;
        log::info!("stage {} clear", state.stage);
    }

    update_camera(state);
    update_enemies(state, input);
    age_effects(state);
}

fn step_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;

    if input.right {
        player.body.vel.x += MOVE_ACCEL;
        player.facing = 1.0;
    }
    if input.left {
        player.body.vel.x -= MOVE_ACCEL;
        player.facing = -1.0;
    }
    if player.body.vel.x.abs() > MOVE_SPEED {
        player.body.vel.x = player.facing * MOVE_SPEED;
    }

    // Jump only from rest on solid ground
    if input.jump && player.body.vel.y == 0.0 {
        let feet = player.body.bottom() + 2.0;
        if state.grid.solid_at(player.body.pos.x + 4.0, feet)
            || state.grid.solid_at(player.body.right() - 4.0, feet)
        {
            player.body.vel.y = JUMP_FORCE;
            // Boots add a little height
            if state.stats.equipment.get(EquipmentSlot::Boots).is_some() {
                player.body.vel.y += BOOTS_JUMP_BONUS;
            }
        }
    }

    player.body.vel.x *= FRICTION;
    player.body.vel.y += GRAVITY;

    physics::step_horizontal(&mut player.body, &state.grid);
    physics::step_vertical(&mut player.body, &state.grid);
}

fn update_camera(state: &mut GameState) {
    let body = &state.player.body;
    let target = body.pos.x - VIEW_WIDTH / 2.0 + body.size.x / 2.0;
    let max = (state.grid.pixel_width() - VIEW_WIDTH).max(0.0);
    state.camera_x += (target - state.camera_x) * CAMERA_LERP;
    state.camera_x = state.camera_x.clamp(0.0, max);
}

fn update_enemies(state: &mut GameState, input: &TickInput) {
    let mut nearby_loot: Option<u32> = None;

    for i in 0..state.enemies.len() {
        let lateral = state.enemies[i].body.pos.x - state.player.body.pos.x;
        if lateral.abs() > ENEMY_ACTIVE_RANGE {
            continue;
        }

        match state.enemies[i].state {
            EnemyState::Dead { respawn_at, looted } => {
                if state.time_ticks > respawn_at {
                    let stage = state.stage;
                    enemy::respawn(
                        &mut state.enemies[i],
                        stage,
                        &mut state.rng,
                        &mut state.particles,
                    );
                } else {
                    if !looted && physics::overlaps(&state.player.body, &state.enemies[i].body) {
                        if state.auto_loot && !state.enemies[i].is_boss {
                            auto_loot(state, i);
                        } else {
                            nearby_loot = Some(state.enemies[i].id);
                        }
                    }
                    enemy::settle_corpse(&mut state.enemies[i], &state.grid);
                }
            }
            EnemyState::Alive => {
                enemy::update_alive(&mut state.enemies[i], &state.grid, state.stage);
                if physics::overlaps(&state.player.body, &state.enemies[i].body) {
                    combat::resolve_contact(state, i);
                }
            }
        }
    }

    state.loot_target = nearby_loot;

    // Loot the flagged corpse; only an active run can open the card
    if input.interact && state.phase == GamePhase::Playing {
        if let Some(id) = state.loot_target {
            open_loot_modal(state, id);
        }
    }
}

/// Resolve a mob corpse roll on contact, no prompt
fn auto_loot(state: &mut GameState, idx: usize) {
    let loot = fast_loot(&mut state.rng, state.stats.level);
    if let EnemyState::Dead { looted, .. } = &mut state.enemies[idx].state {
        *looted = true;
    }

    let anchor = state.player.body.pos + Vec2::new(0.0, -20.0);
    if should_equip(&state.stats.equipment, &loot) {
        if loot.kind == LootKind::Life {
            state.stats.lives += 1;
            spawn_text(&mut state.floating_texts, anchor, "AUTO: 1-UP!", colors::GREEN);
        } else if let Some(slot) = loot.kind.slot() {
            state.stats.equipment.set(slot, EquipItem::from(&loot));
            spawn_text(
                &mut state.floating_texts,
                anchor,
                format!("AUTO: {}", loot.name),
                colors::GREEN,
            );
        }
    } else {
        spawn_text(
            &mut state.floating_texts,
            anchor,
            format!("DISCARDED: {}", loot.name),
            colors::GRAY,
        );
    }
}

/// Flag the corpse as claimed and put the loot card up. Boss rolls go
/// through the remote source; mob rolls resolve on the spot.
fn open_loot_modal(state: &mut GameState, id: u32) {
    let Some(idx) = state.enemies.iter().position(|e| e.id == id) else {
        return;
    };
    if !state.enemies[idx].lootable() {
        return;
    }
    if let EnemyState::Dead { looted, .. } = &mut state.enemies[idx].state {
        *looted = true;
    }

    state.phase = GamePhase::LootModal;
    if state.enemies[idx].is_boss {
        let level = state.stats.level;
        state.found_loot = None;
        state.pending_loot = Some(state.remote_loot.request(level));
        log::info!("boss loot requested at level {level}");
    } else {
        state.found_loot = Some(fast_loot(&mut state.rng, state.stats.level));
    }
}

fn tick_loot_modal(state: &mut GameState, input: &TickInput) {
    // A boss roll may still be in flight
    if state.found_loot.is_none() {
        if let Some(pending) = &mut state.pending_loot {
            if let Some(loot) = pending.poll() {
                state.found_loot = Some(loot);
                state.pending_loot = None;
            }
        }
    }

    // The card stays up until an explicit choice
    if !(input.accept_loot || input.decline_loot) {
        return;
    }
    let Some(loot) = state.found_loot.take() else {
        return;
    };

    if input.accept_loot {
        if loot.kind == LootKind::Life {
            state.stats.lives += 1;
            spawn_text(
                &mut state.floating_texts,
                state.player.body.pos,
                "1-UP!",
                colors::RED,
            );
        } else if let Some(slot) = loot.kind.slot() {
            state.stats.equipment.set(slot, EquipItem::from(&loot));
        }
        log::debug!("loot accepted: {}", loot.name);
    }
    state.phase = GamePhase::Playing;
}

fn tick_level_complete(state: &mut GameState) {
    age_effects(state);
    if state.stage_clear_ticks > 0 {
        state.stage_clear_ticks -= 1;
    }
    if state.stage_clear_ticks == 0 {
        state.stage += 1;
        state.load_stage();
    }
}

fn age_effects(state: &mut GameState) {
    for p in &mut state.particles {
        p.pos += p.vel;
        p.life -= 0.05;
    }
    state.particles.retain(|p| p.life > 0.0);

    for t in &mut state.floating_texts {
        t.pos.y += t.vy;
        t.life -= 0.02;
    }
    state.floating_texts.retain(|t| t.life > 0.0);
}
