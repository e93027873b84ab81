//! Player-enemy contact resolution, XP and the death pipeline

use glam::Vec2;
use rand::Rng;

use super::enemy::EnemyState;
use super::state::{GamePhase, GameState, colors, spawn_burst, spawn_text};
use crate::consts::*;

/// Resolve a confirmed overlap between the player and a living enemy.
/// A falling player whose feet are above 70% of the enemy box lands a
/// stomp; any other contact hurts the player.
pub fn resolve_contact(state: &mut GameState, idx: usize) {
    let player = &state.player.body;
    let enemy = &state.enemies[idx].body;
    let from_top = player.vel.y > 0.0 && player.bottom() < enemy.pos.y + enemy.size.y * 0.7;
    if from_top {
        stomp(state, idx);
    } else {
        hurt(state, idx);
    }
}

fn stomp(state: &mut GameState, idx: usize) {
    state.enemies[idx].hp -= 1;
    state.player.body.vel.y = STOMP_BOUNCE;

    if state.enemies[idx].hp <= 0 {
        let center = state.enemies[idx].body.center();
        let is_boss = state.enemies[idx].is_boss;
        state.enemies[idx].state = EnemyState::Dead {
            respawn_at: state.time_ticks + RESPAWN_DELAY_TICKS,
            looted: false,
        };
        spawn_burst(&mut state.particles, &mut state.rng, center, 12, colors::BROWN);
        log::debug!("enemy {} defeated", state.enemies[idx].id);

        let base = if is_boss { 200 } else { 15 };
        grant_xp(state, base + state.stage * 2);
    } else {
        // Survived; shove the enemy away from the player
        let enemy = &state.enemies[idx];
        spawn_text(
            &mut state.floating_texts,
            enemy.body.pos,
            "POW!",
            colors::WHITE,
        );
        let dir = if enemy.body.center().x > state.player.body.center().x {
            1.0
        } else {
            -1.0
        };
        let crown = Vec2::new(enemy.body.center().x, enemy.body.pos.y);
        let enemy = &mut state.enemies[idx];
        enemy.body.vel.x = dir * KNOCKBACK_PUSH;
        enemy.body.vel.y = KNOCKBACK_LIFT;
        spawn_burst(&mut state.particles, &mut state.rng, crown, 5, colors::RED);
    }
}

fn hurt(state: &mut GameState, idx: usize) {
    let enemy_is_boss = state.enemies[idx].is_boss;
    let enemy_x = state.enemies[idx].body.pos.x;

    let player = &mut state.player.body;
    player.vel.y = HURT_LIFT;
    player.vel.x = if player.pos.x < enemy_x {
        -HURT_PUSH
    } else {
        HURT_PUSH
    };

    // Gear soaks damage, but a hit always costs at least one
    let defense = state.stats.defense();
    let base: i32 = if enemy_is_boss { 3 } else { 1 };
    let damage = (base - (defense / 3) as i32).max(1);
    state.stats.hp -= damage;
    spawn_text(
        &mut state.floating_texts,
        state.player.body.pos + Vec2::new(0.0, -20.0),
        format!("-{damage} HP"),
        colors::RED,
    );

    if state.stats.hp <= 0 {
        handle_player_death(state);
    }
}

/// Award XP, resolving any chain of level ups. Each level raises max HP,
/// refills HP and grows the next requirement by half.
pub fn grant_xp(state: &mut GameState, amount: u32) {
    let stats = &mut state.stats;
    stats.xp += amount;
    let mut leveled = false;
    while stats.xp >= stats.max_xp {
        stats.xp -= stats.max_xp;
        stats.level += 1;
        stats.max_hp += 1;
        stats.hp = stats.max_hp;
        stats.max_xp = (stats.max_xp as f32 * 1.5) as u32;
        leveled = true;
    }

    let anchor = state.player.body.pos;
    if leveled {
        spawn_burst(&mut state.particles, &mut state.rng, anchor, 40, colors::GOLD);
        spawn_text(
            &mut state.floating_texts,
            anchor + Vec2::new(0.0, -20.0),
            "LEVEL UP!",
            colors::GOLD,
        );
        spawn_text(
            &mut state.floating_texts,
            anchor + Vec2::new(0.0, -40.0),
            "MAX HP UP!",
            colors::GREEN,
        );
        log::debug!("level {} reached", state.stats.level);
    } else {
        spawn_text(
            &mut state.floating_texts,
            anchor + Vec2::new(0.0, -20.0),
            format!("+{amount} XP"),
            colors::WHITE,
        );
    }
}

/// Take a life and restart at the spawn point, or end the run
pub fn handle_player_death(state: &mut GameState) {
    if state.stats.lives > 1 {
        state.stats.lives -= 1;
        state.stats.hp = state.stats.max_hp;

        // A death also costs one random equipped item
        let filled = state.stats.equipment.filled_slots();
        if !filled.is_empty() {
            let slot = filled[state.rng.random_range(0..filled.len())];
            if let Some(item) = state.stats.equipment.get(slot) {
                let name = item.name.clone();
                state.stats.equipment.clear(slot);
                spawn_text(
                    &mut state.floating_texts,
                    Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y - 40.0),
                    format!("LOST {name}!"),
                    colors::RED,
                );
            }
        }

        state.player.body.pos = Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y);
        state.player.body.vel = Vec2::ZERO;
        state.camera_x = 0.0;
        spawn_text(
            &mut state.floating_texts,
            Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y),
            format!("{} LIVES LEFT!", state.stats.lives),
            colors::WHITE,
        );
        log::info!("player down, {} lives left", state.stats.lives);
    } else {
        state.stats.lives = 0;
        state.phase = GamePhase::GameOver;
        log::info!("game over on stage {}", state.stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::{Enemy, EnemyVariant};
    use crate::sim::loot::{EquipItem, EquipmentSlot};

    /// Fresh run with the roster replaced by a single controlled enemy
    fn state_with_enemy(enemy: Enemy) -> GameState {
        let mut state = GameState::new(1);
        state.enemies.clear();
        state.enemies.push(enemy);
        state
    }

    fn mob_at(x: f32, y: f32) -> Enemy {
        Enemy::mob(99, Vec2::new(x, y), 2.0, EnemyVariant::Blob)
    }

    #[test]
    fn test_falling_contact_is_a_stomp() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.player.body.pos = Vec2::new(400.0, 420.0);
        state.player.body.vel.y = 5.0;

        resolve_contact(&mut state, 0);
        assert!(!state.enemies[0].is_alive());
        assert_eq!(state.player.body.vel.y, STOMP_BOUNCE);
        assert_eq!(state.stats.hp, state.stats.max_hp);
    }

    #[test]
    fn test_kill_schedules_respawn() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.time_ticks = 500;
        state.player.body.pos = Vec2::new(400.0, 420.0);
        state.player.body.vel.y = 5.0;

        resolve_contact(&mut state, 0);
        match state.enemies[0].state {
            EnemyState::Dead { respawn_at, looted } => {
                assert_eq!(respawn_at, 500 + RESPAWN_DELAY_TICKS);
                assert!(!looted);
            }
            EnemyState::Alive => panic!("enemy survived a lethal stomp"),
        }
    }

    #[test]
    fn test_side_contact_hurts_player() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.player.body.pos = Vec2::new(380.0, 448.0);
        state.player.body.vel.y = 0.0;

        resolve_contact(&mut state, 0);
        assert_eq!(state.stats.hp, 2);
        assert_eq!(state.player.body.vel.y, HURT_LIFT);
        // Pushed away from the enemy
        assert_eq!(state.player.body.vel.x, -HURT_PUSH);
        assert!(state.floating_texts.iter().any(|t| t.text == "-1 HP"));
    }

    #[test]
    fn test_rising_contact_is_never_a_stomp() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.player.body.pos = Vec2::new(400.0, 420.0);
        state.player.body.vel.y = -3.0;

        resolve_contact(&mut state, 0);
        assert!(state.enemies[0].is_alive());
        assert_eq!(state.stats.hp, 2);
    }

    #[test]
    fn test_stomp_kill_grants_stage_scaled_xp() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.player.body.pos = Vec2::new(400.0, 420.0);
        state.player.body.vel.y = 5.0;

        resolve_contact(&mut state, 0);
        // 15 base + 2 per stage
        assert_eq!(state.stats.xp, 17);
        assert!(state.floating_texts.iter().any(|t| t.text == "+17 XP"));
    }

    #[test]
    fn test_boss_kill_xp_and_knockback() {
        let mut boss = Enemy::boss(7, Vec2::new(400.0, 416.0), 3, EnemyVariant::Blob);
        boss.body.vel.x = -2.0;
        let mut state = state_with_enemy(boss);
        state.player.body.pos = Vec2::new(360.0, 380.0);
        state.player.body.vel.y = 4.0;

        // First stomp only knocks the boss back
        resolve_contact(&mut state, 0);
        assert!(state.enemies[0].is_alive());
        assert_eq!(state.enemies[0].hp, 2);
        assert_eq!(state.enemies[0].body.vel.x, KNOCKBACK_PUSH);
        assert_eq!(state.enemies[0].body.vel.y, KNOCKBACK_LIFT);
        assert_eq!(state.stats.xp, 0);
        assert!(state.floating_texts.iter().any(|t| t.text == "POW!"));

        // Finish it off
        state.enemies[0].hp = 1;
        state.player.body.vel.y = 4.0;
        resolve_contact(&mut state, 0);
        assert_eq!(state.stats.xp, 202);
    }

    #[test]
    fn test_level_up_thresholds() {
        let mut state = GameState::new(1);
        grant_xp(&mut state, 310);
        assert_eq!(state.stats.level, 2);
        assert_eq!(state.stats.xp, 10);
        assert_eq!(state.stats.max_xp, 450);
        assert_eq!(state.stats.max_hp, 4);
        assert_eq!(state.stats.hp, 4);
        assert!(state.floating_texts.iter().any(|t| t.text == "LEVEL UP!"));
        assert!(state.floating_texts.iter().any(|t| t.text == "MAX HP UP!"));
    }

    #[test]
    fn test_xp_overflow_cascades_levels() {
        let mut state = GameState::new(1);
        grant_xp(&mut state, 755);
        assert_eq!(state.stats.level, 3);
        assert_eq!(state.stats.xp, 5);
        assert_eq!(state.stats.max_xp, 675);
        assert_eq!(state.stats.max_hp, 5);
    }

    #[test]
    fn test_defense_soaks_boss_damage() {
        let mut boss = Enemy::boss(7, Vec2::new(400.0, 416.0), 3, EnemyVariant::Blob);
        boss.body.vel.x = 0.0;
        let mut state = state_with_enemy(boss);
        state.stats.hp = 10;
        state.stats.max_hp = 10;
        state.stats.equipment.set(
            EquipmentSlot::Helmet,
            EquipItem {
                name: "Iron Helmet".into(),
                stat_boost: 6,
                description: String::new(),
            },
        );
        state.player.body.pos = Vec2::new(380.0, 440.0);
        state.player.body.vel.y = 0.0;

        resolve_contact(&mut state, 0);
        // 3 base - 6/3 defense = 1
        assert_eq!(state.stats.hp, 9);
        assert!(state.floating_texts.iter().any(|t| t.text == "-1 HP"));
    }

    #[test]
    fn test_death_strips_one_item_and_respawns() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.stats.hp = 1;
        state.stats.equipment.set(
            EquipmentSlot::Boots,
            EquipItem {
                name: "Steel Boots".into(),
                stat_boost: 3,
                description: String::new(),
            },
        );
        state.player.body.pos = Vec2::new(380.0, 448.0);
        state.player.body.vel.y = 0.0;
        state.camera_x = 600.0;

        resolve_contact(&mut state, 0);
        assert_eq!(state.stats.lives, 2);
        assert_eq!(state.stats.hp, state.stats.max_hp);
        assert!(state.stats.equipment.boots.is_none());
        assert_eq!(
            state.player.body.pos,
            Vec2::new(PLAYER_SPAWN_X, PLAYER_SPAWN_Y)
        );
        assert_eq!(state.camera_x, 0.0);
        assert!(
            state
                .floating_texts
                .iter()
                .any(|t| t.text == "LOST Steel Boots!")
        );
        assert!(
            state
                .floating_texts
                .iter()
                .any(|t| t.text == "2 LIVES LEFT!")
        );
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_death_on_last_life_ends_the_run() {
        let mut state = state_with_enemy(mob_at(400.0, 448.0));
        state.stats.lives = 1;
        state.stats.hp = 1;
        state.player.body.pos = Vec2::new(380.0, 448.0);

        resolve_contact(&mut state, 0);
        assert_eq!(state.stats.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_death_item_choice_is_seeded() {
        let pick = |seed: u64| -> Vec<EquipmentSlot> {
            let mut state = GameState::new(seed);
            for slot in [
                EquipmentSlot::Helmet,
                EquipmentSlot::Armor,
                EquipmentSlot::Boots,
            ] {
                state.stats.equipment.set(
                    slot,
                    EquipItem {
                        name: "gear".into(),
                        stat_boost: 1,
                        description: String::new(),
                    },
                );
            }
            // Burn a few rolls so runs diverge from the generator state
            let _: f32 = state.rng.random();
            handle_player_death(&mut state);
            state.stats.equipment.filled_slots()
        };
        assert_eq!(pick(77), pick(77));
    }
}
