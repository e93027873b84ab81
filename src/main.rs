//! Cape Quest entry point
//!
//! Headless demo: seeds a run and lets a simple autopilot play it, logging
//! milestones along the way. Useful for soak-testing the loop and eyeballing
//! generation across many stages.

use std::env;

use cape_quest::consts::*;
use cape_quest::sim::{
    GamePhase, GameState, LootDescriptor, PendingLoot, RemoteLoot, TickInput, tick,
};

/// Boss loot source that parses canned descriptor payloads off-thread,
/// standing in for a real loot service.
#[derive(Debug)]
struct CannedVault;

const VAULT_PAYLOADS: [&str; 3] = [
    r#"{"name":"Meteor Greaves","type":"PANTS","statBoost":7,"description":"They trail sparks."}"#,
    r#"{"name":"Wyrmplate","type":"ARMOR","statBoost":9,"description":"Scales of an old wyrm."}"#,
    r#"{"name":"Band of Embers","type":"ACCESSORY","statBoost":8,"description":"Smolders faintly."}"#,
];

impl RemoteLoot for CannedVault {
    fn request(&mut self, level: u32) -> PendingLoot {
        let payload = VAULT_PAYLOADS[level as usize % VAULT_PAYLOADS.len()];
        PendingLoot::spawn(move || serde_json::from_str::<LootDescriptor>(payload))
    }
}

/// Hold right, hop when progress stalls, grab every loot prompt
fn autopilot(state: &GameState, ticks: u64, recent_x: &[f32; 16]) -> TickInput {
    if state.phase == GamePhase::LootModal {
        return TickInput {
            accept_loot: state.found_loot.is_some(),
            ..Default::default()
        };
    }

    // Stalled when barely any ground was covered over the last 16 ticks
    let oldest = recent_x[(ticks % 16) as usize];
    let stalled = ticks > 16 && (state.player.body.pos.x - oldest).abs() < 24.0;

    TickInput {
        right: true,
        jump: stalled || ticks % 90 == 0,
        interact: state.loot_target.is_some(),
        ..Default::default()
    }
}

fn main() {
    env_logger::init();

    let seed: u64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(2024);
    let max_ticks: u64 = env::args()
        .nth(2)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10 * 60 * TICK_RATE as u64);

    log::info!("Cape Quest (headless) starting with seed {seed}");

    let mut state = GameState::with_loot_source(seed, Box::new(CannedVault));
    state.auto_loot = true;

    let mut recent_x = [0.0f32; 16];
    let mut ticks = 0u64;
    while ticks < max_ticks {
        let input = autopilot(&state, ticks, &recent_x);
        tick(&mut state, &input);
        recent_x[(ticks % 16) as usize] = state.player.body.pos.x;
        ticks += 1;

        if state.phase == GamePhase::GameOver {
            log::info!("out of lives after {ticks} ticks");
            break;
        }
    }

    let summary = serde_json::json!({
        "seed": seed,
        "ticks": ticks,
        "stage": state.stage,
        "world": state.stage.div_ceil(STAGES_PER_WORLD),
        "level": state.stats.level,
        "xp": state.stats.xp,
        "lives": state.stats.lives,
        "equipment": state.stats.equipment,
    });
    println!("{summary}");
}
