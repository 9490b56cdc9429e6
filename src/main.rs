//! HAILEY host binary
//!
//! Opens a 960x600 window, polls the keyboard, ticks the play state once
//! per frame and draws it. Level files in `assets/levels/` replace the
//! built-in set on native targets when present.

use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use macroquad::prelude::*;
use hailey::config::{GameConfig, CONFIG_PATH};
use hailey::game::{draw_play_state, Cue, Events, PickupKind, PlayState};
use hailey::input::InputState;
use hailey::world::LevelCatalog;
use hailey::VERSION;

/// Frame times above this are clamped so a stall doesn't tunnel bodies.
const MAX_FRAME_TIME: f32 = 1.0 / 20.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("HAILEY v{}", VERSION),
        window_width: 960,
        window_height: 600,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn load_catalog() -> Option<LevelCatalog> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let dir = std::path::Path::new("assets/levels");
        if dir.is_dir() {
            match LevelCatalog::load_dir(dir) {
                Ok(catalog) => return Some(catalog),
                Err(e) => log::warn!("ignoring {}: {}", dir.display(), e),
            }
        }
    }
    match LevelCatalog::builtin() {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            log::error!("built-in levels failed to load: {}", e);
            None
        }
    }
}

/// Report what the last tick did.
fn log_frame_events(events: &Events) {
    for cue in events.cues.iter() {
        match cue {
            Cue::Music(track) => log::debug!("music: track {}", track),
            other => log::debug!("sfx: {:?}", other),
        }
    }
    for pickup in events.pickups.iter() {
        match pickup.kind {
            PickupKind::Coin => log::debug!("coin {} collected", pickup.item),
            PickupKind::Key => log::info!("key collected"),
        }
    }
    for stomp in events.stomps.iter() {
        log::debug!("spider {} stomped", stomp.enemy);
    }
    for death in events.hero_deaths.iter() {
        log::info!("hero died: {:?}", death.cause);
    }
    for door in events.door_opened.iter() {
        log::info!("door {} opened", door.door);
    }
    for pulled in events.switch_pulled.iter() {
        log::debug!("switch {} dropped pull-door {}", pulled.switch, pulled.pull_door);
    }
    for transition in events.transitions.iter() {
        log::info!("{:?}: level {} (epoch {})", transition.reason, transition.level, transition.epoch);
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load_or_default(CONFIG_PATH);
    let Some(catalog) = load_catalog() else {
        return;
    };

    let seed = (macroquad::miniquad::date::now() * 1000.0) as u64;
    let mut state = match PlayState::new(config, catalog, StdRng::seed_from_u64(seed)) {
        Ok(state) => state,
        Err(e) => {
            log::error!("cannot start: {}", e);
            return;
        }
    };
    let mut input = InputState::new(state.config.timing.jump_hold_ms);

    log::info!("=== HAILEY v{} ({} levels) ===", VERSION, state.session.level_count());

    loop {
        let dt = get_frame_time().min(MAX_FRAME_TIME);
        let frame = input.poll(dt);
        state.tick(&frame, dt);

        log_frame_events(&state.events);

        draw_play_state(&state);
        next_frame().await;
    }
}
