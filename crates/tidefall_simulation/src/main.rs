//! Headless симуляция TIDEFALL
//!
//! Грузит встроенный demo уровень + loadout и гоняет N frames (по умолчанию 1200 = 20 сек).
//! Игрок идёт вперёд и стреляет — достаточно, чтобы AI, снаряды и triggers отработали.

use tidefall_simulation::{init_logger, log_error, log_info, set_log_level, GameEvent, GameWorld, LogLevel};

const LEVEL_JSON: &str = include_str!("../assets/levels/training_grounds.json");
const LOADOUT_JSON: &str = include_str!("../assets/loadouts/default.json");

const FRAME_DT: f32 = 1.0 / 60.0;

fn main() {
    init_logger();
    set_log_level(LogLevel::Info);

    let frames: u64 = std::env::args().nth(1).and_then(|arg| arg.parse().ok()).unwrap_or(1200);

    let mut world = GameWorld::default();
    world.subscribe_all(|event| {
        if matches!(event, GameEvent::NpcDied { .. } | GameEvent::PlayerDied { .. } | GameEvent::LevelCompleted) {
            log_info(&format!("📣 {}", event.name()));
        }
    });

    let player = match world.load_level_json(LEVEL_JSON, LOADOUT_JSON) {
        Ok(player) => player,
        Err(error) => {
            log_error(&format!("❌ Failed to load demo level: {}", error));
            std::process::exit(1);
        }
    };
    log_info(&format!("🚀 Starting TIDEFALL headless simulation ({} frames)", frames));

    for frame in 0..frames {
        {
            let mut input = world.input_mut();
            input.move_axis = bevy::math::Vec2::Y;
            input.fire = frame % 30 == 0;
        }
        world.update(FRAME_DT);

        if frame % 120 == 0 {
            let health = world.health(player).map_or(0.0, |h| h.current);
            log_info(&format!(
                "Frame {}: {} entities, {} NPCs, {} projectiles, player hp {:.0}",
                frame,
                world.entity_count(),
                world.enemies().len(),
                world.projectiles().len(),
                health
            ));
        }
    }

    world.dispose();
    log_info("Simulation complete!");
}
