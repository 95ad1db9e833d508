//! Общие helpers для integration тестов (headless GameWorld)

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use tidefall_simulation::level::{NpcDescriptor, ObjectDescriptor, ObjectShape, TriggerDescriptor, WaterDescriptor};
use tidefall_simulation::*;

pub const DT: f32 = 1.0 / 60.0;

/// Большой пол: верхняя грань на y = 0
pub fn ground() -> ObjectDescriptor {
    ObjectDescriptor {
        shape: ObjectShape::Box,
        size: [200.0, 1.0, 200.0],
        position: [0.0, -0.5, 0.0],
        rotation: [0.0; 3],
        mass: 0.0,
    }
}

pub fn npc(position: [f32; 3], attack: &str) -> NpcDescriptor {
    NpcDescriptor {
        position,
        team: 1,
        attack: attack.to_string(),
        water_specialist: false,
    }
}

pub fn trigger(kind: &str, position: [f32; 3], size: [f32; 3], message: Option<&str>) -> TriggerDescriptor {
    TriggerDescriptor {
        kind: kind.to_string(),
        size,
        position,
        message: message.map(str::to_string),
        duration: 3.0,
    }
}

pub fn water(position: [f32; 3], size: [f32; 3]) -> WaterDescriptor {
    WaterDescriptor { position, size }
}

/// Уровень с полом, игрок в (0, 1, 0)
pub fn level_with(npcs: Vec<NpcDescriptor>) -> LevelDocument {
    LevelDocument {
        name: "test".to_string(),
        spawn: [0.0, 1.0, 0.0],
        death_respawn: Some([0.0, 1.0, 5.0]),
        lighting: LevelLighting::default(),
        objects: vec![ground()],
        npcs,
        triggers: Vec::new(),
        water: Vec::new(),
    }
}

pub fn loadout(weapon: &str, abilities: &[&str]) -> LoadoutDocument {
    LoadoutDocument {
        weapon: weapon.to_string(),
        abilities: abilities.iter().map(|id| id.to_string()).collect(),
    }
}

/// Мир + загруженный уровень → (world, player)
pub fn world_with(tuning: GameplayTuning, level: &LevelDocument, loadout: &LoadoutDocument) -> (GameWorld, Entity) {
    let mut world = GameWorld::new(tuning);
    let player = world.load_level(level, loadout).expect("level should load");
    (world, player)
}

pub fn run(world: &mut GameWorld, frames: usize) {
    for _ in 0..frames {
        world.update(DT);
    }
}

/// Записывать все события bus'а
pub fn record_events(world: &mut GameWorld) -> Arc<Mutex<Vec<GameEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    world.subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
    log
}

pub fn count_named(log: &Arc<Mutex<Vec<GameEvent>>>, name: &str) -> usize {
    log.lock().unwrap().iter().filter(|event| event.name() == name).count()
}

pub fn ai_state(world: &GameWorld, npc: Entity) -> AiState {
    world.get::<AiBrain>(npc).expect("npc has brain").state
}
