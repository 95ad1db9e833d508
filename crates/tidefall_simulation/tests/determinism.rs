//! Детерминизм: одинаковый seed + одинаковый input → одинаковое состояние

mod common;

use bevy::prelude::*;
use common::DT;
use tidefall_simulation::*;

const LEVEL_JSON: &str = include_str!("../assets/levels/training_grounds.json");
const LOADOUT_JSON: &str = include_str!("../assets/loadouts/default.json");

fn scripted_run(frames: u64) -> (Vec<u8>, Vec<&'static str>) {
    let mut world = GameWorld::default();
    let names = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&names);
    world.subscribe_all(move |event| sink.lock().unwrap().push(event.name()));
    world.load_level_json(LEVEL_JSON, LOADOUT_JSON).expect("demo level loads");

    for frame in 0..frames {
        {
            let mut input = world.input_mut();
            input.move_axis = Vec2::new(if frame % 120 < 60 { 0.5 } else { -0.5 }, 1.0);
            input.fire = frame % 20 == 0;
            input.cast = frame == 90;
            input.dash = frame == 150;
        }
        world.update(DT);
    }

    let snapshot = world.snapshot();
    let events = names.lock().unwrap().clone();
    (snapshot, events)
}

#[test]
fn test_same_input_same_snapshot() {
    let (snapshot_a, events_a) = scripted_run(300);
    let (snapshot_b, events_b) = scripted_run(300);

    assert!(!snapshot_a.is_empty());
    assert_eq!(snapshot_a, snapshot_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn test_demo_level_loads() {
    let mut world = GameWorld::default();
    let player = world.load_level_json(LEVEL_JSON, LOADOUT_JSON).unwrap();

    assert_eq!(world.player(), Some(player));
    assert_eq!(world.enemies().len(), 4);
    assert_eq!(world.entities_of(EntityKind::WaterVolume).len(), 1);
    assert_eq!(world.triggers().len(), 3);

    let loadout = world.get::<AbilityLoadout>(player).unwrap();
    assert_eq!(loadout.slots().len(), 4);
}
