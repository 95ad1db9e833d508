//! Player movement через GameWorld: jump, dash (camera-relative dots), ground slam

mod common;

use bevy::prelude::*;
use common::*;
use tidefall_simulation::*;

/// Игрок спавнится в воздухе (y = 1), ждём приземления
const SETTLE_FRAMES: usize = 40;

fn dashes(log: &std::sync::Arc<std::sync::Mutex<Vec<GameEvent>>>) -> Vec<(f32, f32)> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            GameEvent::PlayerDashed { forward_dot, right_dot, .. } => Some((*forward_dot, *right_dot)),
            _ => None,
        })
        .collect()
}

/// NPC остаются в Idle (detection меньше дистанции до игрока)
fn passive_npcs() -> GameplayTuning {
    let mut tuning = GameplayTuning::default();
    tuning.ai.detection_range = 1.0;
    tuning
}

#[test]
fn test_jump_only_from_ground() {
    let (mut world, player) = world_with(GameplayTuning::default(), &level_with(vec![]), &loadout("rifle", &[]));
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    world.input_mut().jump = true;
    world.update(DT);
    assert_eq!(count_named(&events, "playerJumped"), 1);
    assert_eq!(world.velocity(player).unwrap().y, GameplayTuning::default().player.jump_speed);

    // В воздухе второй прыжок игнорируется
    run(&mut world, 10);
    world.input_mut().jump = true;
    world.update(DT);
    assert_eq!(count_named(&events, "playerJumped"), 1);
    assert!(world.get::<PlayerMotor>(player).map_or(false, |motor| !motor.grounded));
}

#[test]
fn test_dash_reports_camera_relative_direction() {
    let (mut world, _) = world_with(GameplayTuning::default(), &level_with(vec![]), &loadout("rifle", &[]));
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    // Strafe вправо при камере в -Z
    {
        let mut input = world.input_mut();
        input.move_axis = Vec2::new(1.0, 0.0);
        input.dash = true;
    }
    world.update(DT);

    let recorded = dashes(&events);
    assert_eq!(recorded.len(), 1);
    let (forward_dot, right_dot) = recorded[0];
    assert!(forward_dot.abs() < 1e-5, "forward_dot = {forward_dot}");
    assert!((right_dot - 1.0).abs() < 1e-5, "right_dot = {right_dot}");
}

#[test]
fn test_dash_without_input_goes_forward() {
    let (mut world, player) = world_with(GameplayTuning::default(), &level_with(vec![]), &loadout("rifle", &[]));
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    world.input_mut().dash = true;
    world.update(DT);

    let (forward_dot, right_dot) = dashes(&events)[0];
    assert!((forward_dot - 1.0).abs() < 1e-5);
    assert!(right_dot.abs() < 1e-5);
    // dash_speed вдоль -Z
    let velocity = world.velocity(player).unwrap();
    assert!((velocity.z + GameplayTuning::default().player.dash_speed).abs() < 1e-3);
}

#[test]
fn test_dash_respects_cooldown() {
    let (mut world, _) = world_with(GameplayTuning::default(), &level_with(vec![]), &loadout("rifle", &[]));
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    world.input_mut().dash = true;
    world.update(DT);
    // dash_cooldown = 1 сек
    run(&mut world, 30);
    world.input_mut().dash = true;
    world.update(DT);
    assert_eq!(count_named(&events, "playerDashed"), 1);

    run(&mut world, 40);
    world.input_mut().dash = true;
    world.update(DT);
    assert_eq!(count_named(&events, "playerDashed"), 2);
}

#[test]
fn test_ground_slam_on_landing_hits_nearby_npc() {
    let mut tuning = passive_npcs();
    tuning.player.slam_speed = 12.0;
    let level = level_with(vec![npc([0.0, 1.0, -3.0], "melee")]);
    let (mut world, player) = world_with(tuning.clone(), &level, &loadout("rifle", &[]));
    let npc = world.enemies()[0];
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    // Slam на земле не стартует
    world.input_mut().slam = true;
    world.update(DT);
    assert!(!world.get::<PlayerMotor>(player).unwrap().slamming);

    world.input_mut().jump = true;
    world.update(DT);
    run(&mut world, 10);
    world.input_mut().slam = true;
    world.update(DT);
    assert!(world.get::<PlayerMotor>(player).unwrap().slamming);
    assert_eq!(world.velocity(player).unwrap().y, -12.0);
    assert_eq!(count_named(&events, "playerGroundSlammed"), 0);

    let mut landed = false;
    for _ in 0..60 {
        world.update(DT);
        if count_named(&events, "playerGroundSlammed") > 0 {
            landed = true;
            break;
        }
    }
    assert!(landed, "slam never landed");
    assert_eq!(count_named(&events, "playerGroundSlammed"), 1);
    assert!(!world.get::<PlayerMotor>(player).unwrap().slamming);

    let health = world.health(npc).unwrap();
    assert_eq!(health.current, health.max - tuning.player.slam_damage);
    assert!(world.get::<AiBrain>(npc).unwrap().is_knocked_back());
    // Отброшен от игрока (−Z) и чуть вверх
    let velocity = world.velocity(npc).unwrap();
    assert!(velocity.z < 0.0);
    assert!(velocity.y > 0.0);
}
