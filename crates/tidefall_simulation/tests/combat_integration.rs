//! Оружие через GameWorld: blade hit timing, rifle hitscan, отложенные задачи мёртвого owner'а

mod common;

use bevy::prelude::*;
use common::*;
use tidefall_simulation::*;

const SETTLE_FRAMES: usize = 40;

/// NPC не реагируют (detection меньше дистанции до игрока)
fn passive_npcs() -> GameplayTuning {
    let mut tuning = GameplayTuning::default();
    tuning.ai.detection_range = 1.0;
    tuning
}

fn aim_at(world: &mut GameWorld, player: Entity, target: Entity) {
    let eye = world.position(player).unwrap() + Vec3::Y * world.tuning().player.eye_height;
    let target = world.position(target).unwrap();
    world.input_mut().look_direction = (target - eye).normalize();
}

#[test]
fn test_blade_hit_lands_hit_delay_after_swing() {
    let level = level_with(vec![npc([0.0, 1.0, -2.0], "melee")]);
    let (mut world, _) = world_with(passive_npcs(), &level, &loadout("blade", &[]));
    let npc = world.enemies()[0];
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);
    let max = world.health(npc).unwrap().max;

    world.input_mut().fire = true;
    world.update(DT);
    assert_eq!(count_named(&events, "weaponFired"), 1);

    // hit_delay 150 ms = 9 frames при 60 Hz
    for frame in 1..9 {
        world.update(DT);
        assert_eq!(world.health(npc).unwrap().current, max, "hit landed early on frame {frame}");
    }
    world.update(DT);
    assert_eq!(world.health(npc).unwrap().current, max - GameplayTuning::default().weapons.blade.damage);
    assert_eq!(count_named(&events, "entityTookDamage"), 1);
    assert!(world.scheduled_tasks().is_empty());
}

#[test]
fn test_blade_swing_misses_target_behind() {
    let level = level_with(vec![npc([0.0, 1.0, 2.0], "melee")]);
    let (mut world, _) = world_with(passive_npcs(), &level, &loadout("blade", &[]));
    let npc = world.enemies()[0];
    run(&mut world, SETTLE_FRAMES);

    world.input_mut().fire = true;
    run(&mut world, 12);

    let health = world.health(npc).unwrap();
    assert_eq!(health.current, health.max);
}

#[test]
fn test_rifle_hitscan_damages_npc() {
    let level = level_with(vec![npc([0.0, 1.0, -10.0], "ranged")]);
    let (mut world, player) = world_with(passive_npcs(), &level, &loadout("rifle", &[]));
    let npc = world.enemies()[0];
    run(&mut world, SETTLE_FRAMES);
    let events = record_events(&mut world);

    aim_at(&mut world, player, npc);
    world.input_mut().fire = true;
    world.update(DT);

    let health = world.health(npc).unwrap();
    assert_eq!(health.current, health.max - GameplayTuning::default().weapons.rifle.damage);

    let hit_point = events.lock().unwrap().iter().find_map(|event| match event {
        GameEvent::WeaponFired { weapon: WeaponId::Rifle, hit_point } => Some(*hit_point),
        _ => None,
    });
    let hit_point = hit_point.expect("weaponFired emitted").expect("shot hit something");
    assert!(hit_point.distance(world.position(npc).unwrap()) < 0.6);
    assert_eq!(world.get::<Weapon>(player).unwrap().ammo(), Some((23, 96)));
}

#[test]
fn test_rifle_shot_blocked_by_wall() {
    let mut level = level_with(vec![npc([0.0, 1.0, -10.0], "ranged")]);
    let mut wall = ground();
    wall.size = [6.0, 4.0, 0.5];
    wall.position = [0.0, 2.0, -5.0];
    level.objects.push(wall);
    let (mut world, player) = world_with(passive_npcs(), &level, &loadout("rifle", &[]));
    let npc = world.enemies()[0];
    run(&mut world, SETTLE_FRAMES);

    aim_at(&mut world, player, npc);
    world.input_mut().fire = true;
    world.update(DT);

    let health = world.health(npc).unwrap();
    assert_eq!(health.current, health.max);
}

#[test]
fn test_swarm_tasks_skipped_after_owner_dies() {
    let (mut world, player) = world_with(GameplayTuning::default(), &level_with(vec![]), &loadout("rifle", &["swarm"]));
    run(&mut world, 2);
    let events = record_events(&mut world);

    world.input_mut().cast = true;
    world.update(DT);
    let spawned = || {
        events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| matches!(event, GameEvent::EntityAdded { kind: EntityKind::Projectile, .. }))
            .count()
    };
    assert_eq!(spawned(), 1);
    assert_eq!(world.scheduled_tasks().len(), 4);

    world.get_mut::<Health>(player).unwrap().current = 0.0;
    // Все 4 задачи созрели (4 × 0.12 сек), respawn ещё не случился
    run(&mut world, 40);

    assert_eq!(spawned(), 1);
    assert!(world.scheduled_tasks().is_empty());
    assert_eq!(count_named(&events, "playerDied"), 1);
}
