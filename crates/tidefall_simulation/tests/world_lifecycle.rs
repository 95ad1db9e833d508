//! World lifecycle: add / remove / deferred body removal / dispose / failed load

mod common;

use bevy::prelude::*;
use common::*;
use tidefall_simulation::physics::layers::environment_groups;
use tidefall_simulation::*;

fn crate_prefab(position: Vec3) -> Prefab<LevelObject> {
    Prefab::new(EntityKind::Object, LevelObject { dynamic: true }).with_body(BodyDesc::dynamic(
        Shape::cuboid(Vec3::splat(0.5)),
        position,
        10.0,
        environment_groups(),
    ))
}

#[test]
fn test_remove_is_idempotent() {
    let mut world = GameWorld::default();
    let events = record_events(&mut world);

    let entity = world.add(crate_prefab(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    assert!(world.contains(entity));
    assert_eq!(count_named(&events, "entityAdded"), 1);

    assert!(world.remove(entity));
    assert!(!world.remove(entity));

    assert!(!world.contains(entity));
    assert_eq!(count_named(&events, "entityRemoved"), 1);
}

#[test]
fn test_body_removal_deferred_until_after_step() {
    let mut world = GameWorld::default();
    let entity = world.add(crate_prefab(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    let handle = world.body(entity).unwrap().handle;

    world.remove(entity);

    // Тело ещё живо в physics world до конца frame
    assert!(world.physics().contains(handle));
    assert!(world.physics().is_pending_removal(handle));

    world.update(DT);

    assert!(!world.physics().contains(handle));
    assert_eq!(world.physics().pending_removal_count(), 0);
    assert_eq!(world.registry().entity_for_body(handle), None);
}

#[test]
fn test_type_indexed_queries() {
    let mut level = level_with(vec![npc([0.0, 1.0, -30.0], "melee"), npc([5.0, 1.0, -30.0], "ranged")]);
    level.triggers.push(trigger("message", [0.0, 1.0, -5.0], [2.0, 2.0, 2.0], Some("hello")));
    level.triggers.push(trigger("death", [30.0, 1.0, 30.0], [2.0, 2.0, 2.0], None));
    level.water.push(water([-30.0, 0.0, -30.0], [4.0, 4.0, 4.0]));

    let (world, player) = world_with(GameplayTuning::default(), &level, &loadout("rifle", &[]));

    assert_eq!(world.player(), Some(player));
    assert_eq!(world.enemies().len(), 2);
    assert_eq!(world.triggers().len(), 2);
    assert_eq!(world.entities_of(EntityKind::WaterVolume).len(), 1);
    assert_eq!(world.entities_of(EntityKind::Object).len(), 1);
    // ground + 2 npc + 2 trigger + water + player
    assert_eq!(world.entity_count(), 7);
}

#[test]
fn test_dispose_stops_everything() {
    let level = level_with(vec![npc([0.0, 1.0, -30.0], "melee")]);
    let (mut world, _) = world_with(GameplayTuning::default(), &level, &loadout("rifle", &["nuke"]));
    run(&mut world, 10);

    let events = record_events(&mut world);
    world.dispose();

    assert!(world.is_disposed());
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.physics().body_count(), 0);
    assert!(world.scheduled_tasks().is_empty());
    let removed = count_named(&events, "entityRemoved");
    assert_eq!(removed, 3);

    // После dispose ничего не выполняется и никто не слушает
    let frame = world.frame();
    world.update(DT);
    assert_eq!(world.frame(), frame);
    assert!(world.add(crate_prefab(Vec3::ZERO)).is_none());
    assert!(matches!(
        world.load_level(&level, &loadout("rifle", &[])),
        Err(LoadError::WorldDisposed)
    ));
    assert_eq!(events.lock().unwrap().len(), removed);
}

#[test]
fn test_failed_load_registers_nothing() {
    let mut world = GameWorld::default();
    let events = record_events(&mut world);
    let level = level_with(vec![npc([0.0, 1.0, -10.0], "melee")]);

    let bad_weapon = loadout("bazooka", &["nuke"]);
    assert!(matches!(world.load_level(&level, &bad_weapon), Err(LoadError::UnknownWeapon(_))));

    let too_many = loadout("blade", &["nuke", "swarm", "wave", "drain", "plating"]);
    assert!(matches!(world.load_level(&level, &too_many), Err(LoadError::TooManyAbilities(5))));

    let mut bad_level = level.clone();
    bad_level.npcs.push(npc([0.0, 1.0, 0.0], "telepathic"));
    assert!(world.load_level(&bad_level, &loadout("blade", &[])).is_err());

    assert!(world.load_level_json("{ not json", r#"{ "weapon": "blade" }"#).is_err());

    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.physics().body_count(), 0);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_fallen_level_object_removed_below_kill_plane() {
    let mut world = GameWorld::default();
    let events = record_events(&mut world);
    let kill_plane = world.tuning().world.kill_plane_y;

    let fallen = world.add(crate_prefab(Vec3::new(0.0, kill_plane - 5.0, 0.0))).unwrap();
    let resting = world.add(crate_prefab(Vec3::new(0.0, 5.0, 0.0))).unwrap();
    let handle = world.body(fallen).unwrap().handle;

    world.update(DT);

    assert!(!world.contains(fallen));
    assert!(world.contains(resting));
    assert!(!world.physics().contains(handle));
    assert_eq!(count_named(&events, "entityRemoved"), 1);

    // Повторно не удаляется
    world.update(DT);
    assert_eq!(count_named(&events, "entityRemoved"), 1);
}

#[test]
fn test_invalid_tuning_rejected_or_replaced() {
    let mut tuning = GameplayTuning::default();
    tuning.ai.dash_duration = 10.0;

    assert!(matches!(
        GameWorld::try_new(tuning.clone()),
        Err(LoadError::Invalid { what, .. }) if what == "ai.dash_duration"
    ));

    let world = GameWorld::new(tuning);
    assert_eq!(world.tuning().ai.dash_duration, GameplayTuning::default().ai.dash_duration);
}
