//! Prefabs: entity = kind + body + components, значения из GameplayTuning

use bevy::prelude::*;

use crate::abilities::AbilityLoadout;
use crate::ai::{AiBrain, AiConfig};
use crate::combat::Weapon;
use crate::components::{
    Actor, EntityKind, Health, LevelObject, LockOn, MovementMode, Npc, NpcAttack, Player, PlayerLife, PlayerMotor,
    Swimmer, TriggerKind, TriggerVolume, WaterVolume,
};
use crate::config::GameplayTuning;
use crate::physics::layers::{environment_groups, npc_groups, player_groups, trigger_groups};
use crate::physics::{BodyDesc, Shape};
use crate::status::StatusEffects;
use crate::world::Prefab;

use super::documents::{ObjectDescriptor, ObjectShape, TriggerDescriptor, WaterDescriptor};

/// Faction игрока
pub const PLAYER_FACTION: u64 = 0;

pub fn player_prefab(
    position: Vec3,
    tuning: &GameplayTuning,
    weapon: Weapon,
    loadout: AbilityLoadout,
) -> Prefab<impl Bundle> {
    let config = &tuning.player;
    let body = BodyDesc::dynamic(Shape::sphere(config.radius), position, config.mass, player_groups())
        .with_linear_damping(config.linear_damping)
        .with_fixed_rotation(true)
        .with_friction(0.0);

    Prefab::new(
        EntityKind::Player,
        (
            Player,
            Actor {
                faction_id: PLAYER_FACTION,
            },
            Health::new(config.max_health),
            PlayerMotor::default(),
            MovementMode::Walk,
            LockOn::default(),
            PlayerLife::default(),
            Swimmer::new(config.linear_damping),
            StatusEffects::default(),
            weapon,
            loadout,
        ),
    )
    .with_body(body)
}

pub fn npc_prefab(
    position: Vec3,
    attack: NpcAttack,
    faction_id: u64,
    water_specialist: bool,
    tuning: &GameplayTuning,
) -> Prefab<impl Bundle> {
    let config = &tuning.ai;
    let body = BodyDesc::dynamic(Shape::sphere(config.radius), position, config.mass, npc_groups())
        .with_linear_damping(config.linear_damping)
        .with_fixed_rotation(true)
        .with_friction(0.0);

    let mut swimmer = Swimmer::new(config.linear_damping);
    swimmer.specialist = water_specialist;

    Prefab::new(
        EntityKind::Npc,
        (
            Npc { attack },
            Actor { faction_id },
            Health::new(config.max_health),
            AiBrain::default(),
            AiConfig::from_tuning(config),
            swimmer,
            StatusEffects::default(),
        ),
    )
    .with_body(body)
}

pub fn object_prefab(object: &ObjectDescriptor) -> Prefab<impl Bundle> {
    let size = Vec3::from_array(object.size);
    let position = Vec3::from_array(object.position);
    let [x, y, z] = object.rotation.map(f32::to_radians);
    let rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);

    let shape = match object.shape {
        ObjectShape::Box => Shape::cuboid(size * 0.5),
        ObjectShape::Sphere => Shape::sphere(size.x * 0.5),
    };

    let dynamic = object.mass > 0.0;
    let body = if dynamic {
        BodyDesc {
            rotation,
            ..BodyDesc::dynamic(shape, position, object.mass, environment_groups())
        }
    } else {
        BodyDesc::fixed(shape, position, rotation, environment_groups())
    };

    Prefab::new(EntityKind::Object, LevelObject { dynamic }).with_body(body)
}

/// Trigger volume: static sensor box. `kind` уже провалидирован документом.
pub fn trigger_prefab(trigger: &TriggerDescriptor, kind: TriggerKind) -> Prefab<impl Bundle> {
    let half_extents = Vec3::from_array(trigger.size) * 0.5;
    let body = BodyDesc::fixed(
        Shape::cuboid(half_extents),
        Vec3::from_array(trigger.position),
        Quat::IDENTITY,
        trigger_groups(),
    )
    .with_sensor(true);

    let entity_kind = match kind {
        TriggerKind::Death => EntityKind::DeathTrigger,
        TriggerKind::Message | TriggerKind::LevelEnd => EntityKind::Trigger,
    };

    let mut volume = TriggerVolume::new(kind);
    if let Some(message) = &trigger.message {
        volume = volume.with_message(message.clone(), trigger.duration);
    }

    Prefab::new(entity_kind, volume).with_body(body)
}

/// Water volume — без физического тела (только overlap тест)
pub fn water_prefab(water: &WaterDescriptor) -> Prefab<impl Bundle> {
    Prefab::new(
        EntityKind::WaterVolume,
        WaterVolume {
            center: Vec3::from_array(water.position),
            half_extents: Vec3::from_array(water.size) * 0.5,
        },
    )
}
