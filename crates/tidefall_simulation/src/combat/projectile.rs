//! Projectiles: transient entities с собственным телом
//!
//! - Homing (nuke, swarm): gravity_scale 0, поворот к цели не быстрее turn_rate
//! - EnemyBolt: баллистика, обычная гравитация
//!
//! Детонация по contact (из `CollisionEvents`) или по истечении lifetime.
//! Удаление всегда через `remove_entity` → тело уходит в deferred очередь.

use bevy::prelude::*;

use crate::combat::damage::deal_damage;
use crate::components::{EntityKind, Health, Player};
use crate::events::GameEvent;
use crate::math::steer_towards;
use crate::physics::layers::{enemy_projectile_groups, player_projectile_groups};
use crate::physics::{BodyDesc, CollisionEvents, PhysicsBody, PhysicsWorld, Shape};
use crate::status::StatusEffects;
use crate::world::{remove_entity, Prefab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileType {
    Nuke,
    Swarm,
    EnemyBolt,
}

impl ProjectileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectileType::Nuke => "nuke",
            ProjectileType::Swarm => "swarm",
            ProjectileType::EnemyBolt => "enemy_bolt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homing {
    /// None — летит прямо (цель потеряна или не была выбрана)
    pub target: Option<Entity>,
    pub speed: f32,
    /// Рад/с
    pub turn_rate: f32,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub projectile_type: ProjectileType,
    pub owner: Entity,
    pub damage: f32,
    /// 0 — только прямое попадание
    pub splash_radius: f32,
    /// Осталось жить (секунды)
    pub lifetime: f32,
    pub homing: Option<Homing>,
    /// true — снаряд NPC (бьёт игрока), false — снаряд игрока (бьёт NPC)
    pub hostile_to_player: bool,
}

impl Projectile {
    /// Может ли снаряд ранить эту сторону
    pub fn damages(&self, is_player: bool) -> bool {
        self.hostile_to_player == is_player
    }
}

/// Prefab снаряда: dynamic sensor sphere
pub fn projectile_prefab(projectile: Projectile, position: Vec3, velocity: Vec3, radius: f32) -> Prefab<Projectile> {
    let groups = if projectile.hostile_to_player {
        enemy_projectile_groups()
    } else {
        player_projectile_groups()
    };
    let gravity_scale = if projectile.homing.is_some() { 0.0 } else { 1.0 };

    let body = BodyDesc::dynamic(Shape::sphere(radius), position, 1.0, groups)
        .with_sensor(true)
        .with_gravity_scale(gravity_scale)
        .with_velocity(velocity);

    Prefab::new(EntityKind::Projectile, projectile).with_body(body)
}

/// Поставить spawn снаряда в очередь команд (применяется в конце schedule)
pub fn queue_projectile(commands: &mut Commands, projectile: Projectile, position: Vec3, velocity: Vec3, radius: f32) {
    let prefab = projectile_prefab(projectile, position, velocity, radius);
    commands.queue(move |world: &mut World| {
        crate::world::add_prefab(world, prefab);
    });
}

/// Система: homing, lifetime, детонация
pub fn update_projectiles(
    time: Res<Time>,
    collisions: Res<CollisionEvents>,
    mut physics: ResMut<PhysicsWorld>,
    mut projectiles: Query<(Entity, &PhysicsBody, &mut Projectile)>,
    mut targets: Query<(Entity, &PhysicsBody, &mut Health, Option<&StatusEffects>, Has<Player>), Without<Projectile>>,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    for (entity, body, mut projectile) in projectiles.iter_mut() {
        let Some(position) = physics.position(body.handle) else {
            continue;
        };

        // Contact → детонация (владелец и свои не считаются)
        let impact = collisions
            .involving(entity)
            .map(|(other, _)| other)
            .find(|other| *other != projectile.owner);

        if let Some(hit) = impact {
            detonate(entity, &projectile, position, Some(hit), &physics, &mut targets, &mut events);
            despawn(&mut commands, entity);
            continue;
        }

        projectile.lifetime -= delta;
        if projectile.lifetime <= 0.0 {
            crate::logger::log(&format!("⌛ Projectile {:?} ({}) expired", entity, projectile.projectile_type.as_str()));
            despawn(&mut commands, entity);
            continue;
        }

        let Some(homing) = projectile.homing else {
            continue;
        };
        let target_position = homing.target.and_then(|target| {
            let (_, target_body, health, _, _) = targets.get(target).ok()?;
            if health.is_dead() {
                return None;
            }
            physics.position(target_body.handle)
        });
        let Some(target_position) = target_position else {
            continue;
        };
        let velocity = physics.velocity(body.handle).unwrap_or(Vec3::ZERO);
        let steered = steer_towards(velocity, target_position - position, homing.speed, homing.turn_rate * delta);
        physics.set_velocity(body.handle, steered);
    }
}

/// Прямой урон цели контакта + splash по радиусу (линейный falloff)
fn detonate(
    entity: Entity,
    projectile: &Projectile,
    position: Vec3,
    direct_hit: Option<Entity>,
    physics: &PhysicsWorld,
    targets: &mut Query<(Entity, &PhysicsBody, &mut Health, Option<&StatusEffects>, Has<Player>), Without<Projectile>>,
    events: &mut EventWriter<GameEvent>,
) {
    if let Some(hit) = direct_hit {
        if let Ok((target, _, mut health, effects, is_player)) = targets.get_mut(hit) {
            if projectile.damages(is_player) {
                deal_damage(target, &mut health, effects, projectile.damage, events);
            }
        }
    }

    if projectile.splash_radius > 0.0 {
        for (target, target_body, mut health, effects, is_player) in targets.iter_mut() {
            if Some(target) == direct_hit || !projectile.damages(is_player) || health.is_dead() {
                continue;
            }
            let Some(target_position) = physics.position(target_body.handle) else {
                continue;
            };
            let distance = target_position.distance(position);
            if distance > projectile.splash_radius {
                continue;
            }
            let falloff = 1.0 - distance / projectile.splash_radius;
            deal_damage(target, &mut health, effects, projectile.damage * falloff, events);
        }
    }

    events.write(GameEvent::ProjectileDetonated {
        projectile_type: projectile.projectile_type,
        position,
    });
    crate::logger::log(&format!(
        "💥 Projectile {:?} ({}) detonated at {:?}",
        entity,
        projectile.projectile_type.as_str(),
        position
    ));
}

fn despawn(commands: &mut Commands, entity: Entity) {
    commands.queue(move |world: &mut World| {
        remove_entity(world, entity);
    });
}
