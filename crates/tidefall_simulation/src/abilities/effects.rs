//! Эффекты способностей (то, что происходит после успешного gate)

use bevy::prelude::*;

use crate::combat::damage::deal_damage;
use crate::combat::projectile::{queue_projectile, Homing, Projectile, ProjectileType};
use crate::combat::KnockbackTargets;
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::math::{horizontal, in_rectangle};
use crate::physics::PhysicsWorld;

/// Nuke: один homing снаряд со splash
pub fn spawn_nuke(
    commands: &mut Commands,
    tuning: &GameplayTuning,
    owner: Entity,
    origin: Vec3,
    aim: Vec3,
    target: Option<Entity>,
) {
    let nuke = &tuning.abilities.nuke;
    let direction = aim.try_normalize().unwrap_or(Vec3::NEG_Z);
    let projectile = Projectile {
        projectile_type: ProjectileType::Nuke,
        owner,
        damage: nuke.damage,
        splash_radius: nuke.splash_radius,
        lifetime: nuke.lifetime,
        homing: Some(Homing {
            target,
            speed: nuke.speed,
            turn_rate: nuke.turn_rate,
        }),
        hostile_to_player: false,
    };
    queue_projectile(
        commands,
        projectile,
        origin + direction * tuning.projectiles.muzzle_offset,
        direction * nuke.speed,
        tuning.projectiles.player_projectile_radius,
    );
    crate::logger::log(&format!("☢️ Nuke launched by {:?} → {:?}", owner, target));
}

/// Одна ракета swarm серии (index задаёт угол в веере)
pub fn spawn_swarm_missile(
    commands: &mut Commands,
    tuning: &GameplayTuning,
    owner: Entity,
    origin: Vec3,
    aim: Vec3,
    target: Option<Entity>,
    index: u32,
) {
    let swarm = &tuning.abilities.swarm;
    let center = (swarm.count.max(1) - 1) as f32 / 2.0;
    let yaw = (index as f32 - center) * swarm.spread;
    let direction = Quat::from_rotation_y(yaw) * aim.try_normalize().unwrap_or(Vec3::NEG_Z);

    let projectile = Projectile {
        projectile_type: ProjectileType::Swarm,
        owner,
        damage: swarm.damage,
        splash_radius: 0.0,
        lifetime: swarm.lifetime,
        homing: Some(Homing {
            target,
            speed: swarm.speed,
            turn_rate: swarm.turn_rate,
        }),
        hostile_to_player: false,
    };
    queue_projectile(
        commands,
        projectile,
        origin + direction * tuning.projectiles.muzzle_offset,
        direction * swarm.speed,
        tuning.projectiles.player_projectile_radius,
    );
}

/// Параметры area knockback (wave, ground slam)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub damage: f32,
    /// Изменение скорости (м/с) вдоль направления
    pub strength: f32,
    /// AI приостановлен на это время
    pub duration: f32,
    /// Вертикальная добавка к направлению до нормализации
    pub lift: f32,
}

/// Урон + knockback всем живым NPC, для которых `hit` вернул направление
pub fn apply_knockback_area(
    physics: &mut PhysicsWorld,
    npcs: &mut KnockbackTargets,
    events: &mut EventWriter<GameEvent>,
    knockback: Knockback,
    hit: impl Fn(Vec3) -> Option<Vec3>,
) -> usize {
    let mut affected = 0;
    for (entity, body, mut health, effects, mut brain) in npcs.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        let Some(direction) = hit(position) else {
            continue;
        };

        deal_damage(entity, &mut health, effects, knockback.damage, events);

        let mass = physics.body(body.handle).map_or(1.0, |b| b.mass);
        let push = knockback_direction(direction, knockback.lift) * knockback.strength * mass;
        physics.apply_impulse(body.handle, push);
        brain.apply_knockback(knockback.duration);
        affected += 1;
    }
    affected
}

/// Направление knockback: горизонталь + подброс, единичной длины
pub fn knockback_direction(direction: Vec3, lift: f32) -> Vec3 {
    (direction + Vec3::Y * lift).normalize_or_zero()
}

/// Wave: прямоугольник перед игроком, knockback вдоль направления взгляда
pub fn apply_wave(
    origin: Vec3,
    aim: Vec3,
    tuning: &GameplayTuning,
    physics: &mut PhysicsWorld,
    npcs: &mut KnockbackTargets,
    events: &mut EventWriter<GameEvent>,
) -> usize {
    let wave = &tuning.abilities.wave;
    let direction = horizontal(aim).try_normalize().unwrap_or(Vec3::NEG_Z);
    let knockback = Knockback {
        damage: wave.damage,
        strength: wave.knockback_impulse,
        duration: wave.knockback_duration,
        lift: tuning.world.knockback_lift,
    };
    let affected = apply_knockback_area(physics, npcs, events, knockback, |position| {
        in_rectangle(origin, direction, position, wave.length, wave.half_width).then_some(direction)
    });

    events.write(GameEvent::WavePowerUsed {
        position: origin,
        direction,
    });
    crate::logger::log(&format!("🌊 Wave hit {} NPC(s)", affected));
    affected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knockback_lift_tilts_direction_up() {
        let flat = knockback_direction(Vec3::NEG_Z, 0.0);
        assert_eq!(flat, Vec3::NEG_Z);

        let lifted = knockback_direction(Vec3::NEG_Z, 0.3);
        assert!((lifted.length() - 1.0).abs() < 1e-5);
        assert!((lifted.y / -lifted.z - 0.3).abs() < 1e-5);
    }
}
