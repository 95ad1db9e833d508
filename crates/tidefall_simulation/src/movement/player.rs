//! Player controller: walk / swim, jump, dash, ground slam
//!
//! Velocity-driven (как AI): горизонталь задаётся из input каждый frame,
//! вертикаль остаётся за физикой (кроме jump / slam / swim).

use bevy::prelude::*;

use crate::abilities::effects::{apply_knockback_area, Knockback};
use crate::combat::KnockbackTargets;
use crate::components::{Health, MovementMode, Player, PlayerMotor};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::input::PlayerInput;
use crate::math::{camera_basis, horizontal};
use crate::physics::layers::MASK_GROUND;
use crate::physics::{BodyHandle, PhysicsBody, PhysicsWorld};
use crate::status::StatusEffects;

/// Downward raycast: стоит ли тело на геометрии
pub fn is_grounded(physics: &PhysicsWorld, handle: BodyHandle, position: Vec3, radius: f32, check: f32) -> bool {
    let end = position - Vec3::Y * (radius + check);
    physics.raycast(position, end, MASK_GROUND, Some(handle)).is_some()
}

/// Желаемое направление walk (горизонталь, длина ≤ 1)
pub fn walk_direction(input: &PlayerInput) -> Vec3 {
    let (forward, right) = camera_basis(input.camera_forward());
    (forward * input.move_axis.y + right * input.move_axis.x).clamp_length_max(1.0)
}

/// Желаемое направление swim (полное 3D относительно камеры)
pub fn swim_direction(input: &PlayerInput) -> Vec3 {
    let forward = input.camera_forward();
    let right = camera_basis(forward).1;
    let vertical = match (input.swim_up, input.swim_down) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    };
    (forward * input.move_axis.y + right * input.move_axis.x + Vec3::Y * vertical).clamp_length_max(1.0)
}

/// Система: player movement
pub fn player_movement_system(
    time: Res<Time>,
    input: Res<PlayerInput>,
    tuning: Res<GameplayTuning>,
    mut physics: ResMut<PhysicsWorld>,
    mut players: Query<
        (Entity, &PhysicsBody, &mut PlayerMotor, &MovementMode, &Health, Option<&StatusEffects>),
        With<Player>,
    >,
    mut npcs: KnockbackTargets,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();
    let config = &tuning.player;

    for (entity, body, mut motor, mode, health, effects) in players.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let (Some(position), Some(velocity)) = (physics.position(body.handle), physics.velocity(body.handle)) else {
            continue;
        };

        motor.grounded = is_grounded(&physics, body.handle, position, config.radius, config.ground_check_distance);
        motor.dash_cooldown = (motor.dash_cooldown - delta).max(0.0);

        // Slam: приземление → урон + knockback вокруг
        if motor.slamming && (motor.grounded || *mode == MovementMode::Swim) {
            motor.slamming = false;
            if motor.grounded {
                ground_slam(entity, position, &tuning, &mut physics, &mut npcs, &mut events);
            }
        }

        let speed_multiplier = effects.map_or(1.0, StatusEffects::speed_multiplier);
        let (forward, right) = camera_basis(input.camera_forward());

        // Dash старт (оба режима)
        if input.dash && motor.dash_cooldown <= 0.0 && !motor.is_dashing() {
            let wish = walk_direction(&input);
            let direction = wish.try_normalize().unwrap_or(forward);
            motor.dash_direction = direction;
            motor.dash_remaining = config.dash_duration;
            motor.dash_cooldown = config.dash_cooldown;

            events.write(GameEvent::PlayerDashed {
                entity,
                forward_dot: direction.dot(forward),
                right_dot: direction.dot(right),
            });
            crate::logger::log(&format!("💨 Player dashed ({:.2}, {:.2})", direction.dot(forward), direction.dot(right)));
        }

        if motor.is_dashing() {
            motor.dash_remaining = (motor.dash_remaining - delta).max(0.0);
            let dash = motor.dash_direction * config.dash_speed;
            physics.set_velocity(body.handle, Vec3::new(dash.x, velocity.y, dash.z));
            continue;
        }

        match mode {
            MovementMode::Swim => {
                let swim = swim_direction(&input) * config.swim_speed * speed_multiplier;
                // Без input по вертикали — вертикаль отдаём buoyancy
                let vertical = if input.swim_up || input.swim_down { swim.y } else { velocity.y };
                physics.set_velocity(body.handle, Vec3::new(swim.x, vertical, swim.z));
            }
            MovementMode::Walk => {
                let walk = walk_direction(&input) * config.walk_speed * speed_multiplier;
                let mut vertical = velocity.y;

                if input.jump && motor.grounded {
                    vertical = config.jump_speed;
                    events.write(GameEvent::PlayerJumped { entity });
                    crate::logger::log("🦘 Player jumped");
                }

                if input.slam && !motor.grounded && !motor.slamming {
                    motor.slamming = true;
                    vertical = -config.slam_speed;
                    crate::logger::log("⬇️ Ground slam started");
                }

                let horizontal_velocity = if motor.slamming { Vec3::ZERO } else { walk };
                physics.set_velocity(
                    body.handle,
                    Vec3::new(horizontal_velocity.x, vertical, horizontal_velocity.z),
                );
            }
        }
    }
}

fn ground_slam(
    entity: Entity,
    position: Vec3,
    tuning: &GameplayTuning,
    physics: &mut PhysicsWorld,
    npcs: &mut KnockbackTargets,
    events: &mut EventWriter<GameEvent>,
) {
    let config = &tuning.player;
    let radius = config.slam_radius;
    let knockback = Knockback {
        damage: config.slam_damage,
        strength: config.slam_knockback,
        duration: config.slam_knockback_duration,
        lift: tuning.world.knockback_lift,
    };
    let affected = apply_knockback_area(physics, npcs, events, knockback, |target| {
        if target.distance(position) > radius {
            return None;
        }
        Some(horizontal(target - position).try_normalize().unwrap_or(Vec3::X))
    });

    events.write(GameEvent::PlayerGroundSlammed { entity, position });
    crate::logger::log(&format!("💥 Ground slam at {:?} hit {} NPC(s)", position, affected));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_direction_is_camera_relative() {
        let input = PlayerInput {
            move_axis: Vec2::new(1.0, 1.0),
            look_direction: Vec3::NEG_Z,
            ..Default::default()
        };
        let direction = walk_direction(&input);

        assert!((direction.length() - 1.0).abs() < 1e-5);
        assert!(direction.x > 0.0 && direction.z < 0.0);
        assert_eq!(direction.y, 0.0);
    }

    #[test]
    fn test_swim_direction_follows_pitch() {
        let input = PlayerInput {
            move_axis: Vec2::Y,
            look_direction: Vec3::new(0.0, -1.0, -1.0),
            ..Default::default()
        };
        assert!(swim_direction(&input).y < 0.0);

        let rising = PlayerInput {
            swim_up: true,
            ..Default::default()
        };
        assert_eq!(swim_direction(&rising), Vec3::Y);
    }
}
