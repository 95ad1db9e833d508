//! AI decision system (throttled cadence)
//!
//! Perception (distance + line-of-sight raycast) и весь decision step выполняются
//! с частотой `decision_hz`, а не каждый frame. Результат — `desired_velocity`
//! + разовые действия (атака, рывок, прыжок).

use bevy::prelude::*;

use crate::ai::components::{next_state, AiBrain, AiConfig, AiState, Perception};
use crate::combat::damage::deal_damage;
use crate::combat::projectile::{queue_projectile, Projectile, ProjectileType};
use crate::components::{Health, Npc, NpcAttack, Player};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::math::{ballistic_or_direct, horizontal, predict_target};
use crate::physics::layers::{MASK_GROUND, MASK_NPC_SIGHT};
use crate::physics::{BodyHandle, PhysicsBody, PhysicsWorld};
use crate::status::StatusEffects;

/// То, что NPC знает об игроке в этом frame
#[derive(Debug, Clone, Copy)]
struct PlayerSnapshot {
    entity: Entity,
    handle: BodyHandle,
    position: Vec3,
    velocity: Vec3,
}

/// Система: AI perception + FSM + combat decisions
pub fn ai_decision_system(
    time: Res<Time>,
    tuning: Res<GameplayTuning>,
    mut physics: ResMut<PhysicsWorld>,
    mut npcs: Query<(Entity, &PhysicsBody, &Npc, &AiConfig, &mut AiBrain, &Health), Without<Player>>,
    mut players: Query<(Entity, &PhysicsBody, &mut Health, Option<&StatusEffects>), With<Player>>,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    let player = players.iter().find_map(|(entity, body, health, _)| {
        if health.is_dead() {
            return None;
        }
        Some(PlayerSnapshot {
            entity,
            handle: body.handle,
            position: physics.position(body.handle)?,
            velocity: physics.velocity(body.handle).unwrap_or(Vec3::ZERO),
        })
    });

    for (entity, body, npc, config, mut brain, health) in npcs.iter_mut() {
        if health.is_dead() {
            continue;
        }
        brain.tick_timers(delta);

        // Knockback полностью выключает AI
        if brain.is_knocked_back() {
            continue;
        }
        if !brain.decision_due(delta, config.decision_interval) {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };

        // 1. Perception
        let eye = position + Vec3::Y * config.eye_height;
        brain.perception = perceive(&physics, body.handle, eye, player, config, brain.perception.last_known_position);

        // 2. FSM transition
        let previous = brain.state;
        brain.state = next_state(previous, &brain.perception, config, position);
        if brain.state != previous {
            crate::logger::log(&format!(
                "🧠 NPC {:?}: {} → {} (distance {:.1})",
                entity,
                previous.name(),
                brain.state.name(),
                brain.perception.distance
            ));
        }

        // 3. Действия состояния
        let state = brain.state;
        let desired = match state {
            AiState::Idle => Vec3::ZERO,
            AiState::Searching { last_known } => seek(position, last_known, config.move_speed),
            AiState::Combat => {
                let desired = combat_movement(&mut brain, position, config);
                if let Some(player) = player {
                    if brain.perception.has_line_of_sight && brain.attack_timer <= 0.0 {
                        let attacked = match npc.attack {
                            NpcAttack::Melee => {
                                melee_attack(entity, &brain.perception, player, config, &mut players, &mut events)
                            }
                            NpcAttack::Ranged => {
                                ranged_attack(entity, eye, player, &tuning, &mut commands);
                                true
                            }
                        };
                        if attacked {
                            brain.attack_timer = config.attack_cooldown;
                        }
                    }
                    try_dash(&mut brain, &mut physics, body.handle, position, player.position, config);
                }
                desired
            }
        };
        brain.desired_velocity = desired;

        // 4. Obstacle avoidance: препятствие впереди + на земле → прыжок
        try_jump(&mut brain, &mut physics, body.handle, position, config);
    }
}

fn perceive(
    physics: &PhysicsWorld,
    own_body: BodyHandle,
    eye: Vec3,
    player: Option<PlayerSnapshot>,
    config: &AiConfig,
    last_known: Option<Vec3>,
) -> Perception {
    let Some(player) = player else {
        return Perception {
            last_known_position: last_known,
            ..Default::default()
        };
    };

    let distance = eye.distance(player.position);
    // Raycast только в пределах lose_sight_range
    let has_line_of_sight = distance <= config.lose_sight_range
        && physics
            .raycast(eye, player.position, MASK_NPC_SIGHT, Some(own_body))
            .is_some_and(|hit| hit.body == player.handle);

    Perception {
        has_line_of_sight,
        distance,
        player_position: Some(player.position),
        player_velocity: player.velocity,
        last_known_position: if has_line_of_sight { Some(player.position) } else { last_known },
    }
}

fn seek(position: Vec3, target: Vec3, speed: f32) -> Vec3 {
    horizontal(target - position).try_normalize().map_or(Vec3::ZERO, |dir| dir * speed)
}

/// Удержание optimal range: ближе / назад / стрейф
fn combat_movement(brain: &mut AiBrain, position: Vec3, config: &AiConfig) -> Vec3 {
    let target = if brain.perception.has_line_of_sight {
        brain.perception.player_position
    } else {
        brain.perception.last_known_position
    };
    let Some(target) = target else {
        return Vec3::ZERO;
    };
    let Some(direction) = horizontal(target - position).try_normalize() else {
        return Vec3::ZERO;
    };

    // Без line-of-sight — к последней известной позиции
    if !brain.perception.has_line_of_sight {
        return direction * config.move_speed;
    }

    let distance = brain.perception.distance;
    if distance > config.optimal_range {
        direction * config.move_speed
    } else if distance < config.min_range {
        -direction * config.move_speed
    } else {
        brain.strafe_timer -= config.decision_interval;
        if brain.strafe_timer <= 0.0 {
            brain.strafe_sign = -brain.strafe_sign;
            brain.strafe_timer = config.strafe_flip_interval;
        }
        direction.cross(Vec3::Y) * brain.strafe_sign * config.strafe_speed
    }
}

fn melee_attack(
    entity: Entity,
    perception: &Perception,
    player: PlayerSnapshot,
    config: &AiConfig,
    players: &mut Query<(Entity, &PhysicsBody, &mut Health, Option<&StatusEffects>), With<Player>>,
    events: &mut EventWriter<GameEvent>,
) -> bool {
    if perception.distance > config.melee_range {
        return false;
    }
    let Ok((target, _, mut health, effects)) = players.get_mut(player.entity) else {
        return false;
    };
    let outcome = deal_damage(target, &mut health, effects, config.melee_damage, events);
    crate::logger::log(&format!("👊 NPC {:?} melee hit player for {:.1}", entity, outcome.applied()));
    true
}

/// Баллистический bolt в упреждённую точку (прямая при недостижимой цели)
fn ranged_attack(entity: Entity, eye: Vec3, player: PlayerSnapshot, tuning: &GameplayTuning, commands: &mut Commands) {
    let projectiles = &tuning.projectiles;
    let predicted = predict_target(
        eye,
        player.position,
        player.velocity,
        projectiles.enemy_bolt_speed,
        projectiles.max_prediction_time,
    );
    let aim = (predicted - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
    let start = eye + aim * (tuning.ai.radius + projectiles.enemy_bolt_radius + 0.1);
    let velocity = ballistic_or_direct(start, predicted, projectiles.enemy_bolt_speed, tuning.world.gravity);

    let bolt = Projectile {
        projectile_type: ProjectileType::EnemyBolt,
        owner: entity,
        damage: projectiles.enemy_bolt_damage,
        splash_radius: 0.0,
        lifetime: projectiles.enemy_bolt_lifetime,
        homing: None,
        hostile_to_player: true,
    };
    queue_projectile(commands, bolt, start, velocity, projectiles.enemy_bolt_radius);
    crate::logger::log(&format!("🏹 NPC {:?} fired bolt → {:?}", entity, predicted));
}

/// Боковой рывок по собственному cooldown
fn try_dash(
    brain: &mut AiBrain,
    physics: &mut PhysicsWorld,
    handle: BodyHandle,
    position: Vec3,
    player_position: Vec3,
    config: &AiConfig,
) {
    if brain.dash_timer > 0.0 || !brain.perception.has_line_of_sight {
        return;
    }
    let Some(direction) = horizontal(player_position - position).try_normalize() else {
        return;
    };
    let side = direction.cross(Vec3::Y) * brain.strafe_sign;
    let vertical = physics.velocity(handle).map_or(0.0, |v| v.y);
    physics.set_velocity(handle, side * config.dash_speed + Vec3::Y * vertical);

    brain.dash_active = config.dash_duration;
    brain.dash_timer = config.dash_cooldown;
}

fn try_jump(brain: &mut AiBrain, physics: &mut PhysicsWorld, handle: BodyHandle, position: Vec3, config: &AiConfig) {
    if brain.jump_timer > 0.0 {
        return;
    }
    let Some(forward) = horizontal(brain.desired_velocity).try_normalize() else {
        return;
    };

    let ahead_end = position + forward * (config.radius + config.obstacle_probe_distance);
    if physics.raycast(position, ahead_end, MASK_GROUND, Some(handle)).is_none() {
        return;
    }
    let ground_end = position - Vec3::Y * (config.radius + config.ground_check_distance);
    if physics.raycast(position, ground_end, MASK_GROUND, Some(handle)).is_none() {
        return;
    }

    let velocity = physics.velocity(handle).unwrap_or(Vec3::ZERO);
    physics.set_velocity(handle, Vec3::new(velocity.x, config.jump_speed, velocity.z));
    brain.jump_timer = config.jump_cooldown;
    crate::logger::log("🦘 NPC jumped over obstacle");
}
