//! Lock-on targeting
//!
//! Выбор цели для homing способностей: живой NPC в конусе камеры,
//! в пределах дальности и с прямой видимостью. Score = угол (рад) +
//! нормированная дистанция, меньше — лучше.

use bevy::prelude::*;

use crate::abilities::AbilityLoadout;
use crate::components::{Health, LockOn, Npc, Player};
use crate::config::{GameplayTuning, TargetingTuning};
use crate::input::PlayerInput;
use crate::physics::layers::MASK_PLAYER_AIM;
use crate::physics::{PhysicsBody, PhysicsWorld};

/// Кандидат на lock-on
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub entity: Entity,
    pub position: Vec3,
}

/// Лучшая цель из кандидатов (pure, без physics)
///
/// `visible` — проверка line-of-sight. Равный score → меньший Entity.
pub fn pick_target(
    eye: Vec3,
    forward: Vec3,
    candidates: impl IntoIterator<Item = TargetCandidate>,
    config: &TargetingTuning,
    mut visible: impl FnMut(&TargetCandidate) -> bool,
) -> Option<Entity> {
    let max_angle = config.max_angle_degrees.to_radians();
    let forward = forward.try_normalize()?;

    let mut best: Option<(f32, Entity)> = None;
    for candidate in candidates {
        let offset = candidate.position - eye;
        let distance = offset.length();
        if distance > config.max_range || distance <= f32::EPSILON {
            continue;
        }
        let angle = forward.angle_between(offset / distance);
        if angle > max_angle {
            continue;
        }

        let score = angle + distance / config.max_range;
        let better = match best {
            None => true,
            Some((best_score, best_entity)) => {
                score < best_score || (score == best_score && candidate.entity < best_entity)
            }
        };
        // Raycast только для тех, кто реально лучше
        if better && visible(&candidate) {
            best = Some((score, candidate.entity));
        }
    }
    best.map(|(_, entity)| entity)
}

/// Система: обновить `LockOn` игрока
///
/// Цель ищется только если выбранная способность требует lock-on,
/// иначе lock сбрасывается.
pub fn update_lock_on(
    input: Res<PlayerInput>,
    tuning: Res<GameplayTuning>,
    physics: Res<PhysicsWorld>,
    mut players: Query<(&PhysicsBody, &AbilityLoadout, &mut LockOn, &Health), With<Player>>,
    npcs: Query<(Entity, &PhysicsBody, &Health), (With<Npc>, Without<Player>)>,
) {
    for (body, loadout, mut lock, health) in players.iter_mut() {
        let wants_lock = loadout.selected().is_some_and(|ability| ability.id.requires_lock_on());

        let target = match physics.position(body.handle) {
            Some(position) if wants_lock && health.is_alive() => {
                let eye = position + Vec3::Y * tuning.player.eye_height;
                let candidates = npcs.iter().filter_map(|(entity, npc_body, npc_health)| {
                    if npc_health.is_dead() {
                        return None;
                    }
                    Some(TargetCandidate {
                        entity,
                        position: physics.position(npc_body.handle)?,
                    })
                });

                pick_target(eye, input.camera_forward(), candidates, &tuning.targeting, |candidate| {
                    let Ok((_, npc_body, _)) = npcs.get(candidate.entity) else {
                        return false;
                    };
                    physics
                        .raycast(eye, candidate.position, MASK_PLAYER_AIM, Some(body.handle))
                        .is_some_and(|hit| hit.body == npc_body.handle)
                })
            }
            _ => None,
        };

        if lock.target != target {
            if let Some(entity) = target {
                crate::logger::log(&format!("🎯 Lock-on → {:?}", entity));
            }
            lock.target = target;
        }
    }
}
