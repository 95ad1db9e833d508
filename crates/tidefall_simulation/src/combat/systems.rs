//! Weapon системы игрока
//!
//! Blade: замах → scheduled hit-check через `hit_delay`.
//! Rifle: мгновенный hitscan raycast (MASK_PLAYER_AIM), первый hit в пределах range.

use bevy::prelude::*;

use super::damage::deal_damage;
use super::weapon::{AttackKind, Weapon};
use super::NpcTargets;
use crate::components::{Health, Player};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::input::PlayerInput;
use crate::physics::layers::MASK_PLAYER_AIM;
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::world::{EntityRegistry, ScheduledTasks, TaskAction};

/// Система: tick weapon state + обработка fire / reload / inspect
pub fn player_weapon_system(
    time: Res<Time>,
    input: Res<PlayerInput>,
    tuning: Res<GameplayTuning>,
    physics: Res<PhysicsWorld>,
    registry: Res<EntityRegistry>,
    mut tasks: ResMut<ScheduledTasks>,
    mut players: Query<(Entity, &PhysicsBody, &mut Weapon, &Health), With<Player>>,
    mut npcs: NpcTargets,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    for (entity, body, mut weapon, health) in players.iter_mut() {
        if let Some(finished) = weapon.tick(delta) {
            crate::logger::log(&format!("🔫 {} finished {:?}", weapon.id.as_str(), finished));
        }

        if health.is_dead() {
            continue;
        }

        if input.reload {
            if let Err(reason) = weapon.start_reload() {
                crate::logger::log(&format!("🔫 Reload rejected: {}", reason));
            }
        }
        if input.inspect {
            if let Err(reason) = weapon.start_inspect() {
                crate::logger::log(&format!("🔫 Inspect rejected: {}", reason));
            }
        }
        if !input.fire {
            continue;
        }

        let attack = match weapon.try_attack() {
            Ok(attack) => attack,
            Err(reason) => {
                crate::logger::log(&format!("🔫 {} attack rejected: {}", weapon.id.as_str(), reason));
                continue;
            }
        };

        match attack {
            AttackKind::Swing(stats) => {
                tasks.schedule(
                    entity,
                    stats.hit_delay,
                    TaskAction::MeleeHitCheck {
                        damage: weapon.damage,
                        range: stats.swing_range,
                        cone_dot: stats.cone_dot,
                    },
                );
                events.write(GameEvent::WeaponFired {
                    weapon: weapon.id,
                    hit_point: None,
                });
            }
            AttackKind::Shot { range } => {
                let Some(position) = physics.position(body.handle) else {
                    continue;
                };
                let eye = position + Vec3::Y * tuning.player.eye_height;
                let aim = input.camera_forward();
                let hit = physics.raycast(eye, eye + aim * range, MASK_PLAYER_AIM, Some(body.handle));

                if let Some(target) = hit.and_then(|h| registry.entity_for_body(h.body)) {
                    if let Ok((npc, _, mut npc_health, effects)) = npcs.get_mut(target) {
                        deal_damage(npc, &mut npc_health, effects, weapon.damage, &mut events);
                    }
                }
                events.write(GameEvent::WeaponFired {
                    weapon: weapon.id,
                    hit_point: hit.map(|h| h.point),
                });
            }
        }
    }
}
