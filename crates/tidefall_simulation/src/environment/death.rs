//! Death handling
//!
//! NPC: ragdoll sequence (fixed rotation снят, случайный импульс) → remove_entity по таймеру.
//! Player: `PlayerDied` один раз → respawn в death-respawn точке после `respawn_delay`.

use bevy::prelude::*;
use rand::Rng;

use crate::abilities::AbilityLoadout;
use crate::ai::AiBrain;
use crate::components::{Health, Npc, Player, PlayerLife, PlayerMotor};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::level::LevelSpawn;
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::status::StatusEffects;
use crate::world::remove_entity;
use crate::DeterministicRng;

/// Ragdoll / fade таймер мёртвого NPC (entity удаляется по истечении)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct DeathSequence {
    pub remaining: f32,
}

/// Случайное направление ragdoll импульса (всегда с подбросом вверх)
pub fn ragdoll_direction(rng: &mut impl Rng) -> Vec3 {
    let x = rng.gen_range(-1.0..1.0);
    let z = rng.gen_range(-1.0..1.0);
    let y = rng.gen_range(0.3..1.0);
    Vec3::new(x, y, z).normalize_or(Vec3::Y)
}

/// Система: старт и завершение death sequence NPC
pub fn npc_death_system(
    time: Res<Time>,
    tuning: Res<GameplayTuning>,
    mut physics: ResMut<PhysicsWorld>,
    mut rng: ResMut<DeterministicRng>,
    mut npcs: Query<
        (Entity, &PhysicsBody, &Health, &mut AiBrain, Option<&mut DeathSequence>),
        (With<Npc>, Without<Player>),
    >,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    for (entity, body, health, mut brain, sequence) in npcs.iter_mut() {
        if health.is_alive() {
            continue;
        }

        match sequence {
            None => {
                events.write(GameEvent::NpcDied { entity });
                brain.desired_velocity = Vec3::ZERO;

                physics.set_fixed_rotation(body.handle, false);
                if let Some(position) = physics.position(body.handle) {
                    let mass = physics.body(body.handle).map_or(1.0, |b| b.mass);
                    let impulse = ragdoll_direction(&mut rng.rng) * tuning.world.death_impulse * mass;
                    // Импульс выше центра — тело опрокидывается
                    let point = position + Vec3::Y * tuning.world.death_impulse_height;
                    physics.apply_impulse_at_point(body.handle, impulse, point);
                }

                commands.entity(entity).insert(DeathSequence {
                    remaining: tuning.world.death_sequence_duration,
                });
                crate::logger::log(&format!("💀 NPC {:?} died, ragdoll started", entity));
            }
            Some(mut sequence) => {
                if sequence.remaining <= 0.0 {
                    continue;
                }
                sequence.remaining -= delta;
                if sequence.remaining <= 0.0 {
                    commands.queue(move |world: &mut World| {
                        remove_entity(world, entity);
                    });
                }
            }
        }
    }
}

/// Система: смерть и respawn игрока
pub fn player_death_system(
    time: Res<Time>,
    tuning: Res<GameplayTuning>,
    spawn: Res<LevelSpawn>,
    mut physics: ResMut<PhysicsWorld>,
    mut players: Query<
        (
            Entity,
            &PhysicsBody,
            &mut Health,
            &mut PlayerLife,
            &mut PlayerMotor,
            Option<&mut StatusEffects>,
            Option<&mut AbilityLoadout>,
        ),
        With<Player>,
    >,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    for (entity, body, mut health, mut life, mut motor, effects, loadout) in players.iter_mut() {
        match life.respawn_timer {
            None if health.is_dead() => {
                life.respawn_timer = Some(tuning.world.respawn_delay);
                physics.set_velocity(body.handle, Vec3::ZERO);

                if let Some(ability) = loadout.and_then(|l| l.into_inner().channeling_mut()) {
                    let id = ability.id;
                    ability.stop_channel();
                    events.write(GameEvent::PlayerChannelingUpdate {
                        is_channeling: false,
                        ability: id,
                    });
                }

                events.write(GameEvent::PlayerDied { entity });
                crate::logger::log_info(&format!(
                    "💀 Player died, respawn in {:.1}s",
                    tuning.world.respawn_delay
                ));
            }
            Some(remaining) => {
                let remaining = remaining - delta;
                if remaining > 0.0 {
                    life.respawn_timer = Some(remaining);
                    continue;
                }

                // Respawn — единственное место, где мёртвый оживает
                life.respawn_timer = None;
                health.restore_full();
                *motor = PlayerMotor::default();
                if let Some(mut effects) = effects {
                    effects.clear();
                }

                let position = spawn.death_respawn;
                physics.set_position(body.handle, position);
                physics.set_velocity(body.handle, Vec3::ZERO);

                events.write(GameEvent::PlayerRespawned { entity, position });
                crate::logger::log_info(&format!("✨ Player respawned at {:?}", position));
            }
            None => {}
        }
    }
}
