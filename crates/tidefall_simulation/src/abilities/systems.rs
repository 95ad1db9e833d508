//! Ability системы: выбор слота, cooldown/energy tick, cast, channel

use bevy::prelude::*;

use super::effects::{apply_wave, spawn_nuke};
use super::{AbilityBehavior, AbilityId, AbilityLoadout, CastFailure, ChannelStep};
use crate::combat::KnockbackTargets;
use crate::components::{Health, LockOn, Player};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::input::PlayerInput;
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::status::{StatusEffect, StatusEffectKind, StatusEffects};
use crate::world::{ScheduledTasks, TaskAction};

/// Система: смена слота (активный channel обрывается)
pub fn select_ability_slot(
    input: Res<PlayerInput>,
    mut players: Query<&mut AbilityLoadout, With<Player>>,
    mut events: EventWriter<GameEvent>,
) {
    let Some(slot) = input.select_slot else {
        return;
    };

    for mut loadout in players.iter_mut() {
        if loadout.selected_index() == slot {
            continue;
        }
        if slot >= loadout.slots().len() {
            crate::logger::log(&format!("🎛️ Slot {} is empty, selection ignored", slot));
            continue;
        }
        if let Some(ability) = loadout.channeling_mut() {
            ability.stop_channel();
            events.write(GameEvent::PlayerChannelingUpdate {
                is_channeling: false,
                ability: ability.id,
            });
        }
        loadout.select(slot);
        if let Some(ability) = loadout.selected() {
            crate::logger::log(&format!("🎛️ Selected slot {} ({})", slot, ability.id.as_str()));
        }
    }
}

/// Система: cooldowns + energy regen
pub fn tick_abilities(time: Res<Time>, mut players: Query<&mut AbilityLoadout>) {
    let delta = time.delta_secs();
    for mut loadout in players.iter_mut() {
        loadout.tick(delta);
    }
}

/// Система: cast выбранной способности по нажатию
pub fn cast_selected_ability(
    input: Res<PlayerInput>,
    tuning: Res<GameplayTuning>,
    mut physics: ResMut<PhysicsWorld>,
    mut tasks: ResMut<ScheduledTasks>,
    mut players: Query<
        (Entity, &PhysicsBody, &mut AbilityLoadout, &Health, &mut StatusEffects, Option<&LockOn>),
        With<Player>,
    >,
    mut npcs: KnockbackTargets,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    if !input.cast {
        return;
    }

    for (entity, body, mut loadout, health, mut effects, lock_on) in players.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let Some(ability) = loadout.selected().cloned() else {
            continue;
        };
        // Повторный старт канала — no-op
        if ability.is_channeling() {
            continue;
        }

        let target = lock_on.and_then(|lock| lock.target);
        let mut failures = ability.gate(loadout.energy.current, loadout.ignore_gating);
        if ability.id.requires_lock_on() && target.is_none() {
            failures.push(CastFailure::NoTarget);
        }
        if let AbilityBehavior::ToggledBuff(buff) = &ability.behavior {
            if effects.has(&buff.buff_name) {
                failures.push(CastFailure::BuffAlreadyActive);
            }
        }

        if !failures.is_empty() {
            crate::logger::log(&format!("🚫 Cast {} failed: {:?}", ability.id.as_str(), failures));
            events.write(GameEvent::AbilityCastFailed {
                reasons: failures,
                entity,
                ability: ability.id,
            });
            continue;
        }

        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        let eye = position + Vec3::Y * tuning.player.eye_height;
        let aim = input.camera_forward();

        match &ability.behavior {
            AbilityBehavior::Instant => {
                loadout.energy.drain(ability.energy_cost);
                match ability.id {
                    AbilityId::Nuke => spawn_nuke(&mut commands, &tuning, entity, eye, aim, target),
                    AbilityId::Swarm => {
                        let swarm = &tuning.abilities.swarm;
                        for index in 0..swarm.count {
                            tasks.schedule(
                                entity,
                                index as f32 * swarm.spawn_interval,
                                TaskAction::SwarmMissile { target, index },
                            );
                        }
                    }
                    AbilityId::Wave => {
                        apply_wave(position, aim, &tuning, &mut physics, &mut npcs, &mut events);
                    }
                    AbilityId::Drain | AbilityId::Plating => {}
                }
            }
            AbilityBehavior::Channeled(_) => {
                // Energy списывается по ходу канала, cooldown — после остановки
                if let Some(selected) = loadout.selected_mut() {
                    selected.start_channel();
                }
                events.write(GameEvent::PlayerChannelingUpdate {
                    is_channeling: true,
                    ability: ability.id,
                });
                crate::logger::log(&format!("🔮 Channel {} started", ability.id.as_str()));
                continue;
            }
            AbilityBehavior::ToggledBuff(buff) => {
                loadout.energy.drain(ability.energy_cost);
                let effect = StatusEffect::new(
                    buff.buff_name.clone(),
                    StatusEffectKind::DamageReduction {
                        fraction: buff.damage_reduction,
                    },
                    Some(buff.duration),
                )
                .with_on_remove(GameEvent::PlayerBuffDeactivated {
                    buff_name: buff.buff_name.clone(),
                });
                effects.add(effect);
                events.write(GameEvent::PlayerBuffActivated {
                    buff_name: buff.buff_name.clone(),
                });
            }
        }

        if let Some(selected) = loadout.selected_mut() {
            selected.trigger_cooldown();
        }
        crate::logger::log(&format!(
            "✨ Cast {} (energy left {:.1})",
            ability.id.as_str(),
            loadout.energy.current
        ));
    }
}

/// Система: channel drain / остановка по отпусканию
pub fn update_channeling(
    time: Res<Time>,
    input: Res<PlayerInput>,
    mut players: Query<(&mut AbilityLoadout, &mut Health), With<Player>>,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();

    for (mut loadout, mut health) in players.iter_mut() {
        if input.cast_released {
            if let Some(ability) = loadout.channeling_mut() {
                ability.stop_channel();
                let id = ability.id;
                events.write(GameEvent::PlayerChannelingUpdate {
                    is_channeling: false,
                    ability: id,
                });
                crate::logger::log(&format!("🔮 Channel {} released", id.as_str()));
            }
            continue;
        }

        if let ChannelStep::Stopped(id) = loadout.step_channel(delta, &mut health) {
            events.write(GameEvent::PlayerChannelingUpdate {
                is_channeling: false,
                ability: id,
            });
            crate::logger::log(&format!(
                "🔮 Channel {} finished (health {:.1}/{:.1}, energy {:.1})",
                id.as_str(),
                health.current,
                health.max,
                loadout.energy.current
            ));
        }
    }
}
