//! Trigger volumes (sensor overlaps из CollisionEvents)
//!
//! - message: только игрок, один раз → `TutorialTriggerActivated`
//! - death: летальный урон любому живому, без one-shot guard
//! - level_end: только игрок, один раз → `LevelCompleted`

use bevy::prelude::*;

use crate::combat::damage::deal_lethal_damage;
use crate::components::{Health, Player, TriggerKind, TriggerVolume};
use crate::events::GameEvent;
use crate::physics::CollisionEvents;

/// Система: обработка overlaps trigger volumes
pub fn process_triggers(
    collisions: Res<CollisionEvents>,
    mut triggers: Query<(Entity, &mut TriggerVolume)>,
    mut victims: Query<(&mut Health, Has<Player>)>,
    mut events: EventWriter<GameEvent>,
) {
    if collisions.contacts.is_empty() {
        return;
    }

    for (trigger_entity, mut trigger) in triggers.iter_mut() {
        for (other, contact) in collisions.involving(trigger_entity) {
            if !contact.sensor {
                continue;
            }
            let Ok((mut health, is_player)) = victims.get_mut(other) else {
                continue;
            };
            if health.is_dead() {
                continue;
            }

            // One-shot triggers слушают только игрока
            if trigger.kind.is_one_shot() {
                if !is_player || trigger.fired {
                    continue;
                }
                trigger.fired = true;
            }

            match trigger.kind {
                TriggerKind::Message => {
                    let message = trigger.message.clone().unwrap_or_default();
                    crate::logger::log(&format!("💬 Tutorial trigger: \"{}\"", message));
                    events.write(GameEvent::TutorialTriggerActivated {
                        message,
                        duration: trigger.duration,
                    });
                }
                TriggerKind::Death => {
                    // Повторяемый: каждый overlap снова наносит летальный урон
                    let outcome = deal_lethal_damage(other, &mut health, &mut events);
                    if outcome.is_kill() {
                        crate::logger::log(&format!("☠️ Death trigger killed {:?}", other));
                    }
                }
                TriggerKind::LevelEnd => {
                    crate::logger::log_info("🏁 Level completed");
                    events.write(GameEvent::LevelCompleted);
                }
            }
        }
    }
}
