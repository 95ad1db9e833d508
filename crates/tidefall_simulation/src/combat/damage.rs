//! Damage / heal entry points
//!
//! Единственный путь изменения Health в gameplay коде.
//! Dead entity → no-op (deferred callbacks могут прийти после смерти цели).

use bevy::prelude::*;

use crate::components::Health;
use crate::events::GameEvent;
use crate::status::StatusEffects;

/// Результат применения урона
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Цель уже мертва или урон ≤ 0
    Ignored,
    Damaged { applied: f32 },
    /// Этот удар добил цель
    Killed { applied: f32 },
}

impl DamageOutcome {
    pub fn applied(&self) -> f32 {
        match self {
            DamageOutcome::Ignored => 0.0,
            DamageOutcome::Damaged { applied } | DamageOutcome::Killed { applied } => *applied,
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

/// Применить урон с учётом сильнейшего damage reduction
pub fn deal_damage(
    entity: Entity,
    health: &mut Health,
    effects: Option<&StatusEffects>,
    amount: f32,
    events: &mut EventWriter<GameEvent>,
) -> DamageOutcome {
    let reduction = effects.map_or(0.0, StatusEffects::damage_reduction);
    apply(entity, health, amount * (1.0 - reduction), events)
}

/// Летальный урон (death trigger, out-of-bounds) — reduction не действует
pub fn deal_lethal_damage(entity: Entity, health: &mut Health, events: &mut EventWriter<GameEvent>) -> DamageOutcome {
    let amount = health.current;
    apply(entity, health, amount, events)
}

fn apply(entity: Entity, health: &mut Health, amount: f32, events: &mut EventWriter<GameEvent>) -> DamageOutcome {
    if health.is_dead() {
        return DamageOutcome::Ignored;
    }
    let applied = health.take_damage(amount);
    if applied <= 0.0 {
        return DamageOutcome::Ignored;
    }

    events.write(GameEvent::EntityTookDamage { entity, amount: applied });

    if health.is_dead() {
        DamageOutcome::Killed { applied }
    } else {
        DamageOutcome::Damaged { applied }
    }
}

/// Лечение (мёртвых не поднимает — это делает только respawn)
pub fn heal(health: &mut Health, amount: f32) -> f32 {
    health.heal(amount)
}
