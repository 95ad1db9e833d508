//! Status Effect Engine
//!
//! Timed buffs/debuffs на entity. Одно effect на имя: повторное добавление
//! обновляет длительность (refresh), а не стакает.
//!
//! Lifecycle hooks:
//! - apply: `StatusEffects::add` (true если effect новый)
//! - tick: `tick_status_effects` (DoT / HoT по kind)
//! - remove: `on_remove` событие при истечении или явном снятии

use bevy::prelude::*;

use crate::events::GameEvent;
use crate::world::{SimulationSet, SimulationTick};

pub mod systems;

pub use systems::tick_status_effects;

pub struct StatusEffectsPlugin;

impl Plugin for StatusEffectsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimulationTick,
            tick_status_effects.in_set(SimulationSet::StatusEffects),
        );
    }
}

/// Что делает effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusEffectKind {
    /// Доля поглощаемого урона [0, 1]
    DamageReduction { fraction: f32 },
    DamageOverTime { per_second: f32 },
    HealOverTime { per_second: f32 },
    /// Множитель скорости движения
    Slow { multiplier: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEffect {
    /// Уникальный ключ в пределах entity
    pub name: String,
    pub kind: StatusEffectKind,
    /// None — бесконечный
    pub duration: Option<f32>,
    /// Прошедшее время
    pub timer: f32,
    /// Событие при снятии effect
    pub on_remove: Option<GameEvent>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, kind: StatusEffectKind, duration: Option<f32>) -> Self {
        Self {
            name: name.into(),
            kind,
            duration,
            timer: 0.0,
            on_remove: None,
        }
    }

    pub fn with_on_remove(mut self, event: GameEvent) -> Self {
        self.on_remove = Some(event);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.duration.is_some_and(|d| self.timer >= d)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.duration.map(|d| (d - self.timer).max(0.0))
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Добавить или обновить effect. true — effect новый.
    pub fn add(&mut self, effect: StatusEffect) -> bool {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == effect.name) {
            existing.kind = effect.kind;
            existing.duration = effect.duration;
            existing.timer = 0.0;
            existing.on_remove = effect.on_remove;
            return false;
        }
        self.effects.push(effect);
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    /// Снять effect (без on_remove события — вызывающий решает сам)
    pub fn remove(&mut self, name: &str) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.name == name)?;
        Some(self.effects.remove(index))
    }

    pub fn clear(&mut self) -> Vec<StatusEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Сильнейшее активное снижение урона (не суммируется)
    pub fn damage_reduction(&self) -> f32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusEffectKind::DamageReduction { fraction } => Some(fraction.clamp(0.0, 1.0)),
                _ => None,
            })
            .fold(0.0, f32::max)
    }

    /// Сильнейшее замедление (1.0 — без эффекта)
    pub fn speed_multiplier(&self) -> f32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                StatusEffectKind::Slow { multiplier } => Some(multiplier.clamp(0.0, 1.0)),
                _ => None,
            })
            .fold(1.0, f32::min)
    }

    /// Продвинуть таймеры, вернуть истёкшие effects (уже удалённые)
    pub(crate) fn advance(&mut self, dt: f32) -> Vec<StatusEffect> {
        for effect in &mut self.effects {
            effect.timer += dt;
        }
        let (expired, active): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.effects).into_iter().partition(StatusEffect::is_expired);
        self.effects = active;
        expired
    }
}
