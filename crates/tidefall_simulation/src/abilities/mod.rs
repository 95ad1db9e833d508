//! Ability system игрока
//!
//! Ability = общий gating record (cooldown + energy) + closed variant поведения:
//! - Instant: nuke, swarm, wave
//! - Channeled: drain (energy → health, cooldown только после остановки)
//! - ToggledBuff: plating (timed status effect, cooldown сразу)
//!
//! Провалы gating не ошибки: `GameEvent::AbilityCastFailed` + состояние не меняется.

use bevy::prelude::*;

use crate::combat::damage::heal;
use crate::components::Health;
use crate::config::{AbilityTuning, EnergyTuning};
use crate::error::LoadError;
use crate::world::{SimulationSet, SimulationTick};

pub mod effects;
pub mod systems;


pub use systems::{cast_selected_ability, select_ability_slot, tick_abilities, update_channeling};

/// Максимум слотов в loadout
pub const MAX_ABILITY_SLOTS: usize = 4;

/// Остаток missing health, который считается "полным" (float погрешность drain)
const HEAL_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbilityId {
    Nuke,
    Swarm,
    Wave,
    Drain,
    Plating,
}

impl AbilityId {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "nuke" => Some(Self::Nuke),
            "swarm" => Some(Self::Swarm),
            "wave" => Some(Self::Wave),
            "drain" => Some(Self::Drain),
            "plating" => Some(Self::Plating),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityId::Nuke => "nuke",
            AbilityId::Swarm => "swarm",
            AbilityId::Wave => "wave",
            AbilityId::Drain => "drain",
            AbilityId::Plating => "plating",
        }
    }

    /// Нужен ли lock-on таргет для каста
    pub fn requires_lock_on(&self) -> bool {
        matches!(self, AbilityId::Nuke | AbilityId::Swarm)
    }
}

/// Причина отказа каста (для UI feedback)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastFailure {
    OnCooldown,
    InsufficientEnergy,
    NoTarget,
    BuffAlreadyActive,
}

/// Состояние channeled способности
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    pub channeling: bool,
    pub energy_per_second: f32,
    /// Сколько energy стоит 1 health
    pub energy_per_health: f32,
}

/// Параметры toggled buff
#[derive(Debug, Clone, PartialEq)]
pub struct BuffState {
    pub buff_name: String,
    pub duration: f32,
    pub damage_reduction: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AbilityBehavior {
    Instant,
    Channeled(ChannelState),
    ToggledBuff(BuffState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    pub id: AbilityId,
    pub cooldown: f32,
    pub energy_cost: f32,
    /// ∈ [0, cooldown]; считает вверх, готово при == cooldown
    pub cooldown_timer: f32,
    pub behavior: AbilityBehavior,
}

impl Ability {
    pub fn new(id: AbilityId, cooldown: f32, energy_cost: f32, behavior: AbilityBehavior) -> Self {
        let cooldown = cooldown.max(0.0);
        Self {
            id,
            cooldown,
            energy_cost: energy_cost.max(0.0),
            cooldown_timer: cooldown,
            behavior,
        }
    }

    pub fn from_tuning(id: AbilityId, tuning: &AbilityTuning) -> Self {
        match id {
            AbilityId::Nuke => Self::new(id, tuning.nuke.cooldown, tuning.nuke.energy_cost, AbilityBehavior::Instant),
            AbilityId::Swarm => Self::new(id, tuning.swarm.cooldown, tuning.swarm.energy_cost, AbilityBehavior::Instant),
            AbilityId::Wave => Self::new(id, tuning.wave.cooldown, tuning.wave.energy_cost, AbilityBehavior::Instant),
            AbilityId::Drain => Self::new(
                id,
                tuning.drain.cooldown,
                tuning.drain.energy_cost,
                AbilityBehavior::Channeled(ChannelState {
                    channeling: false,
                    energy_per_second: tuning.drain.energy_per_second,
                    energy_per_health: tuning.drain.energy_per_health,
                }),
            ),
            AbilityId::Plating => Self::new(
                id,
                tuning.plating.cooldown,
                tuning.plating.energy_cost,
                AbilityBehavior::ToggledBuff(BuffState {
                    buff_name: id.as_str().to_string(),
                    duration: tuning.plating.duration,
                    damage_reduction: tuning.plating.damage_reduction,
                }),
            ),
        }
    }

    /// Cooldown тикает всегда, независимо от активности
    pub fn tick(&mut self, dt: f32) {
        self.cooldown_timer = (self.cooldown_timer + dt.max(0.0)).min(self.cooldown);
    }

    pub fn is_off_cooldown(&self) -> bool {
        self.cooldown_timer >= self.cooldown
    }

    /// Общий gate. Пустой результат — каст разрешён.
    pub fn gate(&self, energy: f32, ignore_gating: bool) -> Vec<CastFailure> {
        if ignore_gating {
            return Vec::new();
        }
        let mut failures = Vec::new();
        if !self.is_off_cooldown() {
            failures.push(CastFailure::OnCooldown);
        }
        if energy < self.energy_cost {
            failures.push(CastFailure::InsufficientEnergy);
        }
        failures
    }

    pub fn trigger_cooldown(&mut self) {
        self.cooldown_timer = 0.0;
    }

    pub fn is_channeling(&self) -> bool {
        matches!(self.behavior, AbilityBehavior::Channeled(ChannelState { channeling: true, .. }))
    }

    /// Войти в channel. Уже в канале или не channeled → false.
    pub fn start_channel(&mut self) -> bool {
        match &mut self.behavior {
            AbilityBehavior::Channeled(state) if !state.channeling => {
                state.channeling = true;
                true
            }
            _ => false,
        }
    }

    /// Выйти из channel и запустить cooldown. false — канала не было.
    pub fn stop_channel(&mut self) -> bool {
        match &mut self.behavior {
            AbilityBehavior::Channeled(state) if state.channeling => {
                state.channeling = false;
                self.cooldown_timer = 0.0;
                true
            }
            _ => false,
        }
    }
}

/// Energy pool игрока
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Energy {
    pub current: f32,
    pub max: f32,
    pub regen_rate: f32,
    /// Регенерация начинается через regen_delay после последнего расхода
    pub regen_delay: f32,
    pub since_last_use: f32,
}

impl Energy {
    pub fn new(max: f32, regen_rate: f32, regen_delay: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            regen_rate,
            regen_delay,
            since_last_use: regen_delay,
        }
    }

    pub fn from_tuning(tuning: &EnergyTuning) -> Self {
        Self::new(tuning.max, tuning.regen_rate, tuning.regen_delay)
    }

    /// Списать ровно `amount`. Не хватает — false, ничего не меняется.
    pub fn spend(&mut self, amount: f32) -> bool {
        if amount > self.current {
            return false;
        }
        self.current -= amount.max(0.0);
        self.since_last_use = 0.0;
        true
    }

    /// Списать до `amount`, вернуть фактически списанное
    pub fn drain(&mut self, amount: f32) -> f32 {
        let drained = amount.clamp(0.0, self.current);
        self.current -= drained;
        self.since_last_use = 0.0;
        drained
    }

    pub fn regen(&mut self, dt: f32) {
        self.since_last_use += dt;
        if self.since_last_use >= self.regen_delay {
            self.current = (self.current + self.regen_rate * dt).clamp(0.0, self.max);
        }
    }
}

/// Результат одного frame channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelStep {
    /// Нет активного канала
    Idle,
    Continued { drained: f32, healed: f32 },
    /// Канал закончился сам (health полное / energy кончилась / владелец мёртв)
    Stopped(AbilityId),
}

/// Loadout игрока: 0–4 способности + выбранный слот + energy
#[derive(Component, Debug, Clone)]
pub struct AbilityLoadout {
    slots: Vec<Ability>,
    selected: usize,
    pub energy: Energy,
    /// Debug override: cooldown + energy не проверяются
    pub ignore_gating: bool,
}

impl AbilityLoadout {
    pub fn new(slots: Vec<Ability>, energy: Energy) -> Result<Self, LoadError> {
        if slots.len() > MAX_ABILITY_SLOTS {
            return Err(LoadError::TooManyAbilities(slots.len()));
        }
        Ok(Self {
            slots,
            selected: 0,
            energy,
            ignore_gating: false,
        })
    }

    pub fn from_ids(ids: &[AbilityId], tuning: &AbilityTuning, energy: &EnergyTuning) -> Result<Self, LoadError> {
        let slots = ids.iter().map(|id| Ability::from_tuning(*id, tuning)).collect();
        let mut loadout = Self::new(slots, Energy::from_tuning(energy))?;
        loadout.ignore_gating = tuning.debug_ignore_gating;
        Ok(loadout)
    }

    pub fn slots(&self) -> &[Ability] {
        &self.slots
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Ability> {
        self.slots.get(self.selected)
    }

    pub fn selected_mut(&mut self) -> Option<&mut Ability> {
        self.slots.get_mut(self.selected)
    }

    /// Выбрать слот. Несуществующий слот → false.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.selected = index;
        true
    }

    pub fn get(&self, id: AbilityId) -> Option<&Ability> {
        self.slots.iter().find(|ability| ability.id == id)
    }

    pub fn get_mut(&mut self, id: AbilityId) -> Option<&mut Ability> {
        self.slots.iter_mut().find(|ability| ability.id == id)
    }

    /// Способность, которая сейчас в канале
    pub fn channeling_mut(&mut self) -> Option<&mut Ability> {
        self.slots.iter_mut().find(|ability| ability.is_channeling())
    }

    /// Один frame канала: drain energy → heal
    ///
    /// drain = min(rate·dt, energy, missing·EPH), heal = drain / EPH.
    pub fn step_channel(&mut self, dt: f32, health: &mut Health) -> ChannelStep {
        let Some(ability) = self.slots.iter_mut().find(|ability| ability.is_channeling()) else {
            return ChannelStep::Idle;
        };
        let AbilityBehavior::Channeled(state) = ability.behavior else {
            return ChannelStep::Idle;
        };

        if health.is_dead() || health.is_full() || self.energy.current <= 0.0 {
            ability.stop_channel();
            return ChannelStep::Stopped(ability.id);
        }

        let needed = health.missing() * state.energy_per_health;
        let drained = self.energy.drain((state.energy_per_second * dt).min(needed));
        let healed = heal(health, drained / state.energy_per_health);
        if health.missing() <= HEAL_EPSILON {
            health.restore_full();
        }

        if health.is_full() || self.energy.current <= 0.0 {
            ability.stop_channel();
            return ChannelStep::Stopped(ability.id);
        }
        ChannelStep::Continued { drained, healed }
    }

    /// Cooldowns всех слотов + energy regen
    pub fn tick(&mut self, dt: f32) {
        for ability in &mut self.slots {
            ability.tick(dt);
        }
        self.energy.regen(dt);
    }
}

/// Ability Plugin
///
/// - Input: select_ability_slot
/// - Abilities: tick_abilities → cast_selected_ability → update_channeling
pub struct AbilityPlugin;

impl Plugin for AbilityPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(SimulationTick, select_ability_slot.in_set(SimulationSet::Input))
            .add_systems(
                SimulationTick,
                (tick_abilities, cast_selected_ability, update_channeling)
                    .chain()
                    .in_set(SimulationSet::Abilities),
            );
    }
}
