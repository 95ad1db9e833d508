//! SimulationTick schedule и порядок систем
//!
//! Один прогон `SimulationTick` = один frame. Physics step выполняется ДО прогона
//! (в `GameWorld::update`), flush удалений тел — ПОСЛЕ.
//!
//! Порядок фиксирован (single-threaded executor, chained sets):
//! Input → Movement → Targeting → Abilities → Weapons → DeferredTasks → Ai
//! → Water → Triggers → StatusEffects → Bounds → Death → Projectiles

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;

/// Custom schedule: один frame симуляции
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationTick;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Movement,
    Targeting,
    Abilities,
    Weapons,
    DeferredTasks,
    Ai,
    Water,
    Triggers,
    StatusEffects,
    Bounds,
    Death,
    /// Self-updating entities (снаряды) тикают последними
    Projectiles,
}

/// Создать schedule, выставить executor и порядок sets
pub fn configure_simulation_schedule(app: &mut App) {
    app.init_schedule(SimulationTick);
    app.edit_schedule(SimulationTick, |schedule| {
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    });
    app.configure_sets(
        SimulationTick,
        (
            SimulationSet::Input,
            SimulationSet::Movement,
            SimulationSet::Targeting,
            SimulationSet::Abilities,
            SimulationSet::Weapons,
            SimulationSet::DeferredTasks,
            SimulationSet::Ai,
            SimulationSet::Water,
            SimulationSet::Triggers,
            SimulationSet::StatusEffects,
            SimulationSet::Bounds,
            SimulationSet::Death,
            SimulationSet::Projectiles,
        )
            .chain(),
    );
}
