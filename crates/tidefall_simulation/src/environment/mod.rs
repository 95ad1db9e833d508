//! Environment systems: вода, triggers, kill plane, смерть
//!
//! Порядок внутри frame (см. SimulationSet):
//! Water → Triggers → (StatusEffects) → Bounds → Death
//!
//! Death идёт после всех источников летального урона, поэтому смерть от
//! trigger'а или падения обрабатывается в тот же frame.

use bevy::prelude::*;

use crate::world::{SimulationSet, SimulationTick};

pub mod bounds;
pub mod death;
pub mod triggers;
pub mod water;

pub use bounds::kill_out_of_bounds;
pub use death::{npc_death_system, player_death_system, ragdoll_direction, DeathSequence};
pub use triggers::process_triggers;
pub use water::{buoyancy_force, sphere_in_water, update_water};

pub struct EnvironmentPlugin;

impl Plugin for EnvironmentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(SimulationTick, update_water.in_set(SimulationSet::Water))
            .add_systems(SimulationTick, process_triggers.in_set(SimulationSet::Triggers))
            .add_systems(SimulationTick, kill_out_of_bounds.in_set(SimulationSet::Bounds))
            .add_systems(
                SimulationTick,
                (npc_death_system, player_death_system)
                    .chain()
                    .in_set(SimulationSet::Death),
            );
    }
}
