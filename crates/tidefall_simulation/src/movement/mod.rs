//! Player movement + lock-on targeting
//!
//! - player: walk / swim, jump, dash, ground slam (SimulationSet::Movement)
//! - targeting: lock-on для homing способностей (SimulationSet::Targeting)

use bevy::prelude::*;

use crate::world::{SimulationSet, SimulationTick};

pub mod player;
pub mod targeting;

pub use player::{is_grounded, player_movement_system, swim_direction, walk_direction};
pub use targeting::{pick_target, update_lock_on, TargetCandidate};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(SimulationTick, player_movement_system.in_set(SimulationSet::Movement))
            .add_systems(SimulationTick, update_lock_on.in_set(SimulationSet::Targeting));
    }
}
