//! AI perception & decision module
//!
//! Simple FSM для NPC: IDLE → COMBAT → SEARCHING → IDLE.
//! Две частоты:
//! - decision (perception + FSM + атаки) — `decision_hz` (10 Hz по умолчанию)
//! - movement application — каждый frame

use bevy::prelude::*;

use crate::world::{SimulationSet, SimulationTick};

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{next_state, AiBrain, AiConfig, AiState, Perception};
pub use systems::{ai_apply_movement, ai_decision_system};

/// AI Plugin
///
/// Порядок выполнения (SimulationSet::Ai):
/// 1. ai_decision_system — throttled решения
/// 2. ai_apply_movement — velocity из последнего решения
pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            SimulationTick,
            (ai_decision_system, ai_apply_movement)
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Ai),
        );
    }
}
