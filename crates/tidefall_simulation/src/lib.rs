//! TIDEFALL Simulation Core
//!
//! Real-time симуляция first-person action игры на Bevy 0.16 ECS (headless).
//!
//! Ядро владеет всеми gameplay entities (игрок, NPC, снаряды, triggers, вода),
//! продвигает их упорядоченным pipeline систем и общается с внешним миром
//! (renderer, UI, audio) только через event bus.
//!
//! Точка входа — `GameWorld`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod abilities;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod events;
pub mod input;
pub mod level;
pub mod logger;
pub mod math;
pub mod movement;
pub mod physics;
pub mod status;
pub mod world;

// Re-export базовых типов для удобства
pub use abilities::{Ability, AbilityBehavior, AbilityId, AbilityLoadout, AbilityPlugin, CastFailure, Energy};
pub use ai::{AiBrain, AiConfig, AiPlugin, AiState};
pub use combat::{CombatPlugin, DamageOutcome, Projectile, ProjectileType, Weapon, WeaponId, WeaponState};
pub use components::*;
pub use config::{load_tuning, GameplayTuning};
pub use environment::EnvironmentPlugin;
pub use error::LoadError;
pub use events::{EventBus, GameEvent, GameEventKind, ListenerId};
pub use input::PlayerInput;
pub use level::{LevelDocument, LevelLighting, LevelSpawn, LoadoutDocument};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use movement::MovementPlugin;
pub use physics::{BodyDesc, BodyHandle, CollisionEvents, PhysicsBody, PhysicsWorld, Shape};
pub use status::{StatusEffect, StatusEffectKind, StatusEffects, StatusEffectsPlugin};
pub use world::{GameWorld, Prefab, SimulationSet, SimulationTick};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Ресурсы, уже вставленные до plugin'а (tuning, physics, rng), не перезаписываются.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        world::configure_simulation_schedule(app);

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.init_resource::<Time>()
            .init_resource::<GameplayTuning>()
            .init_resource::<PhysicsWorld>()
            .init_resource::<CollisionEvents>()
            .init_resource::<world::EntityRegistry>()
            .init_resource::<world::ScheduledTasks>()
            .init_resource::<PlayerInput>()
            .init_resource::<EventBus>()
            .init_resource::<LevelSpawn>()
            .init_resource::<LevelLighting>()
            .add_event::<GameEvent>()
            .add_systems(
                SimulationTick,
                world::tasks::run_scheduled_tasks.in_set(SimulationSet::DeferredTasks),
            )
            // Подсистемы
            .add_plugins((
                MovementPlugin,
                AbilityPlugin,
                CombatPlugin,
                AiPlugin,
                EnvironmentPlugin,
                StatusEffectsPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}
