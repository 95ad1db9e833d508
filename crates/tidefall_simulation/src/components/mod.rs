//! ECS Components для симуляции
//!
//! Организация:
//! - actor: EntityKind, Actor, Health, Player, Npc
//! - movement: MovementMode, PlayerMotor, LockOn, PlayerLife
//! - world: TriggerVolume, WaterVolume, Swimmer, LevelObject

pub mod actor;
pub mod movement;
pub mod world;

pub use actor::*;
pub use movement::*;
pub use world::*;
