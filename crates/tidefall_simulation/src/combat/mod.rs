//! Combat system module
//!
//! ECS ответственность:
//! - Health mutation (единый damage entry point + damage reduction)
//! - Weapon state machine (blade melee, rifle hitscan)
//! - Projectiles (homing + ballistic), детонация и splash
//!
//! Events: EntityTookDamage, WeaponFired, ProjectileDetonated

use bevy::prelude::*;

use crate::ai::AiBrain;
use crate::components::{Health, Npc, Player};
use crate::physics::PhysicsBody;
use crate::status::StatusEffects;
use crate::world::{SimulationSet, SimulationTick};

pub mod damage;
pub mod projectile;
pub mod systems;
pub mod weapon;


// Re-export основных типов
pub use damage::{deal_damage, deal_lethal_damage, heal, DamageOutcome};
pub use projectile::{projectile_prefab, queue_projectile, update_projectiles, Homing, Projectile, ProjectileType};
pub use systems::player_weapon_system;
pub use weapon::{resolve_melee_hit, AttackKind, Weapon, WeaponActionRejected, WeaponId, WeaponKind, WeaponState};

/// Живые цели игрока: NPC (никогда не пересекается с Player query)
pub type NpcTargets<'w, 's> = Query<
    'w,
    's,
    (Entity, &'static PhysicsBody, &'static mut Health, Option<&'static StatusEffects>),
    (With<Npc>, Without<Player>),
>;

/// NPC под area эффектами с knockback (wave, ground slam)
pub type KnockbackTargets<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static PhysicsBody,
        &'static mut Health,
        Option<&'static StatusEffects>,
        &'static mut AiBrain,
    ),
    (With<Npc>, Without<Player>),
>;

/// Combat Plugin
///
/// Порядок выполнения (внутри SimulationTick):
/// 1. player_weapon_system — SimulationSet::Weapons
/// 2. update_projectiles — SimulationSet::Projectiles (последними в frame)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(SimulationTick, player_weapon_system.in_set(SimulationSet::Weapons))
            .add_systems(SimulationTick, update_projectiles.in_set(SimulationSet::Projectiles));
    }
}
