//! Collision Layers Constants
//!
//! Centralised collision groups для всего симулятора.
//!
//! ## Архитектура:
//! - **Memberships:** к каким слоям относится тело
//! - **Filters:** с какими слоями тело взаимодействует
//!
//! Пара взаимодействует только если обе стороны "видят" друг друга.
//!
//! ## Слои:
//! - GROUP_1: Environment (статическая геометрия, объекты уровня)
//! - GROUP_2: Player
//! - GROUP_3: NPC
//! - GROUP_4: Player projectiles
//! - GROUP_5: Enemy projectiles
//! - GROUP_6: Triggers (sensor volumes)

use bevy_rapier3d::prelude::{CollisionGroups, Group};

pub const LAYER_ENVIRONMENT: Group = Group::GROUP_1;
pub const LAYER_PLAYER: Group = Group::GROUP_2;
pub const LAYER_NPC: Group = Group::GROUP_3;
pub const LAYER_PLAYER_PROJECTILE: Group = Group::GROUP_4;
pub const LAYER_ENEMY_PROJECTILE: Group = Group::GROUP_5;
pub const LAYER_TRIGGER: Group = Group::GROUP_6;

/// Environment коллидирует со всем
pub const FILTER_ENVIRONMENT: Group = Group::ALL;

pub const FILTER_PLAYER: Group = LAYER_ENVIRONMENT
    .union(LAYER_NPC)
    .union(LAYER_ENEMY_PROJECTILE)
    .union(LAYER_TRIGGER);

pub const FILTER_NPC: Group = LAYER_ENVIRONMENT
    .union(LAYER_PLAYER)
    .union(LAYER_NPC)
    .union(LAYER_PLAYER_PROJECTILE)
    .union(LAYER_TRIGGER);

/// Снаряды игрока не задевают самого игрока и друг друга
pub const FILTER_PLAYER_PROJECTILE: Group = LAYER_ENVIRONMENT.union(LAYER_NPC);

pub const FILTER_ENEMY_PROJECTILE: Group = LAYER_ENVIRONMENT.union(LAYER_PLAYER);

pub const FILTER_TRIGGER: Group = LAYER_PLAYER.union(LAYER_NPC);

// ============================================================================
// Raycast masks (проверяются против memberships тела)
// ============================================================================

/// Line-of-sight от NPC до игрока
pub const MASK_NPC_SIGHT: Group = LAYER_ENVIRONMENT.union(LAYER_PLAYER);

/// Lock-on / hitscan игрока
pub const MASK_PLAYER_AIM: Group = LAYER_ENVIRONMENT.union(LAYER_NPC);

/// Ground check, obstacle probe
pub const MASK_GROUND: Group = LAYER_ENVIRONMENT;

pub fn environment_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_ENVIRONMENT, FILTER_ENVIRONMENT)
}

pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_PLAYER, FILTER_PLAYER)
}

pub fn npc_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_NPC, FILTER_NPC)
}

pub fn player_projectile_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_PLAYER_PROJECTILE, FILTER_PLAYER_PROJECTILE)
}

pub fn enemy_projectile_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_ENEMY_PROJECTILE, FILTER_ENEMY_PROJECTILE)
}

pub fn trigger_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_TRIGGER, FILTER_TRIGGER)
}

/// Название слоя для debug логов
pub fn layer_name(layer: Group) -> &'static str {
    if layer == LAYER_ENVIRONMENT {
        "Environment"
    } else if layer == LAYER_PLAYER {
        "Player"
    } else if layer == LAYER_NPC {
        "NPC"
    } else if layer == LAYER_PLAYER_PROJECTILE {
        "PlayerProjectile"
    } else if layer == LAYER_ENEMY_PROJECTILE {
        "EnemyProjectile"
    } else if layer == LAYER_TRIGGER {
        "Trigger"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interacts(a: CollisionGroups, b: CollisionGroups) -> bool {
        a.memberships.intersects(b.filters) && b.memberships.intersects(a.filters)
    }

    #[test]
    fn test_player_projectiles_ignore_player() {
        assert!(!interacts(player_projectile_groups(), player_groups()));
        assert!(interacts(player_projectile_groups(), npc_groups()));
        assert!(interacts(player_projectile_groups(), environment_groups()));
    }

    #[test]
    fn test_enemy_projectiles_ignore_npcs() {
        assert!(!interacts(enemy_projectile_groups(), npc_groups()));
        assert!(interacts(enemy_projectile_groups(), player_groups()));
    }

    #[test]
    fn test_triggers_only_see_actors() {
        assert!(interacts(trigger_groups(), player_groups()));
        assert!(interacts(trigger_groups(), npc_groups()));
        assert!(!interacts(trigger_groups(), environment_groups()));
        assert!(!interacts(trigger_groups(), player_projectile_groups()));
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(layer_name(LAYER_NPC), "NPC");
        assert_eq!(layer_name(LAYER_NPC.union(LAYER_PLAYER)), "Unknown");
    }
}
