//! Level loader: документы → entities
//!
//! Двухфазный: сначала всё, что может упасть (validation, weapon, loadout),
//! потом регистрация. Ошибка на первой фазе → мир не тронут.

use bevy::prelude::*;

use crate::abilities::AbilityLoadout;
use crate::combat::Weapon;
use crate::components::{NpcAttack, TriggerKind};
use crate::config::GameplayTuning;
use crate::error::LoadError;
use crate::world::{add_prefab, EntityRegistry};

use super::documents::{LevelDocument, LevelSpawn, LoadoutDocument};
use super::prefabs::{npc_prefab, object_prefab, player_prefab, trigger_prefab, water_prefab};

/// Загрузить уровень в мир. Возвращает entity игрока.
pub fn load_level(world: &mut World, level: &LevelDocument, loadout: &LoadoutDocument) -> Result<Entity, LoadError> {
    if world.resource::<EntityRegistry>().is_disposed() {
        return Err(LoadError::WorldDisposed);
    }

    // Фаза 1: всё fallible
    level.validate()?;
    let tuning = world.resource::<GameplayTuning>().clone();
    let weapon = Weapon::from_tuning(loadout.weapon_id()?, &tuning.weapons);
    let abilities = AbilityLoadout::from_ids(&loadout.ability_ids()?, &tuning.abilities, &tuning.energy)?;

    let mut npcs = Vec::with_capacity(level.npcs.len());
    for npc in &level.npcs {
        let attack = NpcAttack::parse(&npc.attack)
            .ok_or_else(|| LoadError::invalid("npc.attack", format!("unknown attack type '{}'", npc.attack)))?;
        npcs.push((npc, attack));
    }
    let mut triggers = Vec::with_capacity(level.triggers.len());
    for trigger in &level.triggers {
        let kind = TriggerKind::parse(&trigger.kind)
            .ok_or_else(|| LoadError::invalid("trigger.kind", format!("unknown trigger kind '{}'", trigger.kind)))?;
        triggers.push((trigger, kind));
    }

    // Фаза 2: регистрация (infallible)
    let spawn = LevelSpawn {
        spawn: level.spawn_point(),
        death_respawn: level.death_respawn_point(),
    };
    world.insert_resource(spawn);
    world.insert_resource(level.lighting.clone());

    for object in &level.objects {
        add_prefab(world, object_prefab(object));
    }
    for water in &level.water {
        add_prefab(world, water_prefab(water));
    }
    for (trigger, kind) in triggers {
        add_prefab(world, trigger_prefab(trigger, kind));
    }
    for (npc, attack) in npcs {
        add_prefab(
            world,
            npc_prefab(Vec3::from_array(npc.position), attack, npc.team, npc.water_specialist, &tuning),
        );
    }

    let player = add_prefab(world, player_prefab(spawn.spawn, &tuning, weapon, abilities))
        .ok_or(LoadError::WorldDisposed)?;

    crate::logger::log_info(&format!(
        "🗺️ Level '{}' loaded: {} objects, {} NPCs, {} triggers, {} water volumes",
        level.name,
        level.objects.len(),
        level.npcs.len(),
        level.triggers.len(),
        level.water.len()
    ));
    Ok(player)
}
