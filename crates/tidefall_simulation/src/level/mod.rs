//! Level / loadout ingestion
//!
//! - documents: serde модели + validation
//! - prefabs: фабрики entities (player, npc, object, trigger, water)
//! - loader: документы → entities (ничего не регистрирует при ошибке)

pub mod documents;
pub mod loader;
pub mod prefabs;

pub use documents::{
    LevelDocument, LevelLighting, LevelSpawn, LoadoutDocument, NpcDescriptor, ObjectDescriptor, ObjectShape,
    TriggerDescriptor, WaterDescriptor,
};
pub use loader::load_level;
pub use prefabs::{npc_prefab, object_prefab, player_prefab, trigger_prefab, water_prefab, PLAYER_FACTION};
