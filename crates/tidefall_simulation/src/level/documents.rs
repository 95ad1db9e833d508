//! Level / loadout документы (serde)
//!
//! Векторы — `[x, y, z]`. Validation проверяет весь документ целиком
//! до того, как loader создаст первую entity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::abilities::{AbilityId, MAX_ABILITY_SLOTS};
use crate::combat::WeaponId;
use crate::components::{NpcAttack, TriggerKind};
use crate::error::{read_document, LoadError};

/// Spawn / death-respawn точки загруженного уровня
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelSpawn {
    pub spawn: Vec3,
    pub death_respawn: Vec3,
}

/// Освещение уровня (только для renderer'а, симуляция не читает)
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelLighting {
    pub ambient: Option<serde_json::Value>,
    pub directional: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectShape {
    Box,
    Sphere,
}

/// Объект уровня. `size` — полные размеры (для sphere диаметр = size[0]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub shape: ObjectShape,
    pub size: [f32; 3],
    pub position: [f32; 3],
    /// Euler XYZ, градусы
    #[serde(default)]
    pub rotation: [f32; 3],
    /// 0 — static
    #[serde(default)]
    pub mass: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDescriptor {
    pub position: [f32; 3],
    #[serde(default = "default_team")]
    pub team: u64,
    #[serde(default = "default_attack")]
    pub attack: String,
    #[serde(default)]
    pub water_specialist: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub kind: String,
    pub size: [f32; 3],
    pub position: [f32; 3],
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_message_duration")]
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterDescriptor {
    pub position: [f32; 3],
    pub size: [f32; 3],
}

fn default_team() -> u64 {
    1
}

fn default_attack() -> String {
    "melee".to_string()
}

fn default_message_duration() -> f32 {
    4.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDocument {
    #[serde(default)]
    pub name: String,
    pub spawn: [f32; 3],
    /// Нет — используется `spawn`
    #[serde(default)]
    pub death_respawn: Option<[f32; 3]>,
    #[serde(default)]
    pub lighting: LevelLighting,
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
    #[serde(default)]
    pub npcs: Vec<NpcDescriptor>,
    #[serde(default)]
    pub triggers: Vec<TriggerDescriptor>,
    #[serde(default)]
    pub water: Vec<WaterDescriptor>,
}

impl LevelDocument {
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let document: LevelDocument = serde_json::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        Self::from_json_str(&read_document(path)?)
    }

    pub fn spawn_point(&self) -> Vec3 {
        Vec3::from_array(self.spawn)
    }

    pub fn death_respawn_point(&self) -> Vec3 {
        self.death_respawn.map_or(self.spawn_point(), Vec3::from_array)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        check_finite("spawn", self.spawn)?;
        if let Some(point) = self.death_respawn {
            check_finite("death_respawn", point)?;
        }

        for (i, object) in self.objects.iter().enumerate() {
            check_finite(&format!("objects[{i}].position"), object.position)?;
            check_finite(&format!("objects[{i}].rotation"), object.rotation)?;
            check_size(&format!("objects[{i}].size"), object.size)?;
            if !(object.mass >= 0.0) {
                return Err(LoadError::invalid(format!("objects[{i}].mass"), "must be >= 0"));
            }
        }

        for (i, npc) in self.npcs.iter().enumerate() {
            check_finite(&format!("npcs[{i}].position"), npc.position)?;
            if NpcAttack::parse(&npc.attack).is_none() {
                return Err(LoadError::invalid(
                    format!("npcs[{i}].attack"),
                    format!("unknown attack type '{}'", npc.attack),
                ));
            }
        }

        for (i, trigger) in self.triggers.iter().enumerate() {
            check_finite(&format!("triggers[{i}].position"), trigger.position)?;
            check_size(&format!("triggers[{i}].size"), trigger.size)?;
            let Some(kind) = TriggerKind::parse(&trigger.kind) else {
                return Err(LoadError::invalid(
                    format!("triggers[{i}].kind"),
                    format!("unknown trigger kind '{}'", trigger.kind),
                ));
            };
            if kind == TriggerKind::Message && trigger.message.is_none() {
                return Err(LoadError::invalid(format!("triggers[{i}].message"), "message trigger without text"));
            }
        }

        for (i, water) in self.water.iter().enumerate() {
            check_finite(&format!("water[{i}].position"), water.position)?;
            check_size(&format!("water[{i}].size"), water.size)?;
        }

        Ok(())
    }
}

/// Выбор игрока: оружие + до 4 способностей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutDocument {
    pub weapon: String,
    #[serde(default)]
    pub abilities: Vec<String>,
}

impl LoadoutDocument {
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let document: LoadoutDocument = serde_json::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, LoadError> {
        Self::from_json_str(&read_document(path)?)
    }

    pub fn weapon_id(&self) -> Result<WeaponId, LoadError> {
        WeaponId::parse(&self.weapon).ok_or_else(|| LoadError::UnknownWeapon(self.weapon.clone()))
    }

    pub fn ability_ids(&self) -> Result<Vec<AbilityId>, LoadError> {
        if self.abilities.len() > MAX_ABILITY_SLOTS {
            return Err(LoadError::TooManyAbilities(self.abilities.len()));
        }

        let mut ids = Vec::with_capacity(self.abilities.len());
        for name in &self.abilities {
            let id = AbilityId::parse(name).ok_or_else(|| LoadError::UnknownAbility(name.clone()))?;
            if ids.contains(&id) {
                return Err(LoadError::invalid("abilities", format!("'{name}' listed twice")));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        self.weapon_id()?;
        self.ability_ids()?;
        Ok(())
    }
}

fn check_finite(what: &str, value: [f32; 3]) -> Result<(), LoadError> {
    if value.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(LoadError::invalid(what, "non-finite component"))
    }
}

fn check_size(what: &str, value: [f32; 3]) -> Result<(), LoadError> {
    check_finite(what, value)?;
    if value.iter().all(|v| *v > 0.0) {
        Ok(())
    } else {
        Err(LoadError::invalid(what, "all dimensions must be > 0"))
    }
}
