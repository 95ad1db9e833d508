//! World-level компоненты: trigger volumes, water volumes, swimmers, level objects

use bevy::prelude::*;


/// Вид trigger volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum TriggerKind {
    /// Tutorial сообщение (только игрок, один раз)
    Message,
    /// Летальный урон всему живому (повторяемый)
    Death,
    /// Конец уровня (только игрок, один раз)
    LevelEnd,
}

impl TriggerKind {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "message" => Some(Self::Message),
            "death" => Some(Self::Death),
            "level_end" => Some(Self::LevelEnd),
            _ => None,
        }
    }

    /// One-shot triggers срабатывают не больше одного раза за уровень
    pub fn is_one_shot(&self) -> bool {
        !matches!(self, TriggerKind::Death)
    }
}

#[derive(Component, Debug, Clone)]
pub struct TriggerVolume {
    pub kind: TriggerKind,
    pub message: Option<String>,
    /// Длительность показа сообщения (секунды)
    pub duration: f32,
    pub fired: bool,
}

impl TriggerVolume {
    pub fn new(kind: TriggerKind) -> Self {
        Self {
            kind,
            message: None,
            duration: 0.0,
            fired: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>, duration: f32) -> Self {
        self.message = Some(message.into());
        self.duration = duration;
        self
    }
}

/// Axis-aligned объём воды (без физического тела)
#[derive(Component, Debug, Clone, Copy)]
pub struct WaterVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl WaterVolume {
    /// Высота поверхности (верхняя грань)
    pub fn surface_y(&self) -> f32 {
        self.center.y + self.half_extents.y
    }
}

/// Entity, способная плавать (игрок, NPC)
#[derive(Component, Debug, Clone, Copy)]
pub struct Swimmer {
    pub in_water: bool,
    /// Water specialist — держится на поверхности, не погружается
    pub specialist: bool,
    /// Damping тела вне воды (восстанавливается при выходе)
    pub base_damping: f32,
}

impl Swimmer {
    pub fn new(base_damping: f32) -> Self {
        Self {
            in_water: false,
            specialist: false,
            base_damping,
        }
    }
}

/// Статический или подвижный объект уровня (геометрия, ящики)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LevelObject {
    /// mass > 0 — объект двигается физикой
    pub dynamic: bool,
}
