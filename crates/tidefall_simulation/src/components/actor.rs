//! Базовые компоненты акторов: EntityKind, Actor, Health, Player, Npc

use bevy::prelude::*;

/// Type tag каждой entity в мире
///
/// Используется registry для type-indexed запросов (`enemies()`, `triggers()`, …).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
#[reflect(Component)]
pub enum EntityKind {
    Player,
    Npc,
    Object,
    Trigger,
    DeathTrigger,
    WaterVolume,
    Projectile,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Npc => "npc",
            EntityKind::Object => "object",
            EntityKind::Trigger => "trigger",
            EntityKind::DeathTrigger => "death_trigger",
            EntityKind::WaterVolume => "water_volume",
            EntityKind::Projectile => "projectile",
        }
    }
}

/// Актор (игрок или NPC) — живое существо со стороной конфликта
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Actor {
    /// Stable ID команды (игрок = 0)
    pub faction_id: u64,
}

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max. `current == 0` → entity мертва.
/// Менять только через `combat::damage` entry points.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn missing(&self) -> f32 {
        self.max - self.current
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Возвращает фактически снятое количество
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.is_dead() || !(amount > 0.0) {
            return 0.0;
        }
        let applied = amount.min(self.current);
        self.current -= applied;
        if self.current <= 0.0 {
            self.current = 0.0;
        }
        applied
    }

    /// Возвращает фактически восстановленное количество (мёртвых не лечим)
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_dead() || !(amount > 0.0) {
            return 0.0;
        }
        let applied = amount.min(self.missing());
        self.current = (self.current + applied).min(self.max);
        applied
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }
}

/// Marker: игрок (ровно один на уровень)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Тип атаки NPC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum NpcAttack {
    #[default]
    Melee,
    /// Баллистический bolt с упреждением
    Ranged,
}

impl NpcAttack {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "melee" => Some(Self::Melee),
            "ranged" => Some(Self::Ranged),
            _ => None,
        }
    }
}

/// Marker + параметры NPC
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Npc {
    pub attack: NpcAttack,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage_clamps_to_zero() {
        let mut health = Health::new(100.0);
        assert_eq!(health.take_damage(30.0), 30.0);
        assert_eq!(health.current, 70.0);

        assert_eq!(health.take_damage(500.0), 70.0);
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_damage_on_dead_is_noop() {
        let mut health = Health::new(50.0);
        health.take_damage(50.0);
        assert_eq!(health.take_damage(10.0), 0.0);
        assert_eq!(health.heal(10.0), 0.0);
        assert_eq!(health.current, 0.0);
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100.0);
        health.take_damage(40.0);
        assert_eq!(health.heal(100.0), 40.0);
        assert!(health.is_full());
    }

    #[test]
    fn test_negative_amounts_ignored() {
        let mut health = Health::new(100.0);
        assert_eq!(health.take_damage(-5.0), 0.0);
        assert_eq!(health.heal(f32::NAN), 0.0);
        assert_eq!(health.current, 100.0);
    }
}
