//! Weapon state machine (независим от abilities)
//!
//! idle → firing / swinging → idle
//! Ranged: + reloading, inspecting. Одновременно активно не больше одного состояния.

use bevy::prelude::*;
use thiserror::Error;

use super::NpcTargets;
use crate::combat::damage::deal_damage;
use crate::config::WeaponTuning;
use crate::events::GameEvent;
use crate::math::{horizontal, in_cone};
use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponId {
    Blade,
    Rifle,
}

impl WeaponId {
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "blade" => Some(Self::Blade),
            "rifle" => Some(Self::Rifle),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeaponId::Blade => "blade",
            WeaponId::Rifle => "rifle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponState {
    Idle,
    Firing,
    Swinging,
    Reloading,
    Inspecting,
}

/// Melee: отложенный hit-check конуса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeleeStats {
    pub swing_range: f32,
    pub cone_dot: f32,
    /// Смещение hit-check от начала замаха (секунды)
    pub hit_delay: f32,
    pub swing_duration: f32,
}

/// Hitscan с магазином
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitscanStats {
    pub range: f32,
    pub magazine_size: u32,
    pub magazine: u32,
    pub reserve: u32,
    pub fire_duration: f32,
    pub reload_duration: f32,
    pub inspect_duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponKind {
    Melee(MeleeStats),
    Hitscan(HitscanStats),
}

/// Что произошло при успешной атаке
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackKind {
    Swing(MeleeStats),
    Shot { range: f32 },
}

/// Почему действие оружия отклонено (gating, не ошибка frame loop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WeaponActionRejected {
    #[error("weapon busy ({0:?})")]
    Busy(WeaponState),
    #[error("weapon on cooldown")]
    OnCooldown,
    #[error("magazine empty")]
    EmptyMagazine,
    #[error("magazine full")]
    MagazineFull,
    #[error("no reserve ammo")]
    NoReserveAmmo,
    #[error("action not supported by this weapon")]
    Unsupported,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Weapon {
    pub id: WeaponId,
    pub damage: f32,
    pub cooldown: f32,
    /// Считает вверх до `cooldown` (готово при ≥ cooldown)
    pub cooldown_timer: f32,
    pub state: WeaponState,
    /// Осталось в текущем не-idle состоянии
    pub state_timer: f32,
    pub kind: WeaponKind,
}

impl Weapon {
    pub fn from_tuning(id: WeaponId, tuning: &WeaponTuning) -> Self {
        match id {
            WeaponId::Blade => {
                let blade = &tuning.blade;
                Self::new(
                    id,
                    blade.damage,
                    blade.cooldown,
                    WeaponKind::Melee(MeleeStats {
                        swing_range: blade.swing_range,
                        cone_dot: blade.cone_dot,
                        hit_delay: blade.hit_delay_ms as f32 / 1000.0,
                        swing_duration: blade.swing_duration,
                    }),
                )
            }
            WeaponId::Rifle => {
                let rifle = &tuning.rifle;
                Self::new(
                    id,
                    rifle.damage,
                    rifle.cooldown,
                    WeaponKind::Hitscan(HitscanStats {
                        range: rifle.range,
                        magazine_size: rifle.magazine_size,
                        magazine: rifle.magazine_size,
                        reserve: rifle.reserve_ammo,
                        fire_duration: rifle.fire_duration,
                        reload_duration: rifle.reload_duration,
                        inspect_duration: rifle.inspect_duration,
                    }),
                )
            }
        }
    }

    pub fn new(id: WeaponId, damage: f32, cooldown: f32, kind: WeaponKind) -> Self {
        let cooldown = cooldown.max(0.0);
        Self {
            id,
            damage,
            cooldown,
            cooldown_timer: cooldown,
            state: WeaponState::Idle,
            state_timer: 0.0,
            kind,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == WeaponState::Idle
    }

    pub fn is_ready(&self) -> bool {
        self.is_idle() && self.cooldown_timer >= self.cooldown
    }

    /// (magazine, reserve) для hitscan
    pub fn ammo(&self) -> Option<(u32, u32)> {
        match self.kind {
            WeaponKind::Hitscan(stats) => Some((stats.magazine, stats.reserve)),
            WeaponKind::Melee(_) => None,
        }
    }

    /// Начать атаку. Пустой магазин → автоматический reload + отказ.
    pub fn try_attack(&mut self) -> Result<AttackKind, WeaponActionRejected> {
        if !self.is_idle() {
            return Err(WeaponActionRejected::Busy(self.state));
        }
        if self.cooldown_timer < self.cooldown {
            return Err(WeaponActionRejected::OnCooldown);
        }

        match &mut self.kind {
            WeaponKind::Melee(stats) => {
                let stats = *stats;
                self.enter(WeaponState::Swinging, stats.swing_duration);
                self.cooldown_timer = 0.0;
                Ok(AttackKind::Swing(stats))
            }
            WeaponKind::Hitscan(stats) => {
                if stats.magazine == 0 {
                    self.auto_reload();
                    return Err(WeaponActionRejected::EmptyMagazine);
                }
                stats.magazine -= 1;
                let (range, duration) = (stats.range, stats.fire_duration);
                self.enter(WeaponState::Firing, duration);
                self.cooldown_timer = 0.0;
                Ok(AttackKind::Shot { range })
            }
        }
    }

    pub fn start_reload(&mut self) -> Result<(), WeaponActionRejected> {
        let WeaponKind::Hitscan(stats) = self.kind else {
            return Err(WeaponActionRejected::Unsupported);
        };
        if !self.is_idle() {
            return Err(WeaponActionRejected::Busy(self.state));
        }
        if stats.magazine >= stats.magazine_size {
            return Err(WeaponActionRejected::MagazineFull);
        }
        if stats.reserve == 0 {
            return Err(WeaponActionRejected::NoReserveAmmo);
        }
        self.enter(WeaponState::Reloading, stats.reload_duration);
        Ok(())
    }

    /// Reload без запроса игрока (пустой магазин): отказ только логируется
    fn auto_reload(&mut self) {
        if let Err(reason) = self.start_reload() {
            crate::logger::log(&format!("🔫 Auto-reload skipped: {reason}"));
        }
    }

    pub fn start_inspect(&mut self) -> Result<(), WeaponActionRejected> {
        let WeaponKind::Hitscan(stats) = self.kind else {
            return Err(WeaponActionRejected::Unsupported);
        };
        if !self.is_idle() {
            return Err(WeaponActionRejected::Busy(self.state));
        }
        self.enter(WeaponState::Inspecting, stats.inspect_duration);
        Ok(())
    }

    fn enter(&mut self, state: WeaponState, duration: f32) {
        self.state = state;
        self.state_timer = duration.max(0.0);
    }

    /// Продвинуть cooldown + состояние. Возвращает только что завершённое состояние.
    pub fn tick(&mut self, dt: f32) -> Option<WeaponState> {
        self.cooldown_timer = (self.cooldown_timer + dt).min(self.cooldown);

        if self.is_idle() {
            return None;
        }
        self.state_timer -= dt;
        if self.state_timer > 0.0 {
            return None;
        }

        let finished = self.state;
        self.state = WeaponState::Idle;
        self.state_timer = 0.0;

        if let WeaponKind::Hitscan(stats) = &mut self.kind {
            match finished {
                WeaponState::Reloading => {
                    let taken = (stats.magazine_size - stats.magazine).min(stats.reserve);
                    stats.magazine += taken;
                    stats.reserve -= taken;
                }
                WeaponState::Firing if stats.magazine == 0 => {
                    self.auto_reload();
                }
                _ => {}
            }
        }
        Some(finished)
    }
}

/// Melee hit-check: все живые NPC в конусе перед атакующим
///
/// Возвращает количество задетых целей.
pub fn resolve_melee_hit(
    origin: Vec3,
    aim: Vec3,
    range: f32,
    cone_dot: f32,
    damage: f32,
    physics: &PhysicsWorld,
    npcs: &mut NpcTargets,
    events: &mut EventWriter<GameEvent>,
) -> usize {
    let mut hits = 0;
    for (entity, body, mut health, effects) in npcs.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        if !in_cone(horizontal(origin), horizontal(aim), horizontal(position), range, cone_dot) {
            continue;
        }
        deal_damage(entity, &mut health, effects, damage, events);
        hits += 1;
    }
    if hits > 0 {
        crate::logger::log(&format!("🗡️ Melee hit {} target(s)", hits));
    }
    hits
}
