//! Movement компоненты игрока

use bevy::prelude::*;

/// Режим движения игрока
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementMode {
    #[default]
    Walk,
    /// Полное 3D движение относительно камеры (в воде)
    Swim,
}

/// Per-frame состояние контроллера игрока
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerMotor {
    pub grounded: bool,
    /// Осталось времени активного dash (секунды)
    pub dash_remaining: f32,
    /// До готовности следующего dash
    pub dash_cooldown: f32,
    pub dash_direction: Vec3,
    /// Slam в полёте (ждём приземления)
    pub slamming: bool,
}

impl PlayerMotor {
    pub fn is_dashing(&self) -> bool {
        self.dash_remaining > 0.0
    }
}

/// Таргет lock-on (обновляется каждый frame targeting системой)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct LockOn {
    pub target: Option<Entity>,
}

/// Состояние смерти игрока (ожидание respawn)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerLife {
    /// Some(t) — мёртв, до respawn осталось t секунд
    pub respawn_timer: Option<f32>,
}
