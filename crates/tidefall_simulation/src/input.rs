//! Player input (пишется host'ом перед `GameWorld::update`)
//!
//! Held поля живут пока host их не сбросит. One-shot кнопки очищаются после каждого frame.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerInput {
    /// x = strafe (right +), y = forward (+)
    pub move_axis: Vec2,
    /// Camera forward (world space)
    pub look_direction: Vec3,
    pub swim_up: bool,
    pub swim_down: bool,

    // One-shot (edge) кнопки
    pub jump: bool,
    pub dash: bool,
    pub slam: bool,
    pub fire: bool,
    pub reload: bool,
    pub inspect: bool,
    /// Нажатие cast (для channeled — начало канала)
    pub cast: bool,
    /// Отпускание cast (конец канала)
    pub cast_released: bool,
    pub select_slot: Option<usize>,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            move_axis: Vec2::ZERO,
            look_direction: Vec3::NEG_Z,
            swim_up: false,
            swim_down: false,
            jump: false,
            dash: false,
            slam: false,
            fire: false,
            reload: false,
            inspect: false,
            cast: false,
            cast_released: false,
            select_slot: None,
        }
    }
}

impl PlayerInput {
    /// Нормализованный camera forward (fallback -Z)
    pub fn camera_forward(&self) -> Vec3 {
        self.look_direction.try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    pub fn clear_one_shots(&mut self) {
        self.jump = false;
        self.dash = false;
        self.slam = false;
        self.fire = false;
        self.reload = false;
        self.inspect = false;
        self.cast = false;
        self.cast_released = false;
        self.select_slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_keeps_held_state() {
        let mut input = PlayerInput {
            move_axis: Vec2::Y,
            swim_up: true,
            jump: true,
            cast: true,
            select_slot: Some(2),
            ..Default::default()
        };
        input.clear_one_shots();

        assert_eq!(input.move_axis, Vec2::Y);
        assert!(input.swim_up);
        assert!(!input.jump);
        assert!(!input.cast);
        assert_eq!(input.select_slot, None);
    }
}
