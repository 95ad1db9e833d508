//! Rigid body описание и состояние

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionGroups;

use super::shapes::Shape;

/// Стабильный идентификатор тела внутри `PhysicsWorld`
///
/// Handles никогда не переиспользуются (монотонный счётчик).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u32);

/// Параметры создания тела
///
/// `mass == 0.0` → static body (не двигается, бесконечная масса).
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec3,
    pub rotation: Quat,
    pub mass: f32,
    pub groups: CollisionGroups,
    /// Sensor: сообщает overlaps, без collision response
    pub sensor: bool,
    pub linear_damping: f32,
    pub gravity_scale: f32,
    pub fixed_rotation: bool,
    pub velocity: Vec3,
    pub friction: f32,
}

impl BodyDesc {
    pub fn dynamic(shape: Shape, position: Vec3, mass: f32, groups: CollisionGroups) -> Self {
        Self {
            shape,
            position,
            rotation: Quat::IDENTITY,
            mass,
            groups,
            sensor: false,
            linear_damping: 0.0,
            gravity_scale: 1.0,
            fixed_rotation: false,
            velocity: Vec3::ZERO,
            friction: 0.5,
        }
    }

    pub fn fixed(shape: Shape, position: Vec3, rotation: Quat, groups: CollisionGroups) -> Self {
        Self {
            rotation,
            ..Self::dynamic(shape, position, 0.0, groups)
        }
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Актёры двигаются velocity-контроллером, трение о пол им мешает
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// Snapshot состояния тела (копия, не ссылка в rapier sets)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub shape: Shape,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub mass: f32,
    pub linear_damping: f32,
    pub sensor: bool,
}
