//! Небольшие численные помощники: AoE тесты, steering, basis камеры

use bevy::prelude::*;

pub mod ballistics;

#[cfg(test)]
mod ballistics_tests;

pub use ballistics::{ballistic_or_direct, predict_target, solve_ballistic};

/// Проекция на горизонтальную плоскость
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Горизонтальный forward + right для camera-relative движения
///
/// right = forward × Y (forward сплющен до горизонтали).
pub fn camera_basis(look: Vec3) -> (Vec3, Vec3) {
    let forward = horizontal(look).try_normalize().unwrap_or(Vec3::NEG_Z);
    let right = forward.cross(Vec3::Y);
    (forward, right)
}

/// Точка внутри конуса: дистанция ≤ range и dot(aim, dir) ≥ cone_dot
pub fn in_cone(origin: Vec3, aim: Vec3, point: Vec3, range: f32, cone_dot: f32) -> bool {
    let offset = point - origin;
    let distance = offset.length();
    if distance > range {
        return false;
    }
    if distance < 1e-4 {
        return true;
    }
    let Some(aim) = aim.try_normalize() else {
        return false;
    };
    aim.dot(offset / distance) >= cone_dot
}

/// Точка внутри горизонтального прямоугольника перед `origin`
///
/// Вдоль `direction`: [0, length], поперёк: [-half_width, half_width].
pub fn in_rectangle(origin: Vec3, direction: Vec3, point: Vec3, length: f32, half_width: f32) -> bool {
    let Some(forward) = horizontal(direction).try_normalize() else {
        return false;
    };
    let side = forward.cross(Vec3::Y);
    let offset = horizontal(point - origin);
    let along = offset.dot(forward);
    let across = offset.dot(side);
    (0.0..=length).contains(&along) && across.abs() <= half_width
}

/// Повернуть velocity к `desired_dir` не более чем на `max_angle` радиан, модуль = `speed`
pub fn steer_towards(velocity: Vec3, desired_dir: Vec3, speed: f32, max_angle: f32) -> Vec3 {
    let Some(desired) = desired_dir.try_normalize() else {
        return velocity;
    };
    let Some(current) = velocity.try_normalize() else {
        return desired * speed;
    };

    let angle = current.angle_between(desired);
    if angle <= max_angle || angle < 1e-5 {
        return desired * speed;
    }

    let axis = current.cross(desired).try_normalize().unwrap_or_else(|| current.any_orthonormal_vector());
    Quat::from_axis_angle(axis, max_angle.max(0.0)) * current * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_basis_right_hand() {
        let (forward, right) = camera_basis(Vec3::new(0.0, -0.5, -1.0));
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((right - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_cone_rejects_behind_and_out_of_range() {
        let origin = Vec3::ZERO;
        let aim = Vec3::NEG_Z;
        assert!(in_cone(origin, aim, Vec3::new(0.5, 0.0, -2.0), 3.0, 0.5));
        assert!(!in_cone(origin, aim, Vec3::new(0.0, 0.0, 2.0), 3.0, 0.5));
        assert!(!in_cone(origin, aim, Vec3::new(0.0, 0.0, -3.5), 3.0, 0.5));
        // Сбоку: dot ≈ 0.24
        assert!(!in_cone(origin, aim, Vec3::new(2.0, 0.0, -0.5), 3.0, 0.5));
    }

    #[test]
    fn test_rectangle_bounds() {
        let origin = Vec3::ZERO;
        let dir = Vec3::X;
        assert!(in_rectangle(origin, dir, Vec3::new(5.0, 3.0, 2.9), 12.0, 3.0));
        assert!(!in_rectangle(origin, dir, Vec3::new(5.0, 0.0, 3.1), 12.0, 3.0));
        assert!(!in_rectangle(origin, dir, Vec3::new(-0.5, 0.0, 0.0), 12.0, 3.0));
        assert!(!in_rectangle(origin, dir, Vec3::new(12.5, 0.0, 0.0), 12.0, 3.0));
    }

    #[test]
    fn test_steering_limited_turn() {
        let velocity = Vec3::new(10.0, 0.0, 0.0);
        let steered = steer_towards(velocity, Vec3::Z, 10.0, 0.1);

        assert!((steered.length() - 10.0).abs() < 1e-4);
        let turned = velocity.angle_between(steered);
        assert!((turned - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_steering_snaps_within_budget() {
        let steered = steer_towards(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.05), 12.0, 1.0);
        assert!((steered.normalize() - Vec3::new(1.0, 0.0, 0.05).normalize()).length() < 1e-5);
        assert!((steered.length() - 12.0).abs() < 1e-4);
    }
}
