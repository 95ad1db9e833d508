//! Ballistic trajectory solver
//!
//! Low-angle решение уравнения дальности:
//! tanθ = (v² − √(v⁴ − g(g·dx² + 2·dy·v²))) / (g·dx)

use bevy::prelude::*;

/// Launch velocity для попадания из `start` в `target` (скорость `speed`, гравитация `gravity` вниз)
///
/// None если дискриминант отрицательный (цель вне досягаемости).
pub fn solve_ballistic(start: Vec3, target: Vec3, speed: f32, gravity: f32) -> Option<Vec3> {
    if !(speed > 0.0) {
        return None;
    }

    let offset = target - start;
    let horizontal = Vec3::new(offset.x, 0.0, offset.z);
    let dx = horizontal.length();
    let dy = offset.y;

    if gravity <= 0.0 {
        return offset.try_normalize().map(|dir| dir * speed);
    }

    let v2 = speed * speed;

    // Цель строго над/под стартом
    if dx < 1e-4 {
        if dy > 0.0 && dy > v2 / (2.0 * gravity) {
            return None;
        }
        return Some(Vec3::Y * speed * dy.signum());
    }

    let discriminant = v2 * v2 - gravity * (gravity * dx * dx + 2.0 * dy * v2);
    if discriminant < 0.0 {
        return None;
    }

    let tan_theta = (v2 - discriminant.sqrt()) / (gravity * dx);
    let theta = tan_theta.atan();
    let direction = horizontal / dx;

    Some(direction * speed * theta.cos() + Vec3::Y * speed * theta.sin())
}

/// Ballistic solve с fallback на прямую линию той же скорости
pub fn ballistic_or_direct(start: Vec3, target: Vec3, speed: f32, gravity: f32) -> Vec3 {
    solve_ballistic(start, target, speed, gravity).unwrap_or_else(|| {
        (target - start).try_normalize().unwrap_or(Vec3::NEG_Z) * speed
    })
}

/// Упреждение: позиция цели через min(dist / speed, max_time)
pub fn predict_target(
    shooter: Vec3,
    target: Vec3,
    target_velocity: Vec3,
    projectile_speed: f32,
    max_prediction: f32,
) -> Vec3 {
    if projectile_speed <= 0.0 {
        return target;
    }
    let time = (shooter.distance(target) / projectile_speed).min(max_prediction);
    target + target_velocity * time
}
