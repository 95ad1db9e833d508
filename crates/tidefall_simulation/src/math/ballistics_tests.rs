//! Tests for the ballistic solver.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::ballistics::{ballistic_or_direct, predict_target, solve_ballistic};

    const SPEED: f32 = 40.0;
    const GRAVITY: f32 = 9.82;

    /// Высота снаряда, когда он пролетел горизонтальное расстояние цели
    fn height_at_target(start: Vec3, target: Vec3, launch: Vec3) -> f32 {
        let dx = Vec3::new(target.x - start.x, 0.0, target.z - start.z).length();
        let horizontal_speed = Vec3::new(launch.x, 0.0, launch.z).length();
        let t = dx / horizontal_speed;
        start.y + launch.y * t - 0.5 * GRAVITY * t * t
    }

    #[test]
    fn test_flat_target_in_range_is_hit() {
        let start = Vec3::ZERO;
        let target = Vec3::new(60.0, 0.0, 20.0);

        let launch = solve_ballistic(start, target, SPEED, GRAVITY).expect("target in range");

        assert!((launch.length() - SPEED).abs() < 1e-3);
        assert!(launch.y > 0.0, "must aim upward to compensate gravity");
        let y = height_at_target(start, target, launch);
        assert!(y.abs() < 0.05, "landing error {}", y);
    }

    #[test]
    fn test_elevated_target_is_hit() {
        let start = Vec3::new(0.0, 1.0, 0.0);
        let target = Vec3::new(-30.0, 8.0, 45.0);

        let launch = solve_ballistic(start, target, SPEED, GRAVITY).expect("target in range");
        let y = height_at_target(start, target, launch);
        assert!((y - target.y).abs() < 0.05, "landing y {} vs {}", y, target.y);
    }

    #[test]
    fn test_low_angle_solution_chosen() {
        let launch = solve_ballistic(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0), SPEED, GRAVITY).unwrap();
        let angle = launch.y.atan2(launch.x);
        assert!(angle < std::f32::consts::FRAC_PI_4);
    }

    #[test]
    fn test_beyond_max_range_returns_none() {
        // v²/g ≈ 162.9
        assert!(solve_ballistic(Vec3::ZERO, Vec3::new(170.0, 0.0, 0.0), SPEED, GRAVITY).is_none());
        assert!(solve_ballistic(Vec3::ZERO, Vec3::new(160.0, 0.0, 0.0), SPEED, GRAVITY).is_some());
    }

    #[test]
    fn test_fallback_is_straight_line_same_speed() {
        let start = Vec3::ZERO;
        let target = Vec3::new(300.0, 0.0, 0.0);

        let velocity = ballistic_or_direct(start, target, SPEED, GRAVITY);
        assert!((velocity - Vec3::new(SPEED, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_prediction_capped() {
        let predicted = predict_target(Vec3::ZERO, Vec3::new(80.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0), 40.0, 1.0);
        // dist/speed = 2s → cap 1s
        assert!((predicted - Vec3::new(80.0, 0.0, 5.0)).length() < 1e-4);

        let predicted = predict_target(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), 40.0, 1.0);
        assert!((predicted - Vec3::new(20.0, 0.0, 2.0)).length() < 1e-4);
    }
}
