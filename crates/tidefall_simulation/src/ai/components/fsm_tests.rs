//! Tests for FSM AI components.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::fsm::{next_state, AiBrain, AiConfig, AiState, Perception};

    fn seen(distance: f32) -> Perception {
        Perception {
            has_line_of_sight: true,
            distance,
            player_position: Some(Vec3::new(0.0, 0.0, -distance)),
            last_known_position: Some(Vec3::new(0.0, 0.0, -distance)),
            ..Default::default()
        }
    }

    #[test]
    fn test_ai_state_default() {
        let brain = AiBrain::default();
        assert!(matches!(brain.state, AiState::Idle));
    }

    #[test]
    fn test_ai_config_default() {
        let config = AiConfig::default();
        assert_eq!(config.detection_range, 40.0);
        assert_eq!(config.lose_sight_range, 60.0);
        assert!((config.decision_interval - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_idle_to_combat_needs_range_and_sight() {
        let config = AiConfig::default();
        assert_eq!(next_state(AiState::Idle, &seen(39.0), &config, Vec3::ZERO), AiState::Combat);
        assert_eq!(next_state(AiState::Idle, &seen(41.0), &config, Vec3::ZERO), AiState::Idle);

        let blocked = Perception {
            has_line_of_sight: false,
            ..seen(10.0)
        };
        assert_eq!(next_state(AiState::Idle, &blocked, &config, Vec3::ZERO), AiState::Idle);
    }

    #[test]
    fn test_idle_never_goes_searching() {
        let config = AiConfig::default();
        for distance in [5.0, 45.0, 61.0, 500.0] {
            let state = next_state(AiState::Idle, &seen(distance), &config, Vec3::ZERO);
            assert!(!matches!(state, AiState::Searching { .. }));
        }
    }

    #[test]
    fn test_combat_hysteresis() {
        let config = AiConfig::default();
        // Между detection и lose_sight — всё ещё бой
        assert_eq!(next_state(AiState::Combat, &seen(50.0), &config, Vec3::ZERO), AiState::Combat);
        assert_eq!(next_state(AiState::Combat, &seen(60.0), &config, Vec3::ZERO), AiState::Combat);

        let state = next_state(AiState::Combat, &seen(60.5), &config, Vec3::ZERO);
        assert_eq!(state, AiState::Searching { last_known: Vec3::new(0.0, 0.0, -60.5) });
    }

    #[test]
    fn test_searching_arrives_to_idle() {
        let config = AiConfig::default();
        let searching = AiState::Searching { last_known: Vec3::new(10.0, 0.0, 0.0) };
        let lost = Perception::default();

        assert_eq!(next_state(searching, &lost, &config, Vec3::ZERO), searching);
        assert_eq!(next_state(searching, &lost, &config, Vec3::new(9.5, 1.0, 0.0)), AiState::Idle);
    }

    #[test]
    fn test_decision_cadence() {
        let mut brain = AiBrain::default();
        let interval = 0.1;
        let dt = 1.0 / 60.0;

        // Первый frame решает сразу
        assert!(brain.decision_due(dt, interval));

        let decisions = (0..60).filter(|_| brain.decision_due(dt, interval)).count();
        assert!((9..=11).contains(&decisions), "10 Hz ожидалось, было {}", decisions);
    }

    #[test]
    fn test_knockback_timer_logic() {
        let mut brain = AiBrain {
            desired_velocity: Vec3::X,
            ..Default::default()
        };
        brain.apply_knockback(1.0);
        assert!(brain.is_knocked_back());
        assert_eq!(brain.desired_velocity, Vec3::ZERO);

        brain.tick_timers(0.6);
        assert!(brain.is_knocked_back());
        brain.tick_timers(0.6);
        assert!(!brain.is_knocked_back());
    }
}
