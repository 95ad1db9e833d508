//! FSM AI components (state machine, perception, config).

use bevy::prelude::*;

use crate::config::AiTuning;

/// AI FSM состояния
///
/// IDLE → COMBAT → SEARCHING → IDLE. Прямого IDLE → SEARCHING нет.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AiState {
    /// Idle — начальное состояние после спавна
    #[default]
    Idle,

    /// Searching — идём к последней известной позиции игрока
    Searching { last_known: Vec3 },

    /// Combat — держим дистанцию, атакуем, стрейфим
    Combat,
}

impl AiState {
    pub fn name(&self) -> &'static str {
        match self {
            AiState::Idle => "IDLE",
            AiState::Searching { .. } => "SEARCHING",
            AiState::Combat => "COMBAT",
        }
    }
}

/// Снимок восприятия (обновляется только на decision cadence)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub has_line_of_sight: bool,
    pub distance: f32,
    pub player_position: Option<Vec3>,
    pub player_velocity: Vec3,
    /// Где игрока видели в последний раз (с line-of-sight)
    pub last_known_position: Option<Vec3>,
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            has_line_of_sight: false,
            distance: f32::INFINITY,
            player_position: None,
            player_velocity: Vec3::ZERO,
            last_known_position: None,
        }
    }
}

/// Параметры AI (копируются из tuning при создании NPC)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub detection_range: f32,
    /// Строго больше detection_range
    pub lose_sight_range: f32,
    pub optimal_range: f32,
    pub min_range: f32,
    pub move_speed: f32,
    pub strafe_speed: f32,
    pub strafe_flip_interval: f32,
    /// Период decision step (секунды)
    pub decision_interval: f32,
    pub attack_cooldown: f32,
    pub melee_range: f32,
    pub melee_damage: f32,
    pub dash_cooldown: f32,
    pub dash_speed: f32,
    /// Боковой рывок держит velocity (movement её не перезаписывает)
    pub dash_duration: f32,
    pub jump_cooldown: f32,
    pub jump_speed: f32,
    pub obstacle_probe_distance: f32,
    pub ground_check_distance: f32,
    pub search_arrive_distance: f32,
    pub eye_height: f32,
    pub radius: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_tuning(&AiTuning::default())
    }
}

impl AiConfig {
    pub fn from_tuning(tuning: &AiTuning) -> Self {
        Self {
            detection_range: tuning.detection_range,
            lose_sight_range: tuning.lose_sight_range,
            optimal_range: tuning.optimal_range,
            min_range: tuning.min_range,
            move_speed: tuning.move_speed,
            strafe_speed: tuning.strafe_speed,
            strafe_flip_interval: tuning.strafe_flip_interval,
            decision_interval: 1.0 / tuning.decision_hz.max(f32::EPSILON),
            attack_cooldown: tuning.attack_cooldown,
            melee_range: tuning.melee_range,
            melee_damage: tuning.melee_damage,
            dash_cooldown: tuning.dash_cooldown,
            dash_speed: tuning.dash_speed,
            dash_duration: tuning.dash_duration,
            jump_cooldown: tuning.jump_cooldown,
            jump_speed: tuning.jump_speed,
            obstacle_probe_distance: tuning.obstacle_probe_distance,
            ground_check_distance: tuning.ground_check_distance,
            search_arrive_distance: tuning.search_arrive_distance,
            eye_height: tuning.eye_height,
            radius: tuning.radius,
        }
    }
}

/// Мозг NPC: состояние + таймеры + последнее решение
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AiBrain {
    pub state: AiState,
    pub perception: Perception,
    /// До следующего decision step
    pub decision_timer: f32,
    pub attack_timer: f32,
    pub dash_timer: f32,
    pub jump_timer: f32,
    pub strafe_timer: f32,
    /// +1 вправо, -1 влево
    pub strafe_sign: f32,
    /// Горизонтальная скорость, применяемая каждый frame
    pub desired_velocity: Vec3,
    /// > 0 — AI полностью приостановлен (knockback)
    pub knockback_timer: f32,
    /// > 0 — идёт рывок, movement не трогает velocity
    pub dash_active: f32,
}

impl Default for AiBrain {
    fn default() -> Self {
        Self {
            state: AiState::Idle,
            perception: Perception::default(),
            decision_timer: 0.0,
            attack_timer: 0.0,
            dash_timer: 0.0,
            jump_timer: 0.0,
            strafe_timer: 0.0,
            strafe_sign: 1.0,
            desired_velocity: Vec3::ZERO,
            knockback_timer: 0.0,
            dash_active: 0.0,
        }
    }
}

impl AiBrain {
    pub fn is_knocked_back(&self) -> bool {
        self.knockback_timer > 0.0
    }

    /// Приостановить AI на `duration` (решения + movement)
    pub fn apply_knockback(&mut self, duration: f32) {
        self.knockback_timer = self.knockback_timer.max(duration);
        self.dash_active = 0.0;
        self.desired_velocity = Vec3::ZERO;
    }

    /// Per-frame cooldowns (attack / dash / jump / рывок / knockback)
    pub fn tick_timers(&mut self, dt: f32) {
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.jump_timer = (self.jump_timer - dt).max(0.0);
        self.dash_active = (self.dash_active - dt).max(0.0);
        self.knockback_timer = (self.knockback_timer - dt).max(0.0);
    }

    /// Decision cadence: true, если в этом frame пора принимать решение
    pub fn decision_due(&mut self, dt: f32, interval: f32) -> bool {
        self.decision_timer -= dt;
        if self.decision_timer > 0.0 {
            return false;
        }
        // Без накопления долга после длинных пауз
        self.decision_timer = (self.decision_timer + interval).max(0.0);
        true
    }
}

/// FSM transition по свежей perception
pub fn next_state(state: AiState, perception: &Perception, config: &AiConfig, position: Vec3) -> AiState {
    let sees_player = perception.has_line_of_sight && perception.distance <= config.detection_range;

    match state {
        AiState::Idle if sees_player => AiState::Combat,
        AiState::Idle => AiState::Idle,
        AiState::Combat if perception.distance > config.lose_sight_range => AiState::Searching {
            last_known: perception
                .last_known_position
                .or(perception.player_position)
                .unwrap_or(position),
        },
        AiState::Combat => AiState::Combat,
        AiState::Searching { .. } if sees_player => AiState::Combat,
        AiState::Searching { last_known } => {
            let offset = last_known - position;
            if Vec2::new(offset.x, offset.z).length() <= config.search_arrive_distance {
                AiState::Idle
            } else {
                state
            }
        }
    }
}
