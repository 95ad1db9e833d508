//! Numeric tuning surface (gameplay константы)
//!
//! Все значения экзогенны: читаются prefab'ами в момент создания entity.
//! Документ может содержать любое подмножество ключей — остальное берётся из Default.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{read_document, LoadError};

/// Полная конфигурация gameplay констант
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayTuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub energy: EnergyTuning,
    pub abilities: AbilityTuning,
    pub weapons: WeaponTuning,
    pub ai: AiTuning,
    pub projectiles: ProjectileTuning,
    pub water: WaterTuning,
    pub targeting: TargetingTuning,
}

impl GameplayTuning {
    pub fn from_json_str(text: &str) -> Result<Self, LoadError> {
        let tuning: GameplayTuning = serde_json::from_str(text)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.world.fixed_timestep > 0.0) {
            return Err(LoadError::invalid("world.fixed_timestep", "must be > 0"));
        }
        if self.world.max_sub_steps == 0 {
            return Err(LoadError::invalid("world.max_sub_steps", "must be >= 1"));
        }
        if self.ai.lose_sight_range <= self.ai.detection_range {
            return Err(LoadError::invalid(
                "ai.lose_sight_range",
                "must be strictly larger than ai.detection_range",
            ));
        }
        if !(self.ai.decision_hz > 0.0) {
            return Err(LoadError::invalid("ai.decision_hz", "must be > 0"));
        }
        if !(self.abilities.drain.energy_per_health > 0.0) {
            return Err(LoadError::invalid("abilities.drain.energy_per_health", "must be > 0"));
        }
        if !(self.ai.dash_duration > 0.0 && self.ai.dash_duration <= self.ai.dash_cooldown) {
            return Err(LoadError::invalid("ai.dash_duration", "must be in (0, ai.dash_cooldown]"));
        }
        if !(0.0..=2.0).contains(&self.projectiles.muzzle_offset) {
            return Err(LoadError::invalid("projectiles.muzzle_offset", "must be in [0, 2]"));
        }
        if !(0.0..=std::f32::consts::FRAC_PI_2).contains(&self.abilities.swarm.spread) {
            return Err(LoadError::invalid("abilities.swarm.spread", "must be in [0, pi/2] radians"));
        }
        if !(0.0..=1.0).contains(&self.world.knockback_lift) {
            return Err(LoadError::invalid("world.knockback_lift", "must be in [0, 1]"));
        }
        if !(0.0..=2.0).contains(&self.world.death_impulse_height) {
            return Err(LoadError::invalid("world.death_impulse_height", "must be in [0, 2]"));
        }
        Ok(())
    }
}

/// Загрузить tuning документ с диска
pub fn load_tuning(path: impl AsRef<std::path::Path>) -> Result<GameplayTuning, LoadError> {
    let text = read_document(path)?;
    GameplayTuning::from_json_str(&text)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Physics fixed step (секунды)
    pub fixed_timestep: f32,
    /// Максимум sub-steps за один frame
    pub max_sub_steps: u32,
    /// Clamp для frame delta (защита от spiral of death после паузы)
    pub max_frame_delta: f32,
    /// Модуль гравитации (м/с²), направлена вниз
    pub gravity: f32,
    /// Ниже этой высоты entity считается вылетевшим за мир
    pub kill_plane_y: f32,
    pub respawn_delay: f32,
    /// Ragdoll + fade для мёртвых NPC (секунды)
    pub death_sequence_duration: f32,
    /// Модуль случайного импульса при смерти
    pub death_impulse: f32,
    /// Точка приложения death impulse над центром тела (опрокидывание)
    pub death_impulse_height: f32,
    /// Вертикальная составляющая направления knockback (до нормализации)
    pub knockback_lift: f32,
    pub seed: u64,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_sub_steps: 3,
            max_frame_delta: 0.1,
            gravity: 9.82,
            kill_plane_y: -50.0,
            respawn_delay: 2.0,
            death_sequence_duration: 3.0,
            death_impulse: 4.0,
            death_impulse_height: 0.5,
            knockback_lift: 0.3,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub eye_height: f32,
    pub walk_speed: f32,
    pub jump_speed: f32,
    pub ground_check_distance: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub slam_speed: f32,
    pub slam_radius: f32,
    pub slam_damage: f32,
    pub slam_knockback: f32,
    pub slam_knockback_duration: f32,
    pub swim_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            radius: 0.5,
            mass: 70.0,
            linear_damping: 0.01,
            eye_height: 0.6,
            walk_speed: 8.0,
            jump_speed: 7.0,
            ground_check_distance: 0.15,
            dash_speed: 24.0,
            dash_duration: 0.18,
            dash_cooldown: 1.0,
            slam_speed: 30.0,
            slam_radius: 6.0,
            slam_damage: 40.0,
            slam_knockback: 12.0,
            slam_knockback_duration: 0.8,
            swim_speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyTuning {
    pub max: f32,
    /// Регенерация (units/sec)
    pub regen_rate: f32,
    /// Задержка регенерации после последнего использования способности (секунды)
    pub regen_delay: f32,
}

impl Default for EnergyTuning {
    fn default() -> Self {
        Self {
            max: 1000.0,
            regen_rate: 80.0,
            regen_delay: 1.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    /// Debug override: пропускает cooldown + energy gating
    pub debug_ignore_gating: bool,
    pub nuke: NukeTuning,
    pub swarm: SwarmTuning,
    pub wave: WaveTuning,
    pub drain: DrainTuning,
    pub plating: PlatingTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NukeTuning {
    pub cooldown: f32,
    pub energy_cost: f32,
    pub damage: f32,
    pub splash_radius: f32,
    pub speed: f32,
    /// Максимальная скорость поворота (рад/с)
    pub turn_rate: f32,
    pub lifetime: f32,
}

impl Default for NukeTuning {
    fn default() -> Self {
        Self {
            cooldown: 4.0,
            energy_cost: 250.0,
            damage: 120.0,
            splash_radius: 4.0,
            speed: 28.0,
            turn_rate: 6.0,
            lifetime: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmTuning {
    pub cooldown: f32,
    pub energy_cost: f32,
    pub count: u32,
    /// Задержка между spawn'ами (секунды)
    pub spawn_interval: f32,
    pub damage: f32,
    pub speed: f32,
    pub turn_rate: f32,
    pub lifetime: f32,
    /// Угол между соседними ракетами веера (радианы)
    pub spread: f32,
}

impl Default for SwarmTuning {
    fn default() -> Self {
        Self {
            cooldown: 6.0,
            energy_cost: 200.0,
            count: 5,
            spawn_interval: 0.12,
            damage: 25.0,
            speed: 22.0,
            turn_rate: 8.0,
            lifetime: 4.0,
            spread: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub cooldown: f32,
    pub energy_cost: f32,
    /// Длина прямоугольника AoE вдоль aim direction
    pub length: f32,
    pub half_width: f32,
    pub damage: f32,
    pub knockback_impulse: f32,
    pub knockback_duration: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            cooldown: 5.0,
            energy_cost: 150.0,
            length: 12.0,
            half_width: 3.0,
            damage: 10.0,
            knockback_impulse: 15.0,
            knockback_duration: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainTuning {
    pub cooldown: f32,
    /// Минимум energy для старта channel (gate)
    pub energy_cost: f32,
    pub energy_per_second: f32,
    /// ENERGY_PER_HEALTH: сколько energy стоит 1 единица health
    pub energy_per_health: f32,
}

impl Default for DrainTuning {
    fn default() -> Self {
        Self {
            cooldown: 3.0,
            energy_cost: 50.0,
            energy_per_second: 200.0,
            energy_per_health: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatingTuning {
    pub cooldown: f32,
    pub energy_cost: f32,
    pub duration: f32,
    /// Доля урона, которая поглощается (0.5 = половина)
    pub damage_reduction: f32,
}

impl Default for PlatingTuning {
    fn default() -> Self {
        Self {
            cooldown: 12.0,
            energy_cost: 300.0,
            duration: 6.0,
            damage_reduction: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub blade: BladeTuning,
    pub rifle: RifleTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BladeTuning {
    pub damage: f32,
    pub cooldown: f32,
    pub swing_range: f32,
    /// Порог dot(aim, to_target) для попадания в конус
    pub cone_dot: f32,
    /// Смещение hit-check от начала замаха (миллисекунды)
    pub hit_delay_ms: u32,
    pub swing_duration: f32,
}

impl Default for BladeTuning {
    fn default() -> Self {
        Self {
            damage: 35.0,
            cooldown: 0.6,
            swing_range: 3.0,
            cone_dot: 0.5,
            hit_delay_ms: 150,
            swing_duration: 0.45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RifleTuning {
    pub damage: f32,
    pub cooldown: f32,
    pub range: f32,
    pub magazine_size: u32,
    pub reserve_ammo: u32,
    pub fire_duration: f32,
    pub reload_duration: f32,
    pub inspect_duration: f32,
}

impl Default for RifleTuning {
    fn default() -> Self {
        Self {
            damage: 20.0,
            cooldown: 0.12,
            range: 120.0,
            magazine_size: 24,
            reserve_ammo: 96,
            fire_duration: 0.1,
            reload_duration: 1.6,
            inspect_duration: 2.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub max_health: f32,
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub eye_height: f32,
    pub detection_range: f32,
    /// Строго больше detection_range (гистерезис)
    pub lose_sight_range: f32,
    pub optimal_range: f32,
    pub min_range: f32,
    pub move_speed: f32,
    pub strafe_speed: f32,
    pub strafe_flip_interval: f32,
    /// Частота decision step (Hz), независимая от frame rate
    pub decision_hz: f32,
    pub attack_cooldown: f32,
    pub melee_range: f32,
    pub melee_damage: f32,
    pub dash_cooldown: f32,
    pub dash_speed: f32,
    /// Сколько рывок держит velocity (movement её не перезаписывает)
    pub dash_duration: f32,
    pub jump_cooldown: f32,
    pub jump_speed: f32,
    pub obstacle_probe_distance: f32,
    pub ground_check_distance: f32,
    pub search_arrive_distance: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            max_health: 500.0,
            radius: 0.5,
            mass: 60.0,
            linear_damping: 0.01,
            eye_height: 0.6,
            detection_range: 40.0,
            lose_sight_range: 60.0,
            optimal_range: 15.0,
            min_range: 6.0,
            move_speed: 6.0,
            strafe_speed: 4.0,
            strafe_flip_interval: 2.0,
            decision_hz: 10.0,
            attack_cooldown: 1.5,
            melee_range: 2.5,
            melee_damage: 15.0,
            dash_cooldown: 3.0,
            dash_speed: 8.0,
            dash_duration: 0.25,
            jump_cooldown: 1.2,
            jump_speed: 6.0,
            obstacle_probe_distance: 1.5,
            ground_check_distance: 0.2,
            search_arrive_distance: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub enemy_bolt_speed: f32,
    pub enemy_bolt_damage: f32,
    pub enemy_bolt_radius: f32,
    pub enemy_bolt_lifetime: f32,
    /// Cap на prediction time при упреждении цели (секунды)
    pub max_prediction_time: f32,
    pub player_projectile_radius: f32,
    /// Смещение точки spawn снаряда игрока от глаз вдоль aim
    pub muzzle_offset: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            enemy_bolt_speed: 40.0,
            enemy_bolt_damage: 12.0,
            enemy_bolt_radius: 0.2,
            enemy_bolt_lifetime: 6.0,
            max_prediction_time: 1.0,
            player_projectile_radius: 0.25,
            muzzle_offset: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterTuning {
    /// Linear damping тела в воде (заменяет базовый)
    pub linear_damping: f32,
    /// Демпфирование вертикальной скорости (1/сек)
    pub vertical_damping: f32,
}

impl Default for WaterTuning {
    fn default() -> Self {
        Self {
            linear_damping: 0.6,
            vertical_damping: 2.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingTuning {
    pub max_range: f32,
    /// Максимальное отклонение от camera forward (градусы)
    pub max_angle_degrees: f32,
}

impl Default for TargetingTuning {
    fn default() -> Self {
        Self {
            max_range: 60.0,
            max_angle_degrees: 25.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let tuning = GameplayTuning::from_json_str(r#"{ "ai": { "detection_range": 30.0 } }"#)
            .expect("partial tuning must parse");

        assert_eq!(tuning.ai.detection_range, 30.0);
        assert_eq!(tuning.ai.lose_sight_range, 60.0);
        assert_eq!(tuning.abilities.drain.energy_per_health, 2.0);
        assert_eq!(tuning.world.max_sub_steps, 3);
    }

    #[test]
    fn test_lose_sight_must_exceed_detection() {
        let result = GameplayTuning::from_json_str(
            r#"{ "ai": { "detection_range": 50.0, "lose_sight_range": 50.0 } }"#,
        );
        assert!(matches!(result, Err(LoadError::Invalid { .. })));
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameplayTuning::default().validate().is_ok());
    }

    #[test]
    fn test_motion_constants_read_from_document() {
        let tuning = GameplayTuning::from_json_str(
            r#"{
                "ai": { "dash_duration": 0.4 },
                "projectiles": { "muzzle_offset": 1.2 },
                "abilities": { "swarm": { "spread": 0.3 } },
                "world": { "knockback_lift": 0.0, "death_impulse_height": 0.9 }
            }"#,
        )
        .expect("tuning must parse");

        assert_eq!(tuning.ai.dash_duration, 0.4);
        assert_eq!(tuning.projectiles.muzzle_offset, 1.2);
        assert_eq!(tuning.abilities.swarm.spread, 0.3);
        assert_eq!(tuning.world.knockback_lift, 0.0);
        assert_eq!(tuning.world.death_impulse_height, 0.9);
    }

    #[test]
    fn test_out_of_range_motion_constants_rejected() {
        let cases = [
            (r#"{ "ai": { "dash_duration": 0.0 } }"#, "ai.dash_duration"),
            (r#"{ "ai": { "dash_duration": 5.0, "dash_cooldown": 3.0 } }"#, "ai.dash_duration"),
            (r#"{ "projectiles": { "muzzle_offset": -0.1 } }"#, "projectiles.muzzle_offset"),
            (r#"{ "abilities": { "swarm": { "spread": 2.0 } } }"#, "abilities.swarm.spread"),
            (r#"{ "world": { "knockback_lift": 1.5 } }"#, "world.knockback_lift"),
            (r#"{ "world": { "death_impulse_height": -1.0 } }"#, "world.death_impulse_height"),
        ];
        for (document, key) in cases {
            match GameplayTuning::from_json_str(document) {
                Err(LoadError::Invalid { what, .. }) => assert_eq!(what, key, "document {document}"),
                other => panic!("{document} → {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        let result = GameplayTuning::from_json_str("{ not json");
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }
}
