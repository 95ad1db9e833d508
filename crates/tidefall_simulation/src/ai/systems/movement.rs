//! AI movement systems.

use bevy::prelude::*;

use crate::ai::components::AiBrain;
use crate::components::{Health, Player};
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::status::StatusEffects;

/// Система: AI movement application (каждый frame)
///
/// Горизонтальная velocity ← последнее решение (`desired_velocity`).
/// Вертикальная компонента остаётся за физикой (гравитация, прыжки).
/// Knockback и активный рывок — velocity не трогаем.
pub fn ai_apply_movement(
    mut physics: ResMut<PhysicsWorld>,
    npcs: Query<(&PhysicsBody, &AiBrain, &Health, Option<&StatusEffects>), Without<Player>>,
) {
    for (body, brain, health, effects) in npcs.iter() {
        if health.is_dead() || brain.is_knocked_back() || brain.dash_active > 0.0 {
            continue;
        }
        let Some(velocity) = physics.velocity(body.handle) else {
            continue;
        };

        let multiplier = effects.map_or(1.0, StatusEffects::speed_multiplier);
        let horizontal = brain.desired_velocity * multiplier;
        physics.set_velocity(body.handle, Vec3::new(horizontal.x, velocity.y, horizontal.z));
    }
}
