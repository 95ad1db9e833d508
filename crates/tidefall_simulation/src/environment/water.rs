//! Water / buoyancy
//!
//! AABB + точный parry sphere-vs-box тест против каждого WaterVolume.
//! В воде: повышенный damping, нейтральная плавучесть (−gravity × mass) +
//! гашение вертикальной скорости. Specialist держится на поверхности.

use bevy::prelude::*;

use crate::components::{Health, MovementMode, Swimmer, WaterVolume};
use crate::config::GameplayTuning;
use crate::physics::shapes::sphere_overlaps_box;
use crate::physics::{PhysicsBody, PhysicsWorld};

/// Сфера (центр тела + proxy radius) пересекает объём воды
pub fn sphere_in_water(center: Vec3, radius: f32, water: &WaterVolume) -> bool {
    sphere_overlaps_box(center, radius, water.center, water.half_extents)
}

/// Сила плавучести для погружённого тела
///
/// Нейтральная плавучесть + демпфирование вертикальной скорости.
pub fn buoyancy_force(gravity: Vec3, mass: f32, vertical_velocity: f32, vertical_damping: f32) -> Vec3 {
    -gravity * mass - Vec3::Y * vertical_velocity * vertical_damping * mass
}

/// Система: water enter / exit + buoyancy
pub fn update_water(
    tuning: Res<GameplayTuning>,
    mut physics: ResMut<PhysicsWorld>,
    waters: Query<&WaterVolume>,
    mut swimmers: Query<(Entity, &PhysicsBody, &mut Swimmer, &Health, Option<&mut MovementMode>)>,
) {
    let config = &tuning.water;
    let gravity = physics.gravity();

    for (entity, body, mut swimmer, health, mode) in swimmers.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let Some(rigid) = physics.body(body.handle) else {
            continue;
        };
        let (position, radius, mass) = (rigid.position, rigid.shape.proxy_radius(), rigid.mass);
        let velocity = rigid.linear_velocity;

        let water = waters.iter().find(|water| sphere_in_water(position, radius, water));

        match (swimmer.in_water, water.is_some()) {
            (false, true) => {
                swimmer.in_water = true;
                physics.set_linear_damping(body.handle, config.linear_damping);
                if let Some(mut mode) = mode {
                    *mode = MovementMode::Swim;
                }
                crate::logger::log(&format!("🌊 {:?} entered water", entity));
            }
            (true, false) => {
                swimmer.in_water = false;
                physics.set_linear_damping(body.handle, swimmer.base_damping);
                if let Some(mut mode) = mode {
                    *mode = MovementMode::Walk;
                }
                crate::logger::log(&format!("🏖️ {:?} left water", entity));
            }
            _ => {}
        }

        let Some(water) = water else {
            continue;
        };

        if swimmer.specialist {
            // Specialist не тонет: прижимаем к поверхности
            let surface = water.surface_y();
            if position.y < surface {
                physics.set_position(body.handle, Vec3::new(position.x, surface, position.z));
                physics.set_velocity(body.handle, Vec3::new(velocity.x, velocity.y.max(0.0), velocity.z));
            }
            physics.apply_force(body.handle, -gravity * mass);
            continue;
        }

        physics.apply_force(
            body.handle,
            buoyancy_force(gravity, mass, velocity.y, config.vertical_damping),
        );
    }
}
