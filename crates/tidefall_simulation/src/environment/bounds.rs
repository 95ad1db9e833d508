//! Out-of-bounds: всё живое ниже kill plane умирает обычным путём смерти,
//! упавшие dynamic объекты уровня просто удаляются

use bevy::prelude::*;

use crate::combat::damage::deal_lethal_damage;
use crate::components::{Health, LevelObject};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::physics::{PhysicsBody, PhysicsWorld};
use crate::world::remove_entity;

/// Система: kill plane
pub fn kill_out_of_bounds(
    tuning: Res<GameplayTuning>,
    physics: Res<PhysicsWorld>,
    mut actors: Query<(Entity, &PhysicsBody, &mut Health)>,
    objects: Query<(Entity, &PhysicsBody, &LevelObject), Without<Health>>,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    let kill_plane = tuning.world.kill_plane_y;

    for (entity, body, mut health) in actors.iter_mut() {
        if health.is_dead() {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        if position.y >= kill_plane {
            continue;
        }

        deal_lethal_damage(entity, &mut health, &mut events);
        crate::logger::log(&format!("🕳️ {:?} fell out of bounds (y = {:.1})", entity, position.y));
    }

    for (entity, body, object) in objects.iter() {
        if !object.dynamic || physics.is_pending_removal(body.handle) {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        if position.y >= kill_plane {
            continue;
        }

        crate::logger::log(&format!("🕳️ Object {:?} fell out of bounds, removing", entity));
        commands.queue(move |world: &mut World| {
            remove_entity(world, entity);
        });
    }
}
