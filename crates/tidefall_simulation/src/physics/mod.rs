//! Physics adapter
//!
//! Headless rapier мир + ECS glue:
//! - `PhysicsBody` — component, связывает entity с ровно одним телом
//! - `CollisionEvents` — contacts текущего frame, уже переведённые в entities
//!
//! Back-reference body → entity хранится в `EntityRegistry` (не в теле).

use bevy::prelude::*;

pub mod body;
pub mod layers;
pub mod shapes;
pub mod world;

#[cfg(test)]
mod world_tests;

pub use body::{BodyDesc, BodyHandle, BodyState};
pub use shapes::Shape;
pub use world::{ContactEvent, PhysicsWorld, RayHit};

/// Entity владеет телом эксклюзивно
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub handle: BodyHandle,
}

/// Contact между двумя entities (normal от `a` к `b`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityContact {
    pub a: Entity,
    pub b: Entity,
    pub normal: Vec3,
    pub sensor: bool,
}

impl EntityContact {
    /// Если `entity` участвует — вернуть вторую сторону
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.a == entity {
            Some(self.b)
        } else if self.b == entity {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Contacts последнего physics step (перезаписываются каждый frame)
#[derive(Resource, Debug, Default)]
pub struct CollisionEvents {
    pub contacts: Vec<EntityContact>,
}

impl CollisionEvents {
    pub fn involving(&self, entity: Entity) -> impl Iterator<Item = (Entity, &EntityContact)> + '_ {
        self.contacts
            .iter()
            .filter_map(move |contact| contact.other(entity).map(|other| (other, contact)))
    }
}
