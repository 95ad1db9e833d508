//! Entity Registry: единственный источник правды "что существует"
//!
//! - type-indexed множества entities (`EntityKind` → entities)
//! - back-reference body → entity (вместо указателя в теле)
//! - add / remove с lifecycle событиями
//!
//! Prefab потребляется при добавлении, поэтому одна и та же entity
//! не может быть зарегистрирована дважды.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use bevy::prelude::*;

use crate::components::EntityKind;
use crate::events::GameEvent;
use crate::physics::{BodyDesc, BodyHandle, ContactEvent, EntityContact, PhysicsBody, PhysicsWorld};
use crate::world::tasks::ScheduledTasks;

#[derive(Resource, Debug, Default)]
pub struct EntityRegistry {
    by_kind: BTreeMap<EntityKind, BTreeSet<Entity>>,
    kinds: HashMap<Entity, EntityKind>,
    body_owners: HashMap<BodyHandle, Entity>,
    disposed: bool,
}

impl EntityRegistry {
    pub fn contains(&self, entity: Entity) -> bool {
        self.kinds.contains_key(&entity)
    }

    pub fn kind_of(&self, entity: Entity) -> Option<EntityKind> {
        self.kinds.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }

    /// Entities данного типа (порядок по Entity — детерминирован)
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = Entity> + '_ {
        self.by_kind.get(&kind).into_iter().flat_map(|set| set.iter().copied())
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.by_kind.get(&kind).map_or(0, BTreeSet::len)
    }

    pub fn all(&self) -> Vec<Entity> {
        self.by_kind.values().flat_map(|set| set.iter().copied()).collect()
    }

    pub fn entity_for_body(&self, handle: BodyHandle) -> Option<Entity> {
        self.body_owners.get(&handle).copied()
    }

    fn register(&mut self, entity: Entity, kind: EntityKind) -> bool {
        if self.kinds.contains_key(&entity) {
            return false;
        }
        self.kinds.insert(entity, kind);
        self.by_kind.entry(kind).or_default().insert(entity);
        true
    }

    fn unregister(&mut self, entity: Entity) -> Option<EntityKind> {
        let kind = self.kinds.remove(&entity)?;
        if let Some(set) = self.by_kind.get_mut(&kind) {
            set.remove(&entity);
        }
        Some(kind)
    }

    fn bind_body(&mut self, handle: BodyHandle, entity: Entity) {
        self.body_owners.insert(handle, entity);
    }

    /// Отвязать тела, реально удалённые из physics world
    pub(crate) fn unbind_bodies(&mut self, handles: &[BodyHandle]) {
        for handle in handles {
            self.body_owners.remove(handle);
        }
    }

    /// Перевести contacts тел в contacts entities (тела без владельца отбрасываются)
    pub fn resolve_contacts(&self, contacts: &[ContactEvent]) -> Vec<EntityContact> {
        contacts
            .iter()
            .filter_map(|contact| {
                Some(EntityContact {
                    a: self.entity_for_body(contact.a)?,
                    b: self.entity_for_body(contact.b)?,
                    normal: contact.normal,
                    sensor: contact.sensor,
                })
            })
            .collect()
    }
}

/// Фабрика entity: тип + опциональное тело + набор компонентов
pub struct Prefab<B: Bundle> {
    pub kind: EntityKind,
    pub body: Option<BodyDesc>,
    pub bundle: B,
}

impl<B: Bundle> Prefab<B> {
    pub fn new(kind: EntityKind, bundle: B) -> Self {
        Self { kind, body: None, bundle }
    }

    pub fn with_body(mut self, body: BodyDesc) -> Self {
        self.body = Some(body);
        self
    }
}

/// Добавить prefab в мир
///
/// Spawn → тело в physics world → bind body → registry → `EntityAdded`.
/// После dispose — None.
pub fn add_prefab<B: Bundle>(world: &mut World, prefab: Prefab<B>) -> Option<Entity> {
    if world.resource::<EntityRegistry>().is_disposed() {
        return None;
    }

    let Prefab { kind, body, bundle } = prefab;
    let entity = world.spawn((kind, bundle)).id();

    if let Some(desc) = body {
        let handle = world.resource_mut::<PhysicsWorld>().create_body(desc);
        world.entity_mut(entity).insert(PhysicsBody { handle });
        world.resource_mut::<EntityRegistry>().bind_body(handle, entity);
    }

    world.resource_mut::<EntityRegistry>().register(entity, kind);
    world.send_event(GameEvent::EntityAdded { entity, kind });

    crate::logger::log(&format!("➕ Entity {:?} added ({})", entity, kind.as_str()));
    Some(entity)
}

/// Удалить entity из мира (идемпотентно)
///
/// Тело только ставится в очередь — реальное удаление после physics step.
/// Возвращает false, если entity уже не зарегистрирована.
pub fn remove_entity(world: &mut World, entity: Entity) -> bool {
    let Some(kind) = world.resource_mut::<EntityRegistry>().unregister(entity) else {
        return false;
    };

    if let Some(body) = world.get::<PhysicsBody>(entity).copied() {
        world.resource_mut::<PhysicsWorld>().queue_removal(body.handle);
    }

    // Отложенные действия владельца больше не нужны
    if let Some(mut tasks) = world.get_resource_mut::<ScheduledTasks>() {
        tasks.cancel_for(entity);
    }

    world.despawn(entity);
    world.send_event(GameEvent::EntityRemoved { entity, kind });

    crate::logger::log(&format!("➖ Entity {:?} removed ({})", entity, kind.as_str()));
    true
}
