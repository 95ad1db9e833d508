//! World facade
//!
//! `GameWorld` владеет Bevy `App` и гоняет один frame за вызов `update(dt)`:
//! 1. clamp dt, продвинуть `Time`
//! 2. physics step (fixed sub-steps) → contacts → `CollisionEvents`
//! 3. `SimulationTick` (все системы в фиксированном порядке, снаряды последними)
//! 4. flush очереди удаления тел
//! 5. раздать накопленные `GameEvent` подписчикам `EventBus`
//!
//! После `dispose()` ни одна система и ни одна отложенная задача не выполняется.

use std::time::Duration;

use bevy::prelude::*;

use crate::components::{EntityKind, Health};
use crate::config::GameplayTuning;
use crate::error::LoadError;
use crate::events::{EventBus, GameEvent, GameEventKind, ListenerId};
use crate::input::PlayerInput;
use crate::level::{LevelDocument, LoadoutDocument};
use crate::physics::{CollisionEvents, PhysicsBody, PhysicsWorld};
use crate::{DeterministicRng, SimulationPlugin};

pub mod registry;
pub mod schedule;
pub mod tasks;

pub use registry::{add_prefab, remove_entity, EntityRegistry, Prefab};
pub use schedule::{configure_simulation_schedule, SimulationSet, SimulationTick};
pub use tasks::{ScheduledTask, ScheduledTasks, TaskAction};

pub struct GameWorld {
    app: App,
    disposed: bool,
    frame: u64,
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new(GameplayTuning::default())
    }
}

impl GameWorld {
    /// Невалидный tuning → error в лог, мир строится на default значениях
    pub fn new(tuning: GameplayTuning) -> Self {
        match Self::try_new(tuning) {
            Ok(world) => world,
            Err(err) => {
                crate::logger::log_error(&format!("❌ GameWorld: {err}, falling back to default tuning"));
                Self::build(GameplayTuning::default())
            }
        }
    }

    pub fn try_new(tuning: GameplayTuning) -> Result<Self, LoadError> {
        tuning.validate()?;
        Ok(Self::build(tuning))
    }

    fn build(tuning: GameplayTuning) -> Self {
        let mut app = App::new();
        app.insert_resource(DeterministicRng::new(tuning.world.seed))
            .insert_resource(PhysicsWorld::new(Vec3::NEG_Y * tuning.world.gravity))
            .insert_resource(tuning)
            .add_plugins(SimulationPlugin);

        crate::logger::log_info("🌊 GameWorld created");
        Self {
            app,
            disposed: false,
            frame: 0,
        }
    }

    /// Один frame симуляции
    pub fn update(&mut self, delta_time: f32) {
        if self.disposed {
            return;
        }

        let world = self.app.world_mut();
        let world_tuning = world.resource::<GameplayTuning>().world.clone();
        let dt = if delta_time.is_finite() {
            delta_time.clamp(0.0, world_tuning.max_frame_delta)
        } else {
            0.0
        };

        world.resource_mut::<Time>().advance_by(Duration::from_secs_f32(dt));

        let contacts = {
            let mut physics = world.resource_mut::<PhysicsWorld>();
            physics.step(world_tuning.fixed_timestep, dt, world_tuning.max_sub_steps);
            physics.drain_contacts()
        };
        let resolved = world.resource::<EntityRegistry>().resolve_contacts(&contacts);
        world.resource_mut::<CollisionEvents>().contacts = resolved;

        world.run_schedule(SimulationTick);

        let removed = world.resource_mut::<PhysicsWorld>().flush_removals();
        world.resource_mut::<EntityRegistry>().unbind_bodies(&removed);
        world.resource_mut::<PlayerInput>().clear_one_shots();

        self.frame += 1;
        self.dispatch_events();
    }

    /// Добавить prefab (None после dispose)
    pub fn add<B: Bundle>(&mut self, prefab: Prefab<B>) -> Option<Entity> {
        let entity = add_prefab(self.app.world_mut(), prefab);
        self.dispatch_events();
        entity
    }

    /// Удалить entity (идемпотентно)
    pub fn remove(&mut self, entity: Entity) -> bool {
        let removed = remove_entity(self.app.world_mut(), entity);
        self.dispatch_events();
        removed
    }

    /// Загрузить уровень + loadout. Ошибка → ни одна entity не зарегистрирована.
    pub fn load_level(&mut self, level: &LevelDocument, loadout: &LoadoutDocument) -> Result<Entity, LoadError> {
        if self.disposed {
            return Err(LoadError::WorldDisposed);
        }
        let result = crate::level::load_level(self.app.world_mut(), level, loadout);
        self.dispatch_events();
        result
    }

    pub fn load_level_json(&mut self, level_json: &str, loadout_json: &str) -> Result<Entity, LoadError> {
        let level = LevelDocument::from_json_str(level_json)?;
        let loadout = LoadoutDocument::from_json_str(loadout_json)?;
        self.load_level(&level, &loadout)
    }

    /// Остановить мир: удалить все entities, flush тел, отцепить listeners
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        let world = self.app.world_mut();
        world.resource_mut::<ScheduledTasks>().clear();

        let entities = world.resource::<EntityRegistry>().all();
        let count = entities.len();
        for entity in entities {
            remove_entity(world, entity);
        }
        world.resource_mut::<EntityRegistry>().mark_disposed();

        let removed = world.resource_mut::<PhysicsWorld>().flush_removals();
        world.resource_mut::<EntityRegistry>().unbind_bodies(&removed);

        self.dispatch_events();
        self.app.world_mut().resource_mut::<EventBus>().clear();
        self.disposed = true;

        crate::logger::log_info(&format!("🛑 GameWorld disposed ({} entities removed)", count));
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    fn dispatch_events(&mut self) {
        let world = self.app.world_mut();
        let pending: Vec<GameEvent> = world.resource_mut::<Events<GameEvent>>().drain().collect();
        if pending.is_empty() {
            return;
        }
        let mut bus = world.resource_mut::<EventBus>();
        for event in &pending {
            bus.dispatch(event);
        }
    }

    // ========================================================================
    // Event bus
    // ========================================================================

    pub fn subscribe(
        &mut self,
        kind: GameEventKind,
        listener: impl FnMut(&GameEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.app.world_mut().resource_mut::<EventBus>().subscribe(kind, listener)
    }

    pub fn subscribe_all(&mut self, listener: impl FnMut(&GameEvent) + Send + Sync + 'static) -> ListenerId {
        self.app.world_mut().resource_mut::<EventBus>().subscribe_all(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.app.world_mut().resource_mut::<EventBus>().unsubscribe(id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn contains(&self, entity: Entity) -> bool {
        self.registry().contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.registry().len()
    }

    pub fn entities_of(&self, kind: EntityKind) -> Vec<Entity> {
        self.registry().of_kind(kind).collect()
    }

    pub fn player(&self) -> Option<Entity> {
        self.registry().of_kind(EntityKind::Player).next()
    }

    pub fn enemies(&self) -> Vec<Entity> {
        self.entities_of(EntityKind::Npc)
    }

    /// Message / level-end + death triggers
    pub fn triggers(&self) -> Vec<Entity> {
        let registry = self.registry();
        registry
            .of_kind(EntityKind::Trigger)
            .chain(registry.of_kind(EntityKind::DeathTrigger))
            .collect()
    }

    pub fn projectiles(&self) -> Vec<Entity> {
        self.entities_of(EntityKind::Projectile)
    }

    pub fn registry(&self) -> &EntityRegistry {
        self.app.world().resource::<EntityRegistry>()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        self.app.world().resource::<PhysicsWorld>()
    }

    pub fn tuning(&self) -> &GameplayTuning {
        self.app.world().resource::<GameplayTuning>()
    }

    pub fn scheduled_tasks(&self) -> &ScheduledTasks {
        self.app.world().resource::<ScheduledTasks>()
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.app.world().get::<T>(entity)
    }

    pub fn get_mut<T: Component<Mutability = bevy::ecs::component::Mutable>>(
        &mut self,
        entity: Entity,
    ) -> Option<Mut<'_, T>> {
        self.app.world_mut().get_mut::<T>(entity)
    }

    pub fn health(&self, entity: Entity) -> Option<Health> {
        self.get::<Health>(entity).copied()
    }

    pub fn body(&self, entity: Entity) -> Option<PhysicsBody> {
        self.get::<PhysicsBody>(entity).copied()
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        let body = self.body(entity)?;
        self.physics().position(body.handle)
    }

    pub fn velocity(&self, entity: Entity) -> Option<Vec3> {
        let body = self.body(entity)?;
        self.physics().velocity(body.handle)
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        if let Some(body) = self.body(entity) {
            self.physics_mut().set_position(body.handle, position);
        }
    }

    pub fn physics_mut(&mut self) -> Mut<'_, PhysicsWorld> {
        self.app.world_mut().resource_mut::<PhysicsWorld>()
    }

    pub fn input(&self) -> &PlayerInput {
        self.app.world().resource::<PlayerInput>()
    }

    pub fn input_mut(&mut self) -> Mut<'_, PlayerInput> {
        self.app.world_mut().resource_mut::<PlayerInput>()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// Детерминированный snapshot (health + AI state + позиция по entity)
    pub fn snapshot(&mut self) -> Vec<u8> {
        let mut query = self
            .app
            .world_mut()
            .query::<(Entity, &EntityKind, Option<&Health>, Option<&crate::ai::AiBrain>, Option<&PhysicsBody>)>();
        let world = self.app.world();
        let physics = world.resource::<PhysicsWorld>();

        let mut rows: Vec<_> = query.iter(world).collect();
        rows.sort_by_key(|(entity, ..)| entity.index());

        let mut snapshot = Vec::new();
        for (entity, kind, health, brain, body) in rows {
            snapshot.extend_from_slice(&entity.index().to_le_bytes());
            snapshot.extend_from_slice(kind.as_str().as_bytes());
            if let Some(health) = health {
                snapshot.extend_from_slice(&health.current.to_bits().to_le_bytes());
            }
            if let Some(brain) = brain {
                snapshot.extend_from_slice(format!("{:?}", brain.state).as_bytes());
            }
            if let Some(position) = body.and_then(|b| physics.position(b.handle)) {
                for component in position.to_array() {
                    snapshot.extend_from_slice(&component.to_bits().to_le_bytes());
                }
            }
        }
        snapshot
    }
}
