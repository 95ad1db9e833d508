//! Headless rapier world за стабильным `BodyHandle` API
//!
//! Один bulk `step()` на frame, fixed sub-steps через accumulator,
//! каждый sub-step = `PhysicsPipeline::step`. Raycasts через BVH broad phase
//! (`QueryPipeline::cast_ray_and_get_normal`).
//!
//! Тела хранятся в BTreeMap → порядок обхода детерминирован (handle order).
//! Удаление тел — ТОЛЬКО через `queue_removal` + `flush_removals` после step.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use bevy_rapier3d::parry::query::DefaultQueryDispatcher;
use bevy_rapier3d::prelude::Group;
use bevy_rapier3d::rapier::prelude::{
    CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, DefaultBroadPhase, Group as RapierGroup,
    ImpulseJointSet, IntegrationParameters, InteractionGroups, IslandManager, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, QueryFilter, Ray, RigidBody as RapierBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};

use super::body::{BodyDesc, BodyHandle, BodyState};
use super::shapes::{to_isometry, to_vector, Shape};

/// Contact / overlap за текущий step
///
/// `normal` направлен от `a` к `b`. `a < b` по handle (дедупликация пары).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub normal: Vec3,
    /// Хотя бы одно тело — sensor (без collision response)
    pub sensor: bool,
}

/// Ближайшее попадание raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Связка handle → rapier body (collider хранит handle в user_data)
#[derive(Debug, Clone, Copy)]
struct BodyEntry {
    rigid: RigidBodyHandle,
    shape: Shape,
    mass: f32,
    sensor: bool,
}

#[derive(Resource)]
pub struct PhysicsWorld {
    entries: BTreeMap<BodyHandle, BodyEntry>,
    next_handle: u32,
    gravity: Vec3,
    accumulator: f32,
    stepping: bool,
    pending_removal: BTreeSet<BodyHandle>,
    contacts: Vec<ContactEvent>,
    contact_pairs: BTreeSet<(BodyHandle, BodyHandle)>,

    pipeline: PhysicsPipeline,
    integration: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl std::fmt::Debug for PhysicsWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("bodies", &self.entries.len())
            .field("gravity", &self.gravity)
            .field("pending_removal", &self.pending_removal)
            .finish()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.82, 0.0))
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_handle: 0,
            gravity,
            accumulator: 0.0,
            stepping: false,
            pending_removal: BTreeSet::new(),
            contacts: Vec::new(),
            contact_pairs: BTreeSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        let mass = desc.mass.max(0.0);
        let builder = if mass > 0.0 {
            RigidBodyBuilder::dynamic().linvel(to_vector(desc.velocity))
        } else {
            RigidBodyBuilder::fixed()
        };
        let mut builder = builder
            .position(to_isometry(desc.position, desc.rotation))
            .linear_damping(desc.linear_damping.max(0.0))
            .gravity_scale(desc.gravity_scale)
            .can_sleep(false)
            .user_data(u128::from(handle.0));
        if desc.fixed_rotation {
            builder = builder.lock_rotations();
        }
        let rigid = self.bodies.insert(builder.build());

        let mut collider = ColliderBuilder::new(desc.shape.to_shared())
            .sensor(desc.sensor)
            .friction(desc.friction)
            .collision_groups(desc.groups.into())
            .user_data(u128::from(handle.0));
        if mass > 0.0 {
            collider = collider.mass(mass);
        }
        self.colliders.insert_with_parent(collider.build(), rigid, &mut self.bodies);

        self.entries.insert(
            handle,
            BodyEntry {
                rigid,
                shape: desc.shape,
                mass,
                sensor: desc.sensor,
            },
        );
        handle
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<BodyState> {
        let entry = self.entries.get(&handle)?;
        let rigid = self.bodies.get(entry.rigid)?;
        Some(BodyState {
            shape: entry.shape,
            position: Vec3::from(*rigid.translation()),
            rotation: Quat::from(*rigid.rotation()),
            linear_velocity: Vec3::from(*rigid.linvel()),
            mass: entry.mass,
            linear_damping: rigid.linear_damping(),
            sensor: entry.sensor,
        })
    }

    pub fn body_count(&self) -> usize {
        self.entries.len()
    }

    fn rigid(&self, handle: BodyHandle) -> Option<&RapierBody> {
        self.entries.get(&handle).and_then(|entry| self.bodies.get(entry.rigid))
    }

    /// Только dynamic тела: fixed игнорируют силы и импульсы
    fn dynamic_mut(&mut self, handle: BodyHandle) -> Option<&mut RapierBody> {
        let entry = self.entries.get(&handle)?;
        self.bodies.get_mut(entry.rigid).filter(|rigid| rigid.is_dynamic())
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid(handle).map(|rigid| Vec3::from(*rigid.translation()))
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid(handle).map(|rigid| Vec3::from(*rigid.linvel()))
    }

    pub fn rotation(&self, handle: BodyHandle) -> Option<Quat> {
        self.rigid(handle).map(|rigid| Quat::from(*rigid.rotation()))
    }

    /// Teleport (collider догонит тело на следующем step)
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec3) {
        let Some(entry) = self.entries.get(&handle) else {
            return;
        };
        if let Some(rigid) = self.bodies.get_mut(entry.rigid) {
            rigid.set_translation(to_vector(position), true);
        }
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn linear_damping(&self, handle: BodyHandle) -> Option<f32> {
        self.rigid(handle).map(|rigid| rigid.linear_damping())
    }

    pub fn set_linear_damping(&mut self, handle: BodyHandle, damping: f32) {
        let Some(entry) = self.entries.get(&handle) else {
            return;
        };
        if let Some(rigid) = self.bodies.get_mut(entry.rigid) {
            rigid.set_linear_damping(damping.max(0.0));
        }
    }

    pub fn set_fixed_rotation(&mut self, handle: BodyHandle, fixed: bool) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.lock_rotations(fixed, true);
            if fixed {
                rigid.set_angvel(to_vector(Vec3::ZERO), true);
            }
        }
    }

    /// Сила в центре масс (действует весь следующий step)
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.add_force(to_vector(force), true);
        }
    }

    pub fn apply_force_at_point(&mut self, handle: BodyHandle, force: Vec3, point: Vec3) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.add_force_at_point(to_vector(force), point.into(), true);
        }
    }

    /// Мгновенное изменение импульса (Δv = J / m)
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.apply_impulse(to_vector(impulse), true);
        }
    }

    pub fn apply_impulse_at_point(&mut self, handle: BodyHandle, impulse: Vec3, point: Vec3) {
        if let Some(rigid) = self.dynamic_mut(handle) {
            rigid.apply_impulse_at_point(to_vector(impulse), point.into(), true);
        }
    }

    pub fn is_stepping(&self) -> bool {
        self.stepping
    }

    /// Продвинуть мир на frame_dt фиксированными шагами
    ///
    /// Возвращает количество выполненных sub-steps. Остаток сверх лимита отбрасывается.
    pub fn step(&mut self, fixed_dt: f32, frame_dt: f32, max_sub_steps: u32) -> u32 {
        if !(fixed_dt > 0.0) {
            return 0;
        }

        self.stepping = true;
        self.accumulator += frame_dt.max(0.0);
        self.integration.dt = fixed_dt;

        let mut steps = 0;
        while self.accumulator >= fixed_dt && steps < max_sub_steps {
            self.sub_step();
            self.accumulator -= fixed_dt;
            steps += 1;
        }
        if self.accumulator >= fixed_dt {
            self.accumulator %= fixed_dt;
        }

        for (_, rigid) in self.bodies.iter_mut() {
            rigid.reset_forces(false);
            rigid.reset_torques(false);
        }
        self.contact_pairs.clear();
        self.stepping = false;
        steps
    }

    fn sub_step(&mut self) {
        self.pipeline.step(
            &to_vector(self.gravity),
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &(),
            &(),
        );
        self.collect_contacts();
    }

    /// Активные contact / intersection пары → ContactEvent (одна пара на step)
    fn collect_contacts(&mut self) {
        let mut found = Vec::new();

        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let Some(normal) = pair.manifolds.iter().find(|m| !m.points.is_empty()).map(|m| m.data.normal) else {
                continue;
            };
            found.push((pair.collider1, pair.collider2, Vec3::from(normal), false));
        }
        for (collider1, collider2, intersecting) in self.narrow_phase.intersection_pairs() {
            if intersecting {
                let offset = self.collider_center(collider2) - self.collider_center(collider1);
                found.push((collider1, collider2, offset.normalize_or(Vec3::Y), true));
            }
        }

        for (collider1, collider2, normal, sensor) in found {
            let (Some(h1), Some(h2)) = (self.owner(collider1), self.owner(collider2)) else {
                continue;
            };
            let (a, b, normal) = if h1 < h2 { (h1, h2, normal) } else { (h2, h1, -normal) };
            if self.contact_pairs.insert((a, b)) {
                self.contacts.push(ContactEvent { a, b, normal, sensor });
            }
        }
    }

    fn owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let data = self.colliders.get(collider)?.user_data;
        let handle = BodyHandle(u32::try_from(data).ok()?);
        self.entries.contains_key(&handle).then_some(handle)
    }

    fn collider_center(&self, collider: ColliderHandle) -> Vec3 {
        self.colliders
            .get(collider)
            .map_or(Vec3::ZERO, |c| Vec3::from(*c.translation()))
    }

    /// Забрать contact events, накопленные с прошлого drain
    pub fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.contacts)
    }

    /// Closest non-sensor hit по отрезку from → to
    ///
    /// `mask` проверяется против memberships тела. BVH обновляется в `step`:
    /// тела, созданные после последнего step, ещё не видны.
    pub fn raycast(&self, from: Vec3, to: Vec3, mask: Group, exclude: Option<BodyHandle>) -> Option<RayHit> {
        let delta = to - from;
        let max_distance = delta.length();
        if max_distance <= 1e-6 {
            return None;
        }
        let direction = delta / max_distance;

        let groups = InteractionGroups::new(RapierGroup::ALL, RapierGroup::from_bits_truncate(mask.bits()));
        let mut filter = QueryFilter::new().exclude_sensors().groups(groups);
        if let Some(entry) = exclude.and_then(|handle| self.entries.get(&handle)) {
            filter = filter.exclude_rigid_body(entry.rigid);
        }

        let query = self
            .broad_phase
            .as_query_pipeline(&DefaultQueryDispatcher, &self.bodies, &self.colliders, filter);
        let ray = Ray::new(from.into(), to_vector(direction));
        let (collider, hit) = query.cast_ray_and_get_normal(&ray, max_distance, true)?;
        let body = self.owner(collider)?;

        Some(RayHit {
            body,
            point: from + direction * hit.time_of_impact,
            normal: Vec3::from(hit.normal),
            distance: hit.time_of_impact,
        })
    }

    /// Поставить тело в очередь на удаление (после текущего step)
    pub fn queue_removal(&mut self, handle: BodyHandle) -> bool {
        if !self.entries.contains_key(&handle) {
            return false;
        }
        self.pending_removal.insert(handle)
    }

    pub fn is_pending_removal(&self, handle: BodyHandle) -> bool {
        self.pending_removal.contains(&handle)
    }

    pub fn pending_removal_count(&self) -> usize {
        self.pending_removal.len()
    }

    /// Удалить все тела из очереди. Во время step — отказ (пустой результат).
    pub fn flush_removals(&mut self) -> Vec<BodyHandle> {
        if self.stepping {
            crate::logger::log_warning("⚠️ PhysicsWorld: flush_removals refused during step");
            return Vec::new();
        }
        let pending = std::mem::take(&mut self.pending_removal);
        let mut removed = Vec::with_capacity(pending.len());
        for handle in pending {
            let Some(entry) = self.entries.remove(&handle) else {
                continue;
            };
            self.bodies.remove(
                entry.rigid,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
            removed.push(handle);
        }
        removed
    }
}
