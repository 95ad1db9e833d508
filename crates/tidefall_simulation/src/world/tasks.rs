//! Scheduled tasks: отложенные действия (melee hit timing, staggered swarm spawns)
//!
//! Вместо host timer callbacks — явные записи (owner, remaining delay, action),
//! которые тикают каждый frame. Перед выполнением проверяется, что owner жив.
//! Dispose мира очищает очередь.

use bevy::prelude::*;

use crate::abilities::effects::spawn_swarm_missile;
use crate::combat::weapon::resolve_melee_hit;
use crate::combat::NpcTargets;
use crate::components::{Health, Player};
use crate::config::GameplayTuning;
use crate::events::GameEvent;
use crate::input::PlayerInput;
use crate::physics::{PhysicsBody, PhysicsWorld};

#[derive(Debug, Clone, PartialEq)]
pub enum TaskAction {
    /// Один homing missile из серии swarm
    SwarmMissile { target: Option<Entity>, index: u32 },
    /// Hit-check melee конуса (смещён от начала замаха)
    MeleeHitCheck { damage: f32, range: f32, cone_dot: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    pub owner: Entity,
    /// Осталось до выполнения (секунды)
    pub remaining: f32,
    pub action: TaskAction,
    /// Поставлена в текущем frame: первый advance её не тикает
    queued_this_frame: bool,
}

/// Погрешность накопленного f32 вычитания dt
const DUE_EPSILON: f32 = 1e-5;

#[derive(Resource, Debug, Default)]
pub struct ScheduledTasks {
    tasks: Vec<ScheduledTask>,
}

impl ScheduledTasks {
    pub fn schedule(&mut self, owner: Entity, delay: f32, action: TaskAction) {
        self.tasks.push(ScheduledTask {
            owner,
            remaining: delay.max(0.0),
            action,
            queued_this_frame: true,
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Отменить все задачи owner'а
    pub fn cancel_for(&mut self, owner: Entity) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.owner != owner);
        before - self.tasks.len()
    }

    /// Продвинуть таймеры, вернуть созревшие задачи (в порядке постановки).
    /// Delay отсчитывается от frame постановки: 0.15s при 60 Hz = ровно 9 frames спустя
    pub fn advance(&mut self, dt: f32) -> Vec<ScheduledTask> {
        for task in &mut self.tasks {
            if task.queued_this_frame {
                task.queued_this_frame = false;
            } else {
                task.remaining -= dt;
            }
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|task| task.remaining <= DUE_EPSILON);
        self.tasks = pending;
        due
    }
}

/// Система: выполнить созревшие scheduled tasks
pub fn run_scheduled_tasks(
    time: Res<Time>,
    mut tasks: ResMut<ScheduledTasks>,
    input: Res<PlayerInput>,
    tuning: Res<GameplayTuning>,
    physics: Res<PhysicsWorld>,
    owners: Query<(&PhysicsBody, &Health), With<Player>>,
    mut npcs: NpcTargets,
    mut commands: Commands,
    mut events: EventWriter<GameEvent>,
) {
    if tasks.is_empty() {
        return;
    }

    for task in tasks.advance(time.delta_secs()) {
        let Ok((body, health)) = owners.get(task.owner) else {
            crate::logger::log(&format!("⏭️ Scheduled task skipped: owner {:?} gone", task.owner));
            continue;
        };
        if health.is_dead() {
            crate::logger::log(&format!("⏭️ Scheduled task skipped: owner {:?} dead", task.owner));
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        let eye = position + Vec3::Y * tuning.player.eye_height;
        let aim = input.camera_forward();

        match task.action {
            TaskAction::SwarmMissile { target, index } => {
                spawn_swarm_missile(&mut commands, &tuning, task.owner, eye, aim, target, index);
            }
            TaskAction::MeleeHitCheck { damage, range, cone_dot } => {
                resolve_melee_hit(position, aim, range, cone_dot, damage, &physics, &mut npcs, &mut events);
            }
        }
    }
}
