//! Event bus
//!
//! Системы пишут `GameEvent` через `EventWriter`. После каждого frame `GameWorld`
//! забирает очередь и раздаёт события listeners из `EventBus` (renderer, UI, audio).
//! Ядро ничего не знает о подписчиках.

use bevy::prelude::*;

use crate::abilities::{AbilityId, CastFailure};
use crate::combat::{ProjectileType, WeaponId};
use crate::components::EntityKind;

/// Все события, видимые внешним collaborators
#[derive(Event, Debug, Clone, PartialEq)]
pub enum GameEvent {
    EntityAdded { entity: Entity, kind: EntityKind },
    EntityRemoved { entity: Entity, kind: EntityKind },
    EntityTookDamage { entity: Entity, amount: f32 },
    NpcDied { entity: Entity },
    PlayerDied { entity: Entity },
    PlayerRespawned { entity: Entity, position: Vec3 },
    PlayerJumped { entity: Entity },
    /// Направление dash относительно basis камеры
    PlayerDashed { entity: Entity, forward_dot: f32, right_dot: f32 },
    PlayerGroundSlammed { entity: Entity, position: Vec3 },
    ProjectileDetonated { projectile_type: ProjectileType, position: Vec3 },
    PlayerBuffActivated { buff_name: String },
    PlayerBuffDeactivated { buff_name: String },
    PlayerChannelingUpdate { is_channeling: bool, ability: AbilityId },
    WavePowerUsed { position: Vec3, direction: Vec3 },
    /// `hit_point == None` — промах / melee swing
    WeaponFired { weapon: WeaponId, hit_point: Option<Vec3> },
    TutorialTriggerActivated { message: String, duration: f32 },
    LevelCompleted,
    AbilityCastFailed { reasons: Vec<CastFailure>, entity: Entity, ability: AbilityId },
}

/// Ключ подписки (вид события без payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEventKind {
    EntityAdded,
    EntityRemoved,
    EntityTookDamage,
    NpcDied,
    PlayerDied,
    PlayerRespawned,
    PlayerJumped,
    PlayerDashed,
    PlayerGroundSlammed,
    ProjectileDetonated,
    PlayerBuffActivated,
    PlayerBuffDeactivated,
    PlayerChannelingUpdate,
    WavePowerUsed,
    WeaponFired,
    TutorialTriggerActivated,
    LevelCompleted,
    AbilityCastFailed,
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::EntityAdded { .. } => GameEventKind::EntityAdded,
            GameEvent::EntityRemoved { .. } => GameEventKind::EntityRemoved,
            GameEvent::EntityTookDamage { .. } => GameEventKind::EntityTookDamage,
            GameEvent::NpcDied { .. } => GameEventKind::NpcDied,
            GameEvent::PlayerDied { .. } => GameEventKind::PlayerDied,
            GameEvent::PlayerRespawned { .. } => GameEventKind::PlayerRespawned,
            GameEvent::PlayerJumped { .. } => GameEventKind::PlayerJumped,
            GameEvent::PlayerDashed { .. } => GameEventKind::PlayerDashed,
            GameEvent::PlayerGroundSlammed { .. } => GameEventKind::PlayerGroundSlammed,
            GameEvent::ProjectileDetonated { .. } => GameEventKind::ProjectileDetonated,
            GameEvent::PlayerBuffActivated { .. } => GameEventKind::PlayerBuffActivated,
            GameEvent::PlayerBuffDeactivated { .. } => GameEventKind::PlayerBuffDeactivated,
            GameEvent::PlayerChannelingUpdate { .. } => GameEventKind::PlayerChannelingUpdate,
            GameEvent::WavePowerUsed { .. } => GameEventKind::WavePowerUsed,
            GameEvent::WeaponFired { .. } => GameEventKind::WeaponFired,
            GameEvent::TutorialTriggerActivated { .. } => GameEventKind::TutorialTriggerActivated,
            GameEvent::LevelCompleted => GameEventKind::LevelCompleted,
            GameEvent::AbilityCastFailed { .. } => GameEventKind::AbilityCastFailed,
        }
    }

    /// Wire name (camelCase) для внешних подписчиков
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

impl GameEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            GameEventKind::EntityAdded => "entityAdded",
            GameEventKind::EntityRemoved => "entityRemoved",
            GameEventKind::EntityTookDamage => "entityTookDamage",
            GameEventKind::NpcDied => "npcDied",
            GameEventKind::PlayerDied => "playerDied",
            GameEventKind::PlayerRespawned => "playerRespawned",
            GameEventKind::PlayerJumped => "playerJumped",
            GameEventKind::PlayerDashed => "playerDashed",
            GameEventKind::PlayerGroundSlammed => "playerGroundSlammed",
            GameEventKind::ProjectileDetonated => "projectileDetonated",
            GameEventKind::PlayerBuffActivated => "playerBuffActivated",
            GameEventKind::PlayerBuffDeactivated => "playerBuffDeactivated",
            GameEventKind::PlayerChannelingUpdate => "playerChannelingUpdate",
            GameEventKind::WavePowerUsed => "wavePowerUsed",
            GameEventKind::WeaponFired => "weaponFired",
            GameEventKind::TutorialTriggerActivated => "tutorialTriggerActivated",
            GameEventKind::LevelCompleted => "levelCompleted",
            GameEventKind::AbilityCastFailed => "abilityCastFailed",
        }
    }
}

pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&GameEvent) + Send + Sync>;

struct Subscription {
    id: ListenerId,
    /// None — все события
    kind: Option<GameEventKind>,
    listener: Listener,
}

/// Реестр listeners (publish/subscribe)
#[derive(Resource, Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: ListenerId,
}

impl EventBus {
    pub fn subscribe(
        &mut self,
        kind: GameEventKind,
        listener: impl FnMut(&GameEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.push(Some(kind), Box::new(listener))
    }

    pub fn subscribe_all(&mut self, listener: impl FnMut(&GameEvent) + Send + Sync + 'static) -> ListenerId {
        self.push(None, Box::new(listener))
    }

    fn push(&mut self, kind: Option<GameEventKind>, listener: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Отцепить всех (dispose)
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Раздать событие подписчикам в порядке подписки
    pub fn dispatch(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for subscription in &mut self.subscriptions {
            if subscription.kind.map_or(true, |k| k == kind) {
                (subscription.listener)(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_kind_filtered_dispatch() {
        let mut bus = EventBus::default();
        let jumps = Arc::new(Mutex::new(0));
        let all = Arc::new(Mutex::new(Vec::new()));

        let jumps_clone = jumps.clone();
        bus.subscribe(GameEventKind::PlayerJumped, move |_| *jumps_clone.lock().unwrap() += 1);
        let all_clone = all.clone();
        bus.subscribe_all(move |event| all_clone.lock().unwrap().push(event.name()));

        bus.dispatch(&GameEvent::PlayerJumped { entity: Entity::PLACEHOLDER });
        bus.dispatch(&GameEvent::LevelCompleted);

        assert_eq!(*jumps.lock().unwrap(), 1);
        assert_eq!(*all.lock().unwrap(), vec!["playerJumped", "levelCompleted"]);
    }

    #[test]
    fn test_unsubscribe_and_clear() {
        let mut bus = EventBus::default();
        let id = bus.subscribe_all(|_| {});
        bus.subscribe_all(|_| {});

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 1);

        bus.clear();
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            GameEvent::WavePowerUsed { position: Vec3::ZERO, direction: Vec3::X }.name(),
            "wavePowerUsed"
        );
        assert_eq!(GameEventKind::AbilityCastFailed.name(), "abilityCastFailed");
    }
}
