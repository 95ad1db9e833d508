//! Status effect tick system

use bevy::prelude::*;

use super::{StatusEffectKind, StatusEffects};
use crate::combat::damage::{deal_damage, heal};
use crate::components::Health;
use crate::events::GameEvent;

/// Система: tick всех status effects
///
/// DoT / HoT применяются пропорционально dt. Истёкшие effects удаляются,
/// их `on_remove` событие публикуется. Мёртвые entities пропускаются.
pub fn tick_status_effects(
    time: Res<Time>,
    mut query: Query<(Entity, &mut StatusEffects, Option<&mut Health>)>,
    mut events: EventWriter<GameEvent>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    for (entity, mut effects, mut health) in query.iter_mut() {
        if health.as_ref().is_some_and(|h| h.is_dead()) {
            continue;
        }
        if effects.is_empty() {
            continue;
        }

        let mut damage = 0.0;
        let mut healing = 0.0;
        for effect in effects.iter() {
            match effect.kind {
                StatusEffectKind::DamageOverTime { per_second } => damage += per_second * delta,
                StatusEffectKind::HealOverTime { per_second } => healing += per_second * delta,
                _ => {}
            }
        }

        if let Some(health) = health.as_mut() {
            if healing > 0.0 {
                heal(health, healing);
            }
            if damage > 0.0 {
                deal_damage(entity, health, Some(&*effects), damage, &mut events);
            }
        }

        for expired in effects.advance(delta) {
            crate::logger::log(&format!("⏳ Status effect '{}' expired on {:?}", expired.name, entity));
            if let Some(event) = expired.on_remove {
                events.write(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusEffect;
    use std::time::Duration;

    fn app_with_time() -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_event::<GameEvent>();
        app.add_systems(Update, tick_status_effects);
        app
    }

    fn step(app: &mut App, seconds: f32) {
        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_secs_f32(seconds));
        app.world_mut().run_schedule(Update);
    }

    #[test]
    fn test_plating_expiry_emits_deactivation() {
        let mut app = app_with_time();
        let mut effects = StatusEffects::default();
        effects.add(
            StatusEffect::new("plating", StatusEffectKind::DamageReduction { fraction: 0.5 }, Some(0.5))
                .with_on_remove(GameEvent::PlayerBuffDeactivated { buff_name: "plating".into() }),
        );
        let entity = app.world_mut().spawn((effects, Health::new(100.0))).id();

        step(&mut app, 0.25);
        assert!(app.world().get::<StatusEffects>(entity).unwrap().has("plating"));

        step(&mut app, 0.3);
        assert!(!app.world().get::<StatusEffects>(entity).unwrap().has("plating"));

        let events = app.world().resource::<Events<GameEvent>>();
        let mut cursor = events.get_cursor();
        let names: Vec<_> = cursor.read(events).map(|e| e.name()).collect();
        assert_eq!(names, vec!["playerBuffDeactivated"]);
    }

    #[test]
    fn test_damage_over_time_reduces_health() {
        let mut app = app_with_time();
        let mut effects = StatusEffects::default();
        effects.add(StatusEffect::new("burn", StatusEffectKind::DamageOverTime { per_second: 10.0 }, None));
        let entity = app.world_mut().spawn((effects, Health::new(100.0))).id();

        step(&mut app, 0.5);

        let health = app.world().get::<Health>(entity).unwrap();
        assert!((health.current - 95.0).abs() < 1e-3);
    }
}
