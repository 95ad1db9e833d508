//! Tests for the rapier-backed physics world.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use bevy_rapier3d::prelude::Group;

    use crate::physics::layers::*;
    use crate::physics::{BodyDesc, PhysicsWorld, Shape};

    const DT: f32 = 1.0 / 60.0;

    fn ground(world: &mut PhysicsWorld) -> crate::physics::BodyHandle {
        world.create_body(BodyDesc::fixed(
            Shape::cuboid(Vec3::new(50.0, 0.5, 50.0)),
            Vec3::new(0.0, -0.5, 0.0),
            Quat::IDENTITY,
            environment_groups(),
        ))
    }

    #[test]
    fn test_sphere_comes_to_rest_on_ground() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let ball = world.create_body(BodyDesc::dynamic(
            Shape::sphere(0.5),
            Vec3::new(0.0, 3.0, 0.0),
            10.0,
            npc_groups(),
        ));

        for _ in 0..180 {
            world.step(DT, DT, 3);
        }

        let position = world.position(ball).unwrap();
        assert!((position.y - 0.5).abs() < 0.05, "ball y = {}", position.y);
        assert!(world.velocity(ball).unwrap().y.abs() < 0.5);
    }

    #[test]
    fn test_sub_steps_capped() {
        let mut world = PhysicsWorld::default();
        // 0.1s = 6 шагов, но лимит 3
        assert_eq!(world.step(DT, 0.1, 3), 3);
        // Остаток отброшен до < fixed_dt
        assert_eq!(world.step(DT, 0.0, 3), 0);
    }

    #[test]
    fn test_small_frame_accumulates() {
        let mut world = PhysicsWorld::default();
        assert_eq!(world.step(DT, DT * 0.6, 3), 0);
        assert_eq!(world.step(DT, DT * 0.6, 3), 1);
    }

    #[test]
    fn test_sensor_reports_overlap_without_response() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let sensor = world.create_body(
            BodyDesc::fixed(Shape::cuboid(Vec3::splat(2.0)), Vec3::ZERO, Quat::IDENTITY, trigger_groups())
                .with_sensor(true),
        );
        let npc = world.create_body(
            BodyDesc::dynamic(Shape::sphere(0.5), Vec3::new(1.0, 0.0, 0.0), 60.0, npc_groups())
                .with_velocity(Vec3::new(1.0, 0.0, 0.0)),
        );

        world.step(DT, DT, 3);
        let contacts = world.drain_contacts();

        assert_eq!(contacts.len(), 1);
        assert!(contacts[0].sensor);
        assert_eq!((contacts[0].a, contacts[0].b), (sensor, npc));
        // Скорость не гасится sensor'ом
        assert!((world.velocity(npc).unwrap().x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_contacts_deduplicated_per_step() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.create_body(
            BodyDesc::fixed(Shape::cuboid(Vec3::splat(2.0)), Vec3::ZERO, Quat::IDENTITY, trigger_groups())
                .with_sensor(true),
        );
        world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::ZERO, 60.0, npc_groups()));

        // 3 sub-steps → одна пара
        world.step(DT, DT * 3.0, 3);
        assert_eq!(world.drain_contacts().len(), 1);

        world.step(DT, DT, 3);
        assert_eq!(world.drain_contacts().len(), 1);
    }

    #[test]
    fn test_filtered_pair_does_not_collide() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let player = world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::ZERO, 70.0, player_groups()));
        world.create_body(BodyDesc::dynamic(
            Shape::sphere(0.2),
            Vec3::new(0.3, 0.0, 0.0),
            1.0,
            player_projectile_groups(),
        ));

        world.step(DT, DT, 3);

        assert!(world.drain_contacts().is_empty());
        assert_eq!(world.position(player).unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_raycast_closest_hit_with_mask_and_exclude() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let shooter = world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::ZERO, 70.0, player_groups()));
        let near = world.create_body(BodyDesc::dynamic(
            Shape::sphere(0.5),
            Vec3::new(0.0, 0.0, -5.0),
            60.0,
            npc_groups(),
        ));
        let wall = world.create_body(BodyDesc::fixed(
            Shape::cuboid(Vec3::new(5.0, 5.0, 0.5)),
            Vec3::new(0.0, 0.0, -10.0),
            Quat::IDENTITY,
            environment_groups(),
        ));

        // BVH строится в step (gravity = 0, тела стоят на месте)
        world.step(DT, DT, 3);

        let from = Vec3::ZERO;
        let to = Vec3::new(0.0, 0.0, -20.0);

        let hit = world.raycast(from, to, MASK_PLAYER_AIM, Some(shooter)).unwrap();
        assert_eq!(hit.body, near);
        assert!((hit.distance - 4.5).abs() < 1e-4);

        // Mask без NPC слоя → стена
        let hit = world.raycast(from, to, MASK_GROUND, Some(shooter)).unwrap();
        assert_eq!(hit.body, wall);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_raycast_ignores_sensors() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        world.create_body(
            BodyDesc::fixed(Shape::cuboid(Vec3::splat(1.0)), Vec3::new(0.0, 0.0, -3.0), Quat::IDENTITY, trigger_groups())
                .with_sensor(true),
        );
        world.step(DT, DT, 3);
        assert!(world
            .raycast(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), Group::ALL, None)
            .is_none());
    }

    #[test]
    fn test_queued_body_survives_until_flush() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let ball = world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::new(0.0, 2.0, 0.0), 1.0, npc_groups()));

        assert!(world.queue_removal(ball));
        assert!(!world.queue_removal(ball), "second queue is a no-op");

        // Тело всё ещё участвует в симуляции и запросах
        world.step(DT, DT, 3);
        assert!(world.contains(ball));
        assert!(world.position(ball).unwrap().y < 2.0);

        let removed = world.flush_removals();
        assert_eq!(removed, vec![ball]);
        assert!(!world.contains(ball));
        assert!(world.flush_removals().is_empty());
    }

    #[test]
    fn test_forces_cleared_after_step() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::ZERO, 2.0, npc_groups()));

        world.apply_force(body, Vec3::new(0.0, 120.0, 0.0));
        world.step(DT, DT, 3);
        let v1 = world.velocity(body).unwrap().y;
        assert!((v1 - 1.0).abs() < 1e-4, "F/m * dt = 60 * 1/60, got {}", v1);

        world.step(DT, DT, 3);
        assert!((world.velocity(body).unwrap().y - v1).abs() < 1e-6);
    }

    #[test]
    fn test_impulse_changes_velocity_by_inverse_mass() {
        let mut world = PhysicsWorld::new(Vec3::ZERO);
        let body = world.create_body(BodyDesc::dynamic(Shape::sphere(0.5), Vec3::ZERO, 4.0, npc_groups()));
        world.apply_impulse(body, Vec3::new(8.0, 0.0, 0.0));
        let velocity = world.velocity(body).unwrap();
        assert!((velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-4, "velocity = {velocity}");
    }

    #[test]
    fn test_static_bodies_ignore_impulses() {
        let mut world = PhysicsWorld::default();
        let floor = ground(&mut world);
        world.apply_impulse(floor, Vec3::Y * 100.0);
        world.step(DT, DT, 3);
        assert_eq!(world.position(floor).unwrap(), Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_crate_rests_flat_on_slab() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        let half = Vec3::new(1.0, 0.5, 1.0);
        let crate_box = world.create_body(BodyDesc::dynamic(
            Shape::cuboid(half),
            Vec3::new(0.0, half.y, 0.0),
            20.0,
            environment_groups(),
        ));

        for _ in 0..60 {
            world.step(DT, DT, 3);
        }

        // Плоское основание на плоской плите: ни выталкивания, ни провала
        let position = world.position(crate_box).unwrap();
        assert!((position.y - half.y).abs() < 0.02, "crate y = {}", position.y);
        assert!(position.x.abs() < 1e-3 && position.z.abs() < 1e-3);
        let tilt = world.rotation(crate_box).unwrap().angle_between(Quat::IDENTITY);
        assert!(tilt < 1e-2, "crate tilted by {tilt}");
    }

    #[test]
    fn test_crate_edge_over_ledge_uses_box_geometry() {
        let mut world = PhysicsWorld::default();
        ground(&mut world);
        // Центр ящика висит в воздухе над краем плиты (x = 50), но грань опирается
        let half = Vec3::new(1.0, 0.5, 1.0);
        let crate_box = world.create_body(
            BodyDesc::dynamic(Shape::cuboid(half), Vec3::new(50.4, half.y, 0.0), 20.0, environment_groups())
                .with_fixed_rotation(true),
        );

        for _ in 0..30 {
            world.step(DT, DT, 3);
        }

        let position = world.position(crate_box).unwrap();
        assert!((position.y - half.y).abs() < 0.02, "crate y = {}", position.y);
    }

    #[test]
    fn test_body_state_snapshot() {
        let mut world = PhysicsWorld::default();
        let ball = world.create_body(
            BodyDesc::dynamic(Shape::sphere(0.4), Vec3::new(1.0, 2.0, 3.0), 5.0, npc_groups()).with_linear_damping(0.7),
        );

        let state = world.body(ball).unwrap();
        assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.mass, 5.0);
        assert_eq!(state.linear_damping, 0.7);
        assert_eq!(state.shape.proxy_radius(), 0.4);
        assert!(!state.sensor);
    }
}
