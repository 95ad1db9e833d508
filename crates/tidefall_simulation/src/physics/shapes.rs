//! Формы тел + glam ↔ nalgebra конверсии для rapier / parry

use bevy::prelude::*;
use bevy_rapier3d::na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use bevy_rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};
use bevy_rapier3d::parry::query;
use bevy_rapier3d::parry::shape::{Ball, Cuboid, SharedShape};

/// Форма rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Oriented box (half extents в local space)
    Cuboid { half_extents: Vec3 },
}

impl Shape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Cuboid { half_extents }
    }

    /// Радиус вписанной сферы (water overlap, knockback)
    pub fn proxy_radius(&self) -> f32 {
        match self {
            Shape::Sphere { radius } => *radius,
            Shape::Cuboid { half_extents } => half_extents.min_element(),
        }
    }

    pub(crate) fn to_shared(self) -> SharedShape {
        match self {
            Shape::Sphere { radius } => SharedShape::ball(radius),
            Shape::Cuboid { half_extents } => SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
        }
    }
}

pub(crate) fn to_vector(v: Vec3) -> Vector3<f32> {
    v.into()
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> Isometry3<f32> {
    let rotation: UnitQuaternion<f32> = rotation.normalize().into();
    Isometry3::from_parts(Translation3::from(to_vector(position)), rotation)
}

/// AABB по центру и half extents
pub fn aabb(center: Vec3, half_extents: Vec3) -> Aabb {
    Aabb::from_half_extents(center.into(), to_vector(half_extents))
}

/// Sphere vs axis-aligned box: AABB pre-check, затем точный parry тест
pub fn sphere_overlaps_box(sphere_center: Vec3, radius: f32, box_center: Vec3, half_extents: Vec3) -> bool {
    if !aabb(box_center, half_extents).intersects(&aabb(sphere_center, Vec3::splat(radius))) {
        return false;
    }
    query::intersection_test(
        &to_isometry(sphere_center, Quat::IDENTITY),
        &Ball::new(radius),
        &to_isometry(box_center, Quat::IDENTITY),
        &Cuboid::new(to_vector(half_extents)),
    )
    .unwrap_or(false)
}
