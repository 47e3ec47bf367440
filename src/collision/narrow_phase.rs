//! Analytic contact generation for the supported shape pairs.

use glam::Vec3;

use crate::dynamics::RigidBody;
use crate::geometry::{Shape, PLANE_LOCAL_NORMAL};

use super::contact::ContactPoint;

/// Generates a contact between two bodies, if their shapes overlap.
///
/// Plane–plane pairs never collide. The returned normal always points from
/// `body_a` towards `body_b`.
pub fn collide(body_a: &RigidBody, body_b: &RigidBody) -> Option<ContactPoint> {
    let (shape_a, shape_b) = (body_a.shape?, body_b.shape?);

    match (shape_a, shape_b) {
        (Shape::Sphere(a), Shape::Sphere(b)) => sphere_sphere(body_a, a.radius, body_b, b.radius),
        (Shape::Sphere(a), Shape::Plane) => sphere_plane(body_a, a.radius, body_b),
        (Shape::Plane, Shape::Sphere(b)) => {
            sphere_plane(body_b, b.radius, body_a).map(ContactPoint::flipped)
        }
        (Shape::Plane, Shape::Plane) => None,
    }
}

fn sphere_sphere(
    body_a: &RigidBody,
    radius_a: f32,
    body_b: &RigidBody,
    radius_b: f32,
) -> Option<ContactPoint> {
    let delta = body_b.position - body_a.position;
    let distance = delta.length();
    let depth = radius_a + radius_b - distance;
    if depth <= 0.0 {
        return None;
    }

    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::Y
    };

    Some(ContactPoint {
        body_a: body_a.handle,
        body_b: body_b.handle,
        point_a: body_a.position + normal * radius_a,
        point_b: body_b.position - normal * radius_b,
        normal,
        depth,
    })
}

fn sphere_plane(sphere: &RigidBody, radius: f32, plane: &RigidBody) -> Option<ContactPoint> {
    let plane_normal = plane.rotation * PLANE_LOCAL_NORMAL;
    let distance = (sphere.position - plane.position).dot(plane_normal);
    let depth = radius - distance;
    if depth <= 0.0 {
        return None;
    }

    Some(ContactPoint {
        body_a: sphere.handle,
        body_b: plane.handle,
        point_a: sphere.position - plane_normal * radius,
        point_b: sphere.position - plane_normal * distance,
        normal: -plane_normal,
        depth,
    })
}
