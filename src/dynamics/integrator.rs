use glam::{Quat, Vec3};

use super::rigid_body::RigidBody;

/// Integrates velocities (gravity, accumulated forces, damping)
pub fn integrate_velocities(body: &mut RigidBody, gravity: Vec3, dt: f32) {
    if !body.is_dynamic() || !body.is_awake {
        return;
    }

    body.linear_velocity += gravity * dt;

    body.linear_velocity += body.force * body.inv_mass * dt;
    body.angular_velocity += body.inv_inertia_world * body.torque * dt;

    body.linear_velocity *= (1.0 - body.linear_damping).powf(dt);
    body.angular_velocity *= (1.0 - body.angular_damping).powf(dt);
}

/// Integrates positions (applies velocities to positions).
///
/// Kinematic bodies move with their velocity but ignore forces.
pub fn integrate_positions(body: &mut RigidBody, dt: f32, normalize: bool) {
    if body.is_static() || !body.is_awake {
        return;
    }

    body.position += body.linear_velocity * dt;
    body.rotation = integrate_rotation(body.rotation, body.angular_velocity, dt, normalize);

    body.update_world_inertia();
}

/// Advances an orientation by an angular velocity: q' = q + 0.5 * dt * w * q
pub fn integrate_rotation(rotation: Quat, angular_velocity: Vec3, dt: f32, normalize: bool) -> Quat {
    if angular_velocity == Vec3::ZERO {
        return rotation;
    }

    let w = Quat::from_xyzw(angular_velocity.x, angular_velocity.y, angular_velocity.z, 0.0);
    let spin = w * rotation;
    let next = Quat::from_xyzw(
        rotation.x + 0.5 * dt * spin.x,
        rotation.y + 0.5 * dt * spin.y,
        rotation.z + 0.5 * dt * spin.z,
        rotation.w + 0.5 * dt * spin.w,
    );

    if normalize {
        next.normalize()
    } else {
        next
    }
}
