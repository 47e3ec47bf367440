use glam::Vec3;

use crate::collision::ContactPoint;
use crate::dynamics::RigidBody;
use crate::geometry::ContactMaterial;

/// SPOOK regularisation parameters for one constraint row.
///
/// `a` scales the position error, `b` the velocity term and `eps` softens
/// the effective mass. Derived from a spring stiffness and the number of
/// steps over which an error is relaxed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spook {
    pub a: f32,
    pub b: f32,
    pub eps: f32,
}

impl Spook {
    pub fn new(stiffness: f32, relaxation: f32, dt: f32) -> Self {
        let d = relaxation;
        let denom = 1.0 + 4.0 * d;
        Self {
            a: 4.0 / (dt * denom),
            b: (4.0 * d) / denom,
            eps: 4.0 / (dt * dt * stiffness * denom),
        }
    }
}

/// A velocity constraint for a contact point
#[derive(Debug, Clone, Copy)]
pub struct ContactConstraint {
    pub body_a: usize,
    pub body_b: usize,
    /// Contact normal (pointing from A to B)
    pub normal: Vec3,
    pub tangent1: Vec3,
    pub tangent2: Vec3,
    /// Radius vector from body A center to its contact point
    pub r_a: Vec3,
    /// Radius vector from body B center to its contact point
    pub r_b: Vec3,
    /// Inverse effective masses along normal and tangents
    inv_k_normal: f32,
    inv_k_tangent1: f32,
    inv_k_tangent2: f32,
    normal_spook: Spook,
    friction_spook: Spook,
    /// Right-hand side of the normal row
    normal_rhs: f32,
    tangent1_rhs: f32,
    tangent2_rhs: f32,
    /// Relative velocities when the constraint was built
    normal_velocity0: f32,
    tangent1_velocity0: f32,
    tangent2_velocity0: f32,
    pub friction: f32,
    /// Accumulated impulses
    pub normal_impulse: f32,
    pub tangent1_impulse: f32,
    pub tangent2_impulse: f32,
}

impl ContactConstraint {
    /// Builds the constraint rows for a contact between two bodies
    pub fn new(
        contact: &ContactPoint,
        body_a: &RigidBody,
        body_b: &RigidBody,
        material: &ContactMaterial,
        restitution_threshold: f32,
        dt: f32,
    ) -> Self {
        let normal = contact.normal;
        let (tangent1, tangent2) = compute_tangent_basis(normal);

        let r_a = contact.point_a - body_a.position;
        let r_b = contact.point_b - body_b.position;

        let normal_spook = Spook::new(
            material.contact_equation_stiffness,
            material.contact_equation_relaxation,
            dt,
        );
        let friction_spook = Spook::new(
            material.friction_equation_stiffness,
            material.friction_equation_relaxation,
            dt,
        );

        let relative_velocity = compute_relative_velocity(body_a, body_b, r_a, r_b);
        let normal_velocity0 = relative_velocity.dot(normal);
        let tangent1_velocity0 = relative_velocity.dot(tangent1);
        let tangent2_velocity0 = relative_velocity.dot(tangent2);

        // Slow approaches are treated as resting contact
        let restitution = if normal_velocity0 < -restitution_threshold {
            material.restitution
        } else {
            0.0
        };

        let separation = contact.separation();
        let normal_rhs =
            -normal_spook.a * separation - normal_spook.b * (1.0 + restitution) * normal_velocity0;

        Self {
            body_a: body_a.handle.index(),
            body_b: body_b.handle.index(),
            normal,
            tangent1,
            tangent2,
            r_a,
            r_b,
            inv_k_normal: effective_inv_mass(body_a, body_b, r_a, r_b, normal),
            inv_k_tangent1: effective_inv_mass(body_a, body_b, r_a, r_b, tangent1),
            inv_k_tangent2: effective_inv_mass(body_a, body_b, r_a, r_b, tangent2),
            normal_spook,
            friction_spook,
            normal_rhs,
            tangent1_rhs: -friction_spook.b * tangent1_velocity0,
            tangent2_rhs: -friction_spook.b * tangent2_velocity0,
            normal_velocity0,
            tangent1_velocity0,
            tangent2_velocity0,
            friction: material.friction,
            normal_impulse: 0.0,
            tangent1_impulse: 0.0,
            tangent2_impulse: 0.0,
        }
    }

    /// Solves the normal row (non-penetration); returns the impulse change
    pub fn solve_normal(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody) -> f32 {
        let relative_velocity = compute_relative_velocity(body_a, body_b, self.r_a, self.r_b);
        let gw_lambda = relative_velocity.dot(self.normal) - self.normal_velocity0;

        let eps = self.normal_spook.eps;
        let delta = (self.normal_rhs - gw_lambda - eps * self.normal_impulse) / (self.inv_k_normal + eps);

        let old_impulse = self.normal_impulse;
        self.normal_impulse = (old_impulse + delta).max(0.0);
        let applied = self.normal_impulse - old_impulse;

        apply_impulse(body_a, body_b, self.normal * applied, self.r_a, self.r_b);
        applied
    }

    /// Solves both friction rows; returns the summed impulse change
    pub fn solve_friction(&mut self, body_a: &mut RigidBody, body_b: &mut RigidBody) -> f32 {
        let max_friction = self.friction * self.normal_impulse;
        let eps = self.friction_spook.eps;

        let relative_velocity = compute_relative_velocity(body_a, body_b, self.r_a, self.r_b);
        let gw1 = relative_velocity.dot(self.tangent1) - self.tangent1_velocity0;
        let delta1 = (self.tangent1_rhs - gw1 - eps * self.tangent1_impulse) / (self.inv_k_tangent1 + eps);
        let old1 = self.tangent1_impulse;
        self.tangent1_impulse = (old1 + delta1).clamp(-max_friction, max_friction);
        let applied1 = self.tangent1_impulse - old1;
        apply_impulse(body_a, body_b, self.tangent1 * applied1, self.r_a, self.r_b);

        let relative_velocity = compute_relative_velocity(body_a, body_b, self.r_a, self.r_b);
        let gw2 = relative_velocity.dot(self.tangent2) - self.tangent2_velocity0;
        let delta2 = (self.tangent2_rhs - gw2 - eps * self.tangent2_impulse) / (self.inv_k_tangent2 + eps);
        let old2 = self.tangent2_impulse;
        self.tangent2_impulse = (old2 + delta2).clamp(-max_friction, max_friction);
        let applied2 = self.tangent2_impulse - old2;
        apply_impulse(body_a, body_b, self.tangent2 * applied2, self.r_a, self.r_b);

        applied1.abs() + applied2.abs()
    }
}

/// Computes an orthonormal tangent basis from a normal
fn compute_tangent_basis(normal: Vec3) -> (Vec3, Vec3) {
    let tangent1 = if normal.x.abs() >= 0.57735 {
        Vec3::new(normal.y, -normal.x, 0.0).normalize()
    } else {
        Vec3::new(0.0, normal.z, -normal.y).normalize()
    };

    let tangent2 = normal.cross(tangent1);

    (tangent1, tangent2)
}

/// Inverse effective mass of both bodies along a constraint direction
fn effective_inv_mass(body_a: &RigidBody, body_b: &RigidBody, r_a: Vec3, r_b: Vec3, direction: Vec3) -> f32 {
    let rn_a = r_a.cross(direction);
    let rn_b = r_b.cross(direction);

    body_a.inv_mass
        + body_b.inv_mass
        + rn_a.dot(body_a.inv_inertia_world * rn_a)
        + rn_b.dot(body_b.inv_inertia_world * rn_b)
}

/// Velocity of B's contact point relative to A's
fn compute_relative_velocity(body_a: &RigidBody, body_b: &RigidBody, r_a: Vec3, r_b: Vec3) -> Vec3 {
    let vel_a = body_a.linear_velocity + body_a.angular_velocity.cross(r_a);
    let vel_b = body_b.linear_velocity + body_b.angular_velocity.cross(r_b);
    vel_b - vel_a
}

/// Applies an impulse that pushes B along `impulse` and A against it
fn apply_impulse(body_a: &mut RigidBody, body_b: &mut RigidBody, impulse: Vec3, r_a: Vec3, r_b: Vec3) {
    body_a.linear_velocity -= impulse * body_a.inv_mass;
    body_a.angular_velocity -= body_a.inv_inertia_world * r_a.cross(impulse);

    body_b.linear_velocity += impulse * body_b.inv_mass;
    body_b.angular_velocity += body_b.inv_inertia_world * r_b.cross(impulse);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::BodyHandle;
    use crate::dynamics::BodyType;
    use crate::geometry::Shape;

    #[test]
    fn test_tangent_basis() {
        let normal = Vec3::Y;
        let (t1, t2) = compute_tangent_basis(normal);

        assert!(t1.dot(normal).abs() < 0.0001);
        assert!(t2.dot(normal).abs() < 0.0001);
        assert!(t1.dot(t2).abs() < 0.0001);
        assert!((t1.length() - 1.0).abs() < 0.0001);
        assert!((t2.length() - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_spook_coefficients() {
        let spook = Spook::new(1e9, 4.0, 1.0 / 60.0);
        assert!((spook.b - 16.0 / 17.0).abs() < 1e-6);
        assert!((spook.a - 240.0 / 17.0).abs() < 1e-3);
        assert!(spook.eps > 0.0 && spook.eps < 1e-5);
    }

    #[test]
    fn test_normal_row_stops_approach() {
        let mut ground = RigidBody::new().with_type(BodyType::Static);
        ground.handle = BodyHandle::new(0);
        let mut ball = RigidBody::new().with_mass(1.0).with_shape(Shape::sphere(1.0));
        ball.handle = BodyHandle::new(1);
        ball.position = Vec3::new(0.0, 1.0, 0.0);
        ball.linear_velocity = Vec3::new(0.0, -1.0, 0.0);

        // Ball is body A; normal points from ball into ground
        let contact = ContactPoint {
            body_a: ball.handle,
            body_b: ground.handle,
            point_a: Vec3::ZERO,
            point_b: Vec3::ZERO,
            normal: Vec3::NEG_Y,
            depth: 0.0,
        };
        let material = ContactMaterial {
            contact_equation_stiffness: 1e9,
            contact_equation_relaxation: 4.0,
            ..ContactMaterial::new(0.0, 0.0)
        };
        let mut constraint = ContactConstraint::new(&contact, &ball, &ground, &material, 0.5, 1.0 / 60.0);

        let applied = constraint.solve_normal(&mut ball, &mut ground);

        assert!(applied > 0.0);
        assert!(ball.linear_velocity.y > -0.1, "vy = {}", ball.linear_velocity.y);
        assert!(ball.linear_velocity.y <= 0.0);
        assert_eq!(ground.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_restitution_bounces_fast_impact() {
        let mut ground = RigidBody::new().with_type(BodyType::Static);
        ground.handle = BodyHandle::new(0);
        let mut ball = RigidBody::new().with_mass(1.0).with_shape(Shape::sphere(1.0));
        ball.handle = BodyHandle::new(1);
        ball.position = Vec3::new(0.0, 1.0, 0.0);
        ball.linear_velocity = Vec3::new(0.0, -10.0, 0.0);

        let contact = ContactPoint {
            body_a: ball.handle,
            body_b: ground.handle,
            point_a: Vec3::ZERO,
            point_b: Vec3::ZERO,
            normal: Vec3::NEG_Y,
            depth: 0.0,
        };
        let material = ContactMaterial {
            contact_equation_stiffness: 1e9,
            contact_equation_relaxation: 4.0,
            ..ContactMaterial::new(0.0, 0.6)
        };
        let mut constraint = ContactConstraint::new(&contact, &ball, &ground, &material, 0.5, 1.0 / 60.0);
        constraint.solve_normal(&mut ball, &mut ground);

        assert!(ball.linear_velocity.y > 4.0, "vy = {}", ball.linear_velocity.y);
    }
}
