use glam::{Mat3, Quat, Vec3};

use crate::collision::BodyHandle;
use crate::geometry::{MaterialId, Shape};

/// The type of rigid body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Dynamic bodies are affected by forces and collisions
    #[default]
    Dynamic,
    /// Static bodies never move
    Static,
    /// Kinematic bodies move according to their velocity but aren't affected by forces
    Kinematic,
}

/// Position and orientation of a body or entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Transforms a point from local to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A rigid body in the physics simulation
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Body handle for identification
    pub handle: BodyHandle,
    /// Body type (dynamic, static, kinematic)
    pub body_type: BodyType,

    // Transform
    /// Position in world space
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,

    // Velocities
    /// Linear velocity
    pub linear_velocity: Vec3,
    /// Angular velocity (in radians per second)
    pub angular_velocity: Vec3,

    // Mass properties
    /// Mass requested at creation (used when a collider is attached)
    pub mass: f32,
    /// Inverse mass (0 for infinite mass / static)
    pub inv_mass: f32,
    /// Local inverse inertia tensor
    pub inv_inertia_local: Mat3,
    /// World space inverse inertia tensor (updated each step)
    pub inv_inertia_world: Mat3,

    // Forces
    /// Accumulated force (reset each step)
    pub force: Vec3,
    /// Accumulated torque (reset each step)
    pub torque: Vec3,

    /// Surface material, if any
    pub material: Option<MaterialId>,

    // Damping
    /// Fraction of linear velocity lost per second (0-1)
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second (0-1)
    pub angular_damping: f32,

    /// The collision shape attached to this body
    pub shape: Option<Shape>,

    // Sleep
    /// Whether the body is awake
    pub is_awake: bool,
    sleep_time: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            handle: BodyHandle::INVALID,
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            inv_mass: 1.0,
            inv_inertia_local: Mat3::IDENTITY,
            inv_inertia_world: Mat3::IDENTITY,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            material: None,
            linear_damping: 0.01,
            angular_damping: 0.01,
            shape: None,
            is_awake: true,
            sleep_time: 0.0,
        }
    }
}

impl RigidBody {
    /// Creates a new rigid body
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the body type
    pub fn with_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        if body_type != BodyType::Dynamic {
            self.inv_mass = 0.0;
            self.inv_inertia_local = Mat3::ZERO;
            self.inv_inertia_world = Mat3::ZERO;
        }
        self
    }

    /// Sets the position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self.update_world_inertia();
        self
    }

    /// Sets the mass (automatically computes inverse mass)
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        if mass > 0.0 && self.body_type == BodyType::Dynamic {
            self.inv_mass = 1.0 / mass;
        } else {
            self.inv_mass = 0.0;
        }
        self
    }

    /// Sets the collision shape and derives inertia from it
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.set_shape(shape);
        self
    }

    /// Sets linear damping
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Attaches a shape, recomputing inertia for dynamic bodies
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = Some(shape);
        if self.is_dynamic() && self.mass > 0.0 {
            let props = shape.mass_properties(self.mass);
            self.inv_mass = props.inv_mass();
            self.inv_inertia_local = props.inv_inertia();
            self.update_world_inertia();
        }
    }

    /// Returns the pose of this body
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    /// Returns true if this body has finite mass
    pub fn has_finite_mass(&self) -> bool {
        self.inv_mass > 0.0
    }

    /// Returns true if this is a dynamic body
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Returns true if this is a static body
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Applies a force at the center of mass
    pub fn apply_force(&mut self, force: Vec3) {
        if self.is_dynamic() {
            self.force += force;
            self.wake_up();
        }
    }

    /// Applies an impulse at the center of mass
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.is_dynamic() {
            self.linear_velocity += impulse * self.inv_mass;
            self.wake_up();
        }
    }

    /// Applies an impulse at a world point
    pub fn apply_impulse_at_point(&mut self, impulse: Vec3, point: Vec3) {
        if self.is_dynamic() {
            self.linear_velocity += impulse * self.inv_mass;
            let r = point - self.position;
            self.angular_velocity += self.inv_inertia_world * r.cross(impulse);
            self.wake_up();
        }
    }

    /// Gets the velocity at a world point
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    /// Clears accumulated forces
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Updates the world space inertia tensor
    pub fn update_world_inertia(&mut self) {
        if self.body_type != BodyType::Dynamic {
            self.inv_inertia_world = Mat3::ZERO;
            return;
        }

        let rot = Mat3::from_quat(self.rotation);
        self.inv_inertia_world = rot * self.inv_inertia_local * rot.transpose();
    }

    /// Wakes up the body
    pub fn wake_up(&mut self) {
        self.is_awake = true;
        self.sleep_time = 0.0;
    }

    /// Puts the body to sleep
    pub fn sleep(&mut self) {
        self.is_awake = false;
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
        self.clear_forces();
    }

    /// Updates sleep state; the body sleeps after staying slower than
    /// `speed_limit` for `time_limit` seconds
    pub fn update_sleep(&mut self, dt: f32, speed_limit: f32, time_limit: f32) {
        if !self.is_dynamic() || !self.is_awake {
            return;
        }

        let speed_sq = self.linear_velocity.length_squared() + self.angular_velocity.length_squared();

        if speed_sq < speed_limit * speed_limit {
            self.sleep_time += dt;
            if self.sleep_time > time_limit {
                self.sleep();
            }
        } else {
            self.sleep_time = 0.0;
        }
    }
}

/// Description for creating a rigid body
#[derive(Debug, Clone)]
pub struct RigidBodyDesc {
    pub body_type: BodyType,
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub material: Option<MaterialId>,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            material: None,
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }
}

impl RigidBodyDesc {
    /// Creates a new dynamic body description
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Creates a new static body description
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Static,
            mass: 0.0,
            ..Self::default()
        }
    }

    /// Creates a new kinematic body description
    pub fn kinematic() -> Self {
        Self {
            body_type: BodyType::Kinematic,
            mass: 0.0,
            ..Self::default()
        }
    }

    /// Sets the position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the mass; a dynamic body with zero mass becomes static
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        if mass <= 0.0 && self.body_type == BodyType::Dynamic {
            self.body_type = BodyType::Static;
        }
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_creation() {
        let body = RigidBody::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_mass(2.0);

        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        assert!((body.inv_mass - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_static_body() {
        let body = RigidBody::new().with_type(BodyType::Static);

        assert!(body.is_static());
        assert!(!body.has_finite_mass());
        assert_eq!(body.inv_mass, 0.0);
    }

    #[test]
    fn test_zero_mass_desc_is_static() {
        let desc = RigidBodyDesc::dynamic().with_mass(0.0);
        assert_eq!(desc.body_type, BodyType::Static);
    }

    #[test]
    fn test_shape_sets_inertia() {
        let body = RigidBody::new().with_mass(1.0).with_shape(Shape::sphere(1.0));
        assert!((body.inv_inertia_world.x_axis.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_impulse_wakes_body() {
        let mut body = RigidBody::new().with_mass(1.0);
        body.sleep();
        assert!(!body.is_awake);

        body.apply_impulse(Vec3::new(1.0, 0.0, 0.0));

        assert!(body.is_awake);
        assert_eq!(body.linear_velocity, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_velocity_at_point() {
        let mut body = RigidBody::new().with_position(Vec3::ZERO).with_mass(1.0);

        body.linear_velocity = Vec3::new(1.0, 0.0, 0.0);
        body.angular_velocity = Vec3::new(0.0, 0.0, 1.0);

        // (0, 0, 1) x (0, 1, 0) = (-1, 0, 0) cancels the linear part
        let vel = body.velocity_at_point(Vec3::new(0.0, 1.0, 0.0));
        assert!(vel.length() < 0.0001);
    }

    #[test]
    fn test_sleep_after_slow_period() {
        let mut body = RigidBody::new().with_mass(1.0);
        body.linear_velocity = Vec3::new(0.01, 0.0, 0.0);

        body.update_sleep(0.5, 0.1, 1.0);
        assert!(body.is_awake);
        body.update_sleep(0.6, 0.1, 1.0);
        assert!(!body.is_awake);
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }
}
