use glam::{Quat, Vec3};
use tracing::trace;

use crate::collision::{collide, naive_pairs, BodyHandle, ContactPoint};
use crate::dynamics::{integrate_positions, integrate_velocities, Pose, RigidBody, RigidBodyDesc};
use crate::geometry::{ContactMaterial, Material, MaterialId, MaterialTable, Shape};
use crate::solver::{PgsSolver, SolveStats, SolverConfig};

/// Standard gravity used by the scene (m/s², negative Y)
pub const STANDARD_GRAVITY: f32 = -9.82;

/// Configuration for the physics world
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Gravity vector
    pub gravity: Vec3,
    /// Solver configuration
    pub solver: SolverConfig,
    /// Whether slow bodies may be put to sleep
    pub allow_sleep: bool,
    /// Speed below which a body counts as idle
    pub sleep_speed_limit: f32,
    /// Seconds a body must stay idle before sleeping
    pub sleep_time_limit: f32,
    /// Orientations are renormalised every `quat_normalize_skip + 1` steps
    pub quat_normalize_skip: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, STANDARD_GRAVITY, 0.0),
            solver: SolverConfig::default(),
            allow_sleep: false,
            sleep_speed_limit: 0.1,
            sleep_time_limit: 1.0,
            quat_normalize_skip: 0,
        }
    }
}

/// The physics world: owns all bodies and advances them in fixed steps
pub struct World {
    config: WorldConfig,
    bodies: Vec<RigidBody>,
    materials: MaterialTable,
    solver: PgsSolver,
    /// Contacts found during the last step
    contacts: Vec<ContactPoint>,
    last_solve: SolveStats,
    time: f32,
    step_count: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    /// Creates a new physics world with the given configuration
    pub fn new(config: WorldConfig) -> Self {
        Self {
            solver: PgsSolver::new(config.solver),
            config,
            bodies: Vec::new(),
            materials: MaterialTable::default(),
            contacts: Vec::new(),
            last_solve: SolveStats::default(),
            time: 0.0,
            step_count: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Sets the gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Gets the gravity
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    pub fn set_solver_config(&mut self, solver: SolverConfig) {
        self.config.solver = solver;
        self.solver.set_config(solver);
    }

    /// Registers a material
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.add(material)
    }

    /// Registers contact parameters for a material pair
    pub fn add_contact_material(&mut self, a: MaterialId, b: MaterialId, contact: ContactMaterial) {
        self.materials.add_contact(a, b, contact);
    }

    /// Contact parameters used for pairs without a registered contact material
    pub fn default_contact_material_mut(&mut self) -> &mut ContactMaterial {
        self.materials.default_contact_mut()
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Creates a new rigid body and returns its handle
    pub fn create_body(&mut self, desc: RigidBodyDesc) -> BodyHandle {
        let handle = BodyHandle::new(self.bodies.len() as u32);

        let mut body = RigidBody::new()
            .with_type(desc.body_type)
            .with_position(desc.position)
            .with_rotation(desc.rotation)
            .with_mass(desc.mass);
        body.handle = handle;
        body.linear_velocity = desc.linear_velocity;
        body.angular_velocity = desc.angular_velocity;
        body.material = desc.material;
        body.linear_damping = desc.linear_damping;
        body.angular_damping = desc.angular_damping;
        body.update_world_inertia();

        self.bodies.push(body);
        handle
    }

    /// Attaches a collision shape to a body
    pub fn attach_collider(&mut self, handle: BodyHandle, shape: Shape) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.set_shape(shape);
        }
    }

    /// Gets a reference to a body
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.index())
    }

    /// Gets a mutable reference to a body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.index())
    }

    /// Gets the position of a body
    pub fn body_position(&self, handle: BodyHandle) -> Vec3 {
        self.body(handle).map(|b| b.position).unwrap_or(Vec3::ZERO)
    }

    /// Gets the rotation of a body
    pub fn body_rotation(&self, handle: BodyHandle) -> Quat {
        self.body(handle).map(|b| b.rotation).unwrap_or(Quat::IDENTITY)
    }

    /// Gets the pose of a body, if it exists
    pub fn body_pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.body(handle).map(RigidBody::pose)
    }

    /// Teleports a body, clearing its velocities
    pub fn reset_body(&mut self, handle: BodyHandle, pose: Pose) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.position = pose.position;
            body.rotation = pose.rotation;
            body.linear_velocity = Vec3::ZERO;
            body.angular_velocity = Vec3::ZERO;
            body.clear_forces();
            body.update_world_inertia();
            body.wake_up();
        }
    }

    /// Sets the linear velocity of a body
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.linear_velocity = velocity;
            body.wake_up();
        }
    }

    /// Adds `delta` to a body's linear velocity
    pub fn nudge_velocity(&mut self, handle: BodyHandle, delta: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            if body.is_dynamic() {
                body.linear_velocity += delta;
                body.wake_up();
            }
        }
    }

    /// Applies an impulse to a body at its center of mass
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.apply_impulse(impulse);
        }
    }

    /// Applies a force to a body at its center of mass for the next step
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.apply_force(force);
        }
    }

    /// Advances the simulation by exactly one step of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let gravity = self.config.gravity;
        for body in &mut self.bodies {
            integrate_velocities(body, gravity, dt);
        }

        self.detect_collisions();

        self.solver.prepare(&self.contacts, &self.bodies, &self.materials, dt);
        self.last_solve = self.solver.solve(&mut self.bodies);

        let normalize = self.step_count % (u64::from(self.config.quat_normalize_skip) + 1) == 0;
        for body in &mut self.bodies {
            integrate_positions(body, dt, normalize);
        }

        self.post_step(dt);

        self.time += dt;
        self.step_count += 1;

        trace!(
            step = self.step_count,
            contacts = self.contacts.len(),
            iterations = self.last_solve.iterations,
            "physics step"
        );
    }

    /// Broad phase followed by analytic narrow phase
    fn detect_collisions(&mut self) {
        self.contacts.clear();

        for (handle_a, handle_b) in naive_pairs(&self.bodies) {
            let body_a = &self.bodies[handle_a.index()];
            let body_b = &self.bodies[handle_b.index()];

            if let Some(contact) = collide(body_a, body_b) {
                self.contacts.push(contact);
            }
        }

        // An awake body touching a sleeping one wakes it
        for contact in &self.contacts {
            for index in [contact.body_a.index(), contact.body_b.index()] {
                let body = &mut self.bodies[index];
                if body.is_dynamic() && !body.is_awake {
                    body.wake_up();
                }
            }
        }
    }

    fn post_step(&mut self, dt: f32) {
        for body in &mut self.bodies {
            if self.config.allow_sleep {
                body.update_sleep(dt, self.config.sleep_speed_limit, self.config.sleep_time_limit);
            }
            body.clear_forces();
        }
    }

    /// Contacts found during the last step
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// Solver statistics of the last step
    pub fn last_solve(&self) -> SolveStats {
        self.last_solve
    }

    /// Returns the number of bodies in the world
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Returns the current simulation time
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Returns an iterator over all body handles
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter().map(|b| b.handle)
    }
}
