mod integrator;
mod rigid_body;

pub use integrator::{integrate_positions, integrate_rotation, integrate_velocities};
pub use rigid_body::{BodyType, Pose, RigidBody, RigidBodyDesc};
