//! # Bounce
//!
//! A sphere dropped onto a ground plane, simulated with a fixed-step
//! rigid-body world and drawn as a small 3D scene.
//!
//! ## Layers
//!
//! - **Physics**: [`World`] with sphere and plane colliders, material pairs,
//!   and a SPOOK-regularised Gauss-Seidel contact solver
//! - **Scene**: a render-side [`scene::SceneGraph`] whose bound entities copy
//!   their body's pose every tick
//! - **Loop**: [`simulation::SimulationLoop`] steps physics, syncs poses,
//!   animates decorations and renders, once per host frame
//! - **Assets**: models and fonts load on worker threads and attach when ready
//!
//! ## Quick Start
//!
//! ```rust
//! use bounce::prelude::*;
//!
//! let mut world = World::default();
//!
//! let ground = world.create_body(RigidBodyDesc::fixed().with_rotation(ground_rotation()));
//! world.attach_collider(ground, Shape::plane());
//!
//! let ball = world.create_body(
//!     RigidBodyDesc::dynamic()
//!         .with_position(Vec3::new(0.0, 8.0, 0.0))
//!         .with_mass(1.0),
//! );
//! world.attach_collider(ball, Shape::sphere(1.0));
//!
//! for _ in 0..600 {
//!     world.step(FIXED_DT);
//! }
//! assert!(world.body_position(ball).y > 0.5);
//! ```

pub mod animation;
pub mod assets;
pub mod clock;
pub mod collision;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod host;
pub mod input;
pub mod logging;
pub mod render;
pub mod scene;
pub mod setup;
pub mod simulation;
pub mod solver;
pub mod sync;
mod world;

#[cfg(test)]
mod testing;

pub use world::{World, WorldConfig, STANDARD_GRAVITY};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collision::{BodyHandle, ContactPoint};
    pub use crate::config::SceneConfig;
    pub use crate::dynamics::{BodyType, Pose, RigidBody, RigidBodyDesc};
    pub use crate::error::{AssetError, BindingError, ConfigError, SceneError};
    pub use crate::geometry::{ContactMaterial, Material, MaterialId, MassProperties, Shape, ShapeType, Sphere};
    pub use crate::host::{FrameHost, MacroquadHost};
    pub use crate::render::{FrameRecorder, MacroquadRenderer, Renderer};
    pub use crate::setup::{build_scene, ground_rotation};
    pub use crate::simulation::{SimulationContext, SimulationLoop, StopHandle, FIXED_DT};
    pub use crate::solver::{PgsSolver, SolverConfig};
    pub use crate::world::{World, WorldConfig};
    pub use glam::{Quat, Vec3};
}
