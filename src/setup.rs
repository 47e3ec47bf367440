//! Builds the bouncing-sphere scene from a [`SceneConfig`].

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use tracing::info;

use crate::animation::Spin;
use crate::assets::AssetKind;
use crate::config::SceneConfig;
use crate::dynamics::{Pose, RigidBodyDesc};
use crate::error::SceneError;
use crate::geometry::{ContactMaterial, Material, Shape};
use crate::input::InputMap;
use crate::scene::{
    Camera, CameraFollow, Fog, Geometry, Light, RenderEntity, Rgba, SceneGraph, SurfaceMaterial,
};
use crate::simulation::{Attachment, Controlled, LabelSpec, SimulationContext};
use crate::solver::SolverConfig;
use crate::world::{World, WorldConfig};

const SUN_COLOR: Rgba = Rgba::rgb(255, 250, 57);
const FLOOR_COLOR: Rgba = Rgba::rgb(0, 128, 0);
const LABEL_SIZE: f32 = 4.0;

/// Orientation that turns the plane's local +Z normal into world +Y
pub fn ground_rotation() -> Quat {
    Quat::from_axis_angle(Vec3::NEG_X, FRAC_PI_2)
}

fn build_world(config: &SceneConfig) -> World {
    let physics = &config.physics;
    let mut world = World::new(WorldConfig {
        gravity: physics.gravity(),
        solver: SolverConfig {
            iterations: physics.solver_iterations,
            tolerance: physics.solver_tolerance,
            restitution_threshold: physics.restitution_threshold,
        },
        allow_sleep: physics.allow_sleep,
        quat_normalize_skip: physics.quat_normalize_skip,
        ..WorldConfig::default()
    });

    let default_contact = world.default_contact_material_mut();
    default_contact.contact_equation_stiffness = physics.contact_stiffness;
    default_contact.contact_equation_relaxation = physics.contact_relaxation;

    world
}

/// Creates the world, scene graph, camera and bindings, and starts the
/// configured asset loads.
pub fn build_scene(config: &SceneConfig) -> Result<SimulationContext, SceneError> {
    config.validate()?;

    let mut world = build_world(config);
    let materials = &config.materials;
    let ground_material = world.add_material(Material::new(materials.ground.as_str()));
    let ball_material = world.add_material(Material::new(materials.ball.as_str()));
    world.add_contact_material(
        ground_material,
        ball_material,
        ContactMaterial::new(materials.friction, materials.restitution),
    );

    let ground = world.create_body(
        RigidBodyDesc::fixed()
            .with_rotation(ground_rotation())
            .with_material(ground_material),
    );
    world.attach_collider(ground, Shape::plane());

    let sphere = &config.sphere;
    let start = Pose::from_position(Vec3::from_array(sphere.start));
    let ball = world.create_body(
        RigidBodyDesc::dynamic()
            .with_position(start.position)
            .with_mass(sphere.mass)
            .with_material(ball_material),
    );
    world.attach_collider(ball, Shape::sphere(sphere.radius));

    let decor = &config.decor;
    let background = Rgba::from(decor.background);
    let mut scene = SceneGraph::new(background);
    scene.fog = Some(Fog {
        color: background,
        near: decor.fog_near,
        far: decor.fog_far,
    });

    let ball_entity = scene.add(
        RenderEntity::mesh(
            "sphere",
            Geometry::Sphere { radius: sphere.radius },
            SurfaceMaterial::standard(Rgba::from(sphere.color), 0.0),
        )
        .with_pose(start)
        .with_shadows(true, false),
    );

    let sun_group = scene.add(RenderEntity::group("sun_group"));
    scene.add_child(
        sun_group,
        RenderEntity::mesh("sun", Geometry::Sphere { radius: 2.0 }, SurfaceMaterial::unlit(SUN_COLOR))
            .with_position(Vec3::new(0.0, 12.0, 0.0)),
    );

    let [floor_width, floor_depth] = decor.floor_size;
    scene.add(
        RenderEntity::mesh(
            "floor",
            Geometry::Plane {
                width: floor_width,
                depth: floor_depth,
            },
            SurfaceMaterial::standard(FLOOR_COLOR, 1.0),
        )
        .with_shadows(false, true),
    );

    scene.add(
        RenderEntity::light(
            "key_light",
            Light::Directional {
                color: Rgba::WHITE,
                intensity: 1.0,
            },
        )
        .with_position(Vec3::new(0.0, 10.0, 6.0))
        .with_shadows(true, false),
    );

    let sun_light_group = scene.add(RenderEntity::group("sun_light_group"));
    scene.add_child(
        sun_light_group,
        RenderEntity::light(
            "sun_light",
            Light::Point {
                color: Rgba::WHITE,
                intensity: 1.0,
                range: 100.0,
            },
        )
        .with_position(Vec3::new(0.0, 6.0, 0.0))
        .with_shadows(true, false),
    );

    let cam = &config.camera;
    let camera = Camera {
        fov_y: cam.fov_y.to_radians(),
        near: cam.near,
        far: cam.far,
        ..Camera::default()
    }
    .with_position(Vec3::from_array(cam.position))
    .with_pitch(cam.pitch);

    let mut ctx = SimulationContext::new(world, scene, camera);
    ctx.fixed_dt = config.physics.fixed_dt;
    ctx.bindings.bind_checked(&ctx.world, &ctx.scene, ball, ball_entity)?;
    ctx.controlled = Some(Controlled { body: ball, initial: start });
    ctx.follow = cam.follow.then_some(CameraFollow::new(ball_entity));
    ctx.spins = vec![
        Spin::new(sun_group, Vec3::Z, decor.sun_spin_rate),
        Spin::new(sun_light_group, Vec3::Z, decor.sun_spin_rate),
    ];
    ctx.input_map = InputMap::new(config.input.effective_bindings());

    let assets = &config.assets;
    if let Some(model) = &assets.model {
        ctx.request_asset(AssetKind::Model, model.path.clone(), model.required, Attachment::Model);
    }
    if let Some(font) = &assets.font {
        let label = LabelSpec {
            text: assets.label.clone(),
            position: Vec3::from_array(assets.label_position),
            size: LABEL_SIZE,
            color: FLOOR_COLOR,
        };
        ctx.request_asset(AssetKind::Font, font.path.clone(), font.required, Attachment::Label(label));
    }

    info!(
        bodies = ctx.world.num_bodies(),
        entities = ctx.scene.len(),
        assets = ctx.assets.len(),
        "scene built"
    );
    Ok(ctx)
}
