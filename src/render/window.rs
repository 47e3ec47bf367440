use std::collections::HashMap;

use ::macroquad::prelude as mq;
use tracing::{debug, warn};

use super::{model_matrix, project_to_screen, shade, Renderer};
use crate::assets::ModelDesc;
use crate::dynamics::Pose;
use crate::scene::{Camera, EntityId, EntityKind, Geometry, Light, Rgba, SceneGraph, SurfaceMaterial, TextDesc};

const HUD_FONT_SIZE: f32 = 20.0;

fn to_color(color: Rgba) -> mq::Color {
    let [r, g, b, a] = color.0;
    mq::Color::from_rgba(r, g, b, a)
}

fn to_mq_vec3(v: glam::Vec3) -> mq::Vec3 {
    mq::Vec3::from_array(v.to_array())
}

fn to_mq_mat4(m: glam::Mat4) -> mq::Mat4 {
    mq::Mat4::from_cols_array(&m.to_cols_array())
}

/// Draws the scene graph into the macroquad window
#[derive(Default)]
pub struct MacroquadRenderer {
    /// Fonts parsed from text entities; None when parsing failed
    fonts: HashMap<EntityId, Option<mq::Font>>,
    frames: u64,
    show_hud: bool,
}

impl MacroquadRenderer {
    pub fn new() -> Self {
        Self {
            show_hud: true,
            ..Self::default()
        }
    }

    pub fn with_hud(mut self, show: bool) -> Self {
        self.show_hud = show;
        self
    }

    fn camera_3d(camera: &Camera) -> mq::Camera3D {
        mq::Camera3D {
            position: to_mq_vec3(camera.position),
            target: to_mq_vec3(camera.target()),
            up: to_mq_vec3(camera.up()),
            fovy: camera.fov_y,
            aspect: Some(camera.aspect),
            ..Default::default()
        }
    }

    fn draw_geometry(geometry: &Geometry, pose: Pose, scale: glam::Vec3, color: mq::Color) {
        // SAFETY: called on the main thread between frames, as macroquad requires
        let gl = unsafe { ::macroquad::window::get_internal_gl() };
        gl.quad_gl.push_model_matrix(to_mq_mat4(model_matrix(pose, scale)));

        match *geometry {
            Geometry::Sphere { radius } => mq::draw_sphere(mq::Vec3::ZERO, radius, None, color),
            Geometry::Plane { width, depth } => {
                mq::draw_plane(mq::Vec3::ZERO, mq::vec2(width * 0.5, depth * 0.5), None, color)
            }
            Geometry::Cuboid { half_extents } => {
                let size = mq::Vec3::from_array(half_extents) * 2.0;
                mq::draw_cube(mq::Vec3::ZERO, size, None, color);
            }
            Geometry::Cylinder { radius, height } => {
                mq::draw_cylinder(mq::Vec3::ZERO, radius, radius, height, None, color)
            }
        }

        // SAFETY: as above
        let gl = unsafe { ::macroquad::window::get_internal_gl() };
        gl.quad_gl.pop_model_matrix();
    }

    fn draw_model(scene: &SceneGraph, model: &ModelDesc, pose: Pose, scale: glam::Vec3, camera: &Camera) {
        for part in &model.parts {
            let part_pose = Pose::new(pose.transform_point(part.offset() * scale), pose.rotation);
            let distance = part_pose.position.distance(camera.position);
            let color = shade(&SurfaceMaterial::standard(part.color, 0.0), scene.fog.as_ref(), distance);
            Self::draw_geometry(&part.geometry, part_pose, scale, to_color(color));
        }
    }

    fn draw_light(light: &Light, pose: Pose) {
        let center = to_mq_vec3(pose.position);
        match *light {
            Light::Point { color, .. } => mq::draw_sphere_wires(center, 0.25, None, to_color(color)),
            Light::Directional { color, .. } => {
                let tip = to_mq_vec3(pose.position + pose.rotation * glam::Vec3::NEG_Y);
                mq::draw_line_3d(center, tip, to_color(color));
            }
        }
    }

    fn draw_label(&mut self, id: EntityId, text: &TextDesc, pose: Pose, camera: &Camera) {
        let font = self.fonts.entry(id).or_insert_with(|| match mq::load_ttf_font_from_bytes(&text.font) {
            Ok(font) => {
                debug!(?id, "label font parsed");
                Some(font)
            }
            Err(err) => {
                warn!(?id, error = ?err, "label font unusable; falling back to the default font");
                None
            }
        });

        let Some((x, y)) = project_to_screen(camera, pose.position, mq::screen_width(), mq::screen_height()) else {
            return;
        };
        // Perspective size: world units at this depth to pixels
        let depth = pose.position.distance(camera.position).max(1.0);
        let pixels = text.size * mq::screen_height() / (2.0 * depth * (camera.fov_y * 0.5).tan());
        let font_size = pixels.clamp(4.0, 512.0) as u16;

        mq::draw_text_ex(
            &text.text,
            x,
            y,
            mq::TextParams {
                font: font.as_ref(),
                font_size,
                color: to_color(text.color),
                ..Default::default()
            },
        );
    }
}

impl Renderer for MacroquadRenderer {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        let mut camera = *camera;
        camera.aspect = mq::screen_width() / mq::screen_height().max(1.0);

        mq::clear_background(to_color(scene.background));
        mq::set_camera(&Self::camera_3d(&camera));

        let mut labels = Vec::new();
        for (id, entity) in scene.iter() {
            if !scene.is_visible(id) {
                continue;
            }
            let Some(pose) = scene.world_transform(id) else {
                continue;
            };
            let distance = pose.position.distance(camera.position);

            match &entity.kind {
                EntityKind::Group => {}
                EntityKind::Mesh(mesh) => {
                    let color = shade(&mesh.material, scene.fog.as_ref(), distance);
                    Self::draw_geometry(&mesh.geometry, pose, entity.scale, to_color(color));
                }
                EntityKind::Light(light) => Self::draw_light(light, pose),
                EntityKind::Model(model) => Self::draw_model(scene, model, pose, entity.scale, &camera),
                EntityKind::Text(text) => labels.push((id, text, pose)),
            }
        }

        mq::set_default_camera();
        for (id, text, pose) in labels {
            self.draw_label(id, text, pose, &camera);
        }

        self.frames += 1;
        if self.show_hud {
            let hud = format!("FPS: {}  frame: {}", mq::get_fps(), self.frames);
            mq::draw_text(&hud, 10.0, 24.0, HUD_FONT_SIZE, mq::WHITE);
        }
    }
}
