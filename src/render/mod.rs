//! Drawing the scene graph.
//!
//! [`Renderer`] is the seam between the run loop and a graphics backend.
//! [`MacroquadRenderer`] draws to a window; [`FrameRecorder`] draws nothing
//! and keeps a log of what it was shown, for headless runs.

mod window;

pub use window::MacroquadRenderer;

use glam::{Mat4, Vec3};

use crate::dynamics::Pose;
use crate::scene::{Camera, EntityId, Fog, Rgba, SceneGraph, SurfaceMaterial};

pub trait Renderer {
    /// Draws one frame of the scene as seen by `camera`
    fn render(&mut self, scene: &SceneGraph, camera: &Camera);
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        (**self).render(scene, camera)
    }
}

/// Local-to-world matrix of an entity
pub fn model_matrix(pose: Pose, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, pose.rotation, pose.position)
}

/// Final colour of a surface at a view distance.
///
/// Lit surfaces darken slightly with metalness; every surface fades into the
/// fog colour between the fog's near and far distances.
pub fn shade(material: &SurfaceMaterial, fog: Option<&Fog>, distance: f32) -> Rgba {
    let mut color = material.color;
    if !material.unlit {
        let k = 1.0 - 0.35 * material.metalness.clamp(0.0, 1.0);
        let [r, g, b, a] = color.0;
        color = Rgba([
            (f32::from(r) * k).round() as u8,
            (f32::from(g) * k).round() as u8,
            (f32::from(b) * k).round() as u8,
            a,
        ]);
    }
    match fog {
        Some(fog) => color.lerp(fog.color, fog.factor(distance)),
        None => color,
    }
}

/// Screen position in pixels (origin top-left) of a world point, or None
/// when it lies behind the camera
pub fn project_to_screen(camera: &Camera, point: Vec3, width: f32, height: f32) -> Option<(f32, f32)> {
    let clip = camera.view_projection() * point.extend(1.0);
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(((ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height))
}

/// What a [`FrameRecorder`] saw on one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedFrame {
    /// Zero-based frame index
    pub frame: u64,
    /// World pose of the tracked entity
    pub tracked: Option<Pose>,
    pub camera_position: Vec3,
    pub visible_entities: usize,
}

/// Renderer that records frames instead of drawing them
#[derive(Debug, Clone, Default)]
pub struct FrameRecorder {
    tracked: Option<EntityId>,
    frames: Vec<RecordedFrame>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the world pose of `entity` on every frame
    pub fn tracking(entity: EntityId) -> Self {
        Self {
            tracked: Some(entity),
            frames: Vec::new(),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }
}

impl Renderer for FrameRecorder {
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) {
        let frame = RecordedFrame {
            frame: self.frames.len() as u64,
            tracked: self.tracked.and_then(|id| scene.world_transform(id)),
            camera_position: camera.position,
            visible_entities: scene.iter().filter(|(id, _)| scene.is_visible(*id)).count(),
        };
        self.frames.push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RenderEntity;
    use glam::Quat;

    #[test]
    fn test_model_matrix() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let m = model_matrix(pose, Vec3::splat(2.0));
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_shade_fog_and_metal() {
        let fog = Fog {
            color: Rgba::WHITE,
            near: 100.0,
            far: 1000.0,
        };
        let plastic = SurfaceMaterial::standard(Rgba::rgb(200, 100, 0), 0.0);
        assert_eq!(shade(&plastic, Some(&fog), 10.0), Rgba::rgb(200, 100, 0));
        assert_eq!(shade(&plastic, Some(&fog), 2000.0), Rgba::WHITE);

        let metal = SurfaceMaterial::standard(Rgba::rgb(200, 100, 0), 1.0);
        assert_eq!(shade(&metal, None, 0.0), Rgba::rgb(130, 65, 0));

        let sun = SurfaceMaterial::unlit(Rgba::rgb(255, 255, 0));
        assert_eq!(shade(&sun, None, 0.0), Rgba::rgb(255, 255, 0));
    }

    #[test]
    fn test_projection_centre_and_behind() {
        let camera = Camera::default().with_position(Vec3::new(0.0, 3.0, 22.0));
        let (x, y) = project_to_screen(&camera, Vec3::new(0.0, 3.0, 0.0), 800.0, 600.0).expect("in front");
        assert!((x - 400.0).abs() < 1e-2 && (y - 300.0).abs() < 1e-2);
        assert!(project_to_screen(&camera, Vec3::new(0.0, 3.0, 40.0), 800.0, 600.0).is_none());
    }

    #[test]
    fn test_recorder_tracks_entity() {
        let mut scene = SceneGraph::default();
        let ball = scene.add(RenderEntity::group("ball").with_position(Vec3::new(0.0, 8.0, 0.0)));
        let mut recorder = FrameRecorder::tracking(ball);
        let camera = Camera::default();

        recorder.render(&scene, &camera);
        scene.set_pose(ball, Pose::from_position(Vec3::new(0.0, 7.5, 0.0)));
        recorder.render(&scene, &camera);

        assert_eq!(recorder.frame_count(), 2);
        assert_eq!(recorder.frames()[0].tracked.map(|p| p.position.y), Some(8.0));
        assert_eq!(recorder.last().and_then(|f| f.tracked).map(|p| p.position.y), Some(7.5));
        assert_eq!(recorder.last().map(|f| f.visible_entities), Some(1));
    }
}
