use glam::{Mat4, Quat, Vec3};

use super::{EntityId, SceneGraph};

/// Perspective camera looking down its local -Z axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            rotation: Quat::IDENTITY,
            fov_y: 75f32.to_radians(),
            near: 0.1,
            far: 10000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Tilts the camera about its X axis (negative looks down)
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.rotation = Quat::from_rotation_x(pitch);
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// A point one unit in front of the camera
    pub fn target(&self) -> Vec3 {
        self.position + self.forward()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target(), self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Keeps the camera's X and Y on a tracked entity; Z and orientation stay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFollow {
    pub target: EntityId,
}

impl CameraFollow {
    pub fn new(target: EntityId) -> Self {
        Self { target }
    }

    /// Returns false when the target no longer exists
    pub fn apply(&self, scene: &SceneGraph, camera: &mut Camera) -> bool {
        let Some(pose) = scene.world_transform(self.target) else {
            return false;
        };
        camera.position.x = pose.position.x;
        camera.position.y = pose.position.y;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RenderEntity;

    #[test]
    fn test_pitch_looks_down() {
        let camera = Camera::default().with_pitch(-0.3);
        let forward = camera.forward();
        assert!(forward.y < 0.0);
        assert!(forward.z < 0.0);
        assert!((forward.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_follow_copies_xy_only() {
        let mut scene = SceneGraph::default();
        let ball = scene.add(RenderEntity::group("ball").with_position(Vec3::new(2.0, 5.0, -1.0)));
        let mut camera = Camera::default().with_position(Vec3::new(0.0, 3.0, 22.0));

        assert!(CameraFollow::new(ball).apply(&scene, &mut camera));

        assert_eq!(camera.position, Vec3::new(2.0, 5.0, 22.0));
    }

    #[test]
    fn test_follow_missing_target() {
        let scene = SceneGraph::default();
        let mut camera = Camera::default();
        assert!(!CameraFollow::new(EntityId(0)).apply(&scene, &mut camera));
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_view_projection_centres_target() {
        let camera = Camera::default().with_position(Vec3::new(0.0, 3.0, 22.0)).with_pitch(-0.3);
        let clip = camera.view_projection() * camera.target().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
