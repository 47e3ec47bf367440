//! Time-driven decorative rotations.

use glam::{Quat, Vec3};

use crate::scene::{EntityId, SceneGraph};

/// Rotates an entity about a fixed axis at a constant rate.
///
/// The angle comes from accumulated elapsed time rather than summed deltas,
/// so it does not drift with frame pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub entity: EntityId,
    pub axis: Vec3,
    /// Radians per second
    pub rate: f32,
}

impl Spin {
    pub fn new(entity: EntityId, axis: Vec3, rate: f32) -> Self {
        Self {
            entity,
            axis: axis.try_normalize().unwrap_or(Vec3::Z),
            rate,
        }
    }

    pub fn rotation_at(&self, elapsed: f64) -> Quat {
        Quat::from_axis_angle(self.axis, (f64::from(self.rate) * elapsed) as f32)
    }

    /// Sets the entity's local rotation, keeping its position
    pub fn apply(&self, scene: &mut SceneGraph, elapsed: f64) {
        if let Some(entity) = scene.get_mut(self.entity) {
            entity.pose.rotation = self.rotation_at(elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::RenderEntity;

    #[test]
    fn test_angle_from_elapsed() {
        let spin = Spin::new(EntityId(0), Vec3::Z, -0.1);
        let (axis, angle) = spin.rotation_at(10.0).to_axis_angle();
        // -1 rad about +Z is reported as +1 rad about -Z
        assert!((angle - 1.0).abs() < 1e-5);
        assert!((axis - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_apply_keeps_position() {
        let mut scene = SceneGraph::default();
        let group = scene.add(RenderEntity::group("sun_group").with_position(Vec3::new(1.0, 2.0, 3.0)));
        let spin = Spin::new(group, Vec3::Z, -0.1);

        spin.apply(&mut scene, 5.0);
        spin.apply(&mut scene, 5.0);

        let pose = scene.pose(group).expect("group");
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.rotation, spin.rotation_at(5.0));
    }

    #[test]
    fn test_zero_axis_falls_back() {
        let spin = Spin::new(EntityId(0), Vec3::ZERO, 1.0);
        assert_eq!(spin.axis, Vec3::Z);
    }
}
