use glam::Vec3;

/// A handle to a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Invalid/null body handle
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates a new body handle
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this handle
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this handle is valid
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A single contact point between two bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Deepest point of A inside B, world space
    pub point_a: Vec3,
    /// Deepest point of B inside A, world space
    pub point_b: Vec3,
    /// Unit normal pointing from A towards B
    pub normal: Vec3,
    /// Penetration depth (positive when overlapping)
    pub depth: f32,
}

impl ContactPoint {
    /// Returns the midpoint of the contact
    pub fn midpoint(&self) -> Vec3 {
        (self.point_a + self.point_b) * 0.5
    }

    /// Signed separation along the normal (negative while penetrating)
    pub fn separation(&self) -> f32 {
        -self.depth
    }

    /// Same contact seen from the other body
    pub fn flipped(self) -> Self {
        Self {
            body_a: self.body_b,
            body_b: self.body_a,
            point_a: self.point_b,
            point_b: self.point_a,
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_validity() {
        assert!(!BodyHandle::default().is_valid());
        assert!(BodyHandle::new(3).is_valid());
        assert_eq!(BodyHandle::new(3).index(), 3);
    }

    #[test]
    fn test_flip_contact() {
        let contact = ContactPoint {
            body_a: BodyHandle::new(0),
            body_b: BodyHandle::new(1),
            point_a: Vec3::new(0.0, -0.1, 0.0),
            point_b: Vec3::ZERO,
            normal: Vec3::NEG_Y,
            depth: 0.1,
        };

        let flipped = contact.flipped();
        assert_eq!(flipped.body_a, BodyHandle::new(1));
        assert_eq!(flipped.normal, Vec3::Y);
        assert_eq!(flipped.midpoint(), contact.midpoint());
        assert!(contact.separation() < 0.0);
    }
}
