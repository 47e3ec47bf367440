use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::ModelDesc;
use crate::dynamics::Pose;

use super::EntityId;

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Linear blend towards `other` by `t` in [0, 1]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let a = f32::from(self.0[i]);
            let b = f32::from(other.0[i]);
            *channel = (a + (b - a) * t).round() as u8;
        }
        Self(out)
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(value: [u8; 4]) -> Self {
        Self(value)
    }
}

/// Primitive geometry a mesh or model part is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Sphere { radius: f32 },
    /// Flat quad in the local XZ plane
    Plane { width: f32, depth: f32 },
    Cuboid { half_extents: [f32; 3] },
    /// Upright cylinder centred on its local origin
    Cylinder { radius: f32, height: f32 },
}

/// How a surface is shaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub color: Rgba,
    pub metalness: f32,
    /// Ignores lights (the sun is self-lit)
    pub unlit: bool,
}

impl SurfaceMaterial {
    pub fn standard(color: Rgba, metalness: f32) -> Self {
        Self {
            color,
            metalness,
            unlit: false,
        }
    }

    pub fn unlit(color: Rgba) -> Self {
        Self {
            color,
            metalness: 0.0,
            unlit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDesc {
    pub geometry: Geometry,
    pub material: SurfaceMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Directional { color: Rgba, intensity: f32 },
    Point { color: Rgba, intensity: f32, range: f32 },
}

/// A text label drawn with a loaded font
#[derive(Debug, Clone, PartialEq)]
pub struct TextDesc {
    pub text: String,
    pub size: f32,
    pub color: Rgba,
    /// Raw TTF bytes
    pub font: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Transform-only node used to rotate its children together
    Group,
    Mesh(MeshDesc),
    Light(Light),
    Text(TextDesc),
    Model(ModelDesc),
}

/// A node of the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct RenderEntity {
    pub name: String,
    /// Pose relative to the parent (or the world for roots)
    pub pose: Pose,
    pub scale: Vec3,
    pub parent: Option<EntityId>,
    pub kind: EntityKind,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl RenderEntity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            pose: Pose::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            kind,
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, EntityKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: SurfaceMaterial) -> Self {
        Self::new(name, EntityKind::Mesh(MeshDesc { geometry, material }))
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, EntityKind::Light(light))
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.pose.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}
