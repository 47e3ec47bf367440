use glam::{Mat3, Vec3};

/// The type of collision shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Sphere,
    Plane,
}

/// A collision shape that can be attached to rigid bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// A sphere defined by its radius
    Sphere(Sphere),
    /// An infinite half-space; the outward normal is the body's local +Z axis
    Plane,
}

impl Shape {
    /// Creates a sphere shape
    #[inline]
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(Sphere::new(radius))
    }

    /// Creates a plane shape
    #[inline]
    pub fn plane() -> Self {
        Self::Plane
    }

    /// Returns the shape type
    #[inline]
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Sphere(_) => ShapeType::Sphere,
            Shape::Plane => ShapeType::Plane,
        }
    }

    /// Computes mass properties for a body of the given total mass.
    ///
    /// Planes are unbounded and always report zero mass.
    #[inline]
    pub fn mass_properties(&self, mass: f32) -> MassProperties {
        match self {
            Shape::Sphere(s) => s.mass_properties(mass),
            Shape::Plane => MassProperties::ZERO,
        }
    }

    /// Radius of the bounding sphere (infinite for planes)
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Sphere(s) => s.radius,
            Shape::Plane => f32::INFINITY,
        }
    }
}

/// Local normal of a plane shape
pub const PLANE_LOCAL_NORMAL: Vec3 = Vec3::Z;

/// Mass properties of a shape
#[derive(Debug, Clone, Copy)]
pub struct MassProperties {
    /// Total mass
    pub mass: f32,
    /// Inertia tensor in local coordinates (diagonal for primitive shapes)
    pub inertia: Mat3,
}

impl MassProperties {
    /// Zero mass (static bodies)
    pub const ZERO: Self = Self {
        mass: 0.0,
        inertia: Mat3::ZERO,
    };

    /// Creates mass properties from mass and inertia diagonal
    #[inline]
    pub fn new(mass: f32, inertia_diagonal: Vec3) -> Self {
        Self {
            mass,
            inertia: Mat3::from_diagonal(inertia_diagonal),
        }
    }

    /// Returns the inverse mass (0 for infinite mass)
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Returns the inverse inertia tensor
    #[inline]
    pub fn inv_inertia(&self) -> Mat3 {
        if self.inertia.determinant().abs() > f32::EPSILON {
            self.inertia.inverse()
        } else {
            Mat3::ZERO
        }
    }
}

/// A sphere collision shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given radius
    #[inline]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Solid sphere inertia for the given mass
    #[inline]
    pub fn mass_properties(&self, mass: f32) -> MassProperties {
        let r = self.radius;
        let i = (2.0 / 5.0) * mass * r * r;
        MassProperties::new(mass, Vec3::splat(i))
    }

    pub fn volume(&self) -> f32 {
        (4.0 / 3.0) * std::f32::consts::PI * self.radius.powi(3)
    }
}
