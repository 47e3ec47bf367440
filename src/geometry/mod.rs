mod material;
mod shape;

pub use material::{ContactMaterial, Material, MaterialId, MaterialTable};
pub use shape::{MassProperties, Shape, ShapeType, Sphere, PLANE_LOCAL_NORMAL};
