mod broad_phase;
mod contact;
mod narrow_phase;

pub use broad_phase::naive_pairs;
pub use contact::{BodyHandle, ContactPoint};
pub use narrow_phase::collide;
