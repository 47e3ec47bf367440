mod contact_constraint;
mod pgs;

pub use contact_constraint::{ContactConstraint, Spook};
pub use pgs::{PgsSolver, SolveStats, SolverConfig};
