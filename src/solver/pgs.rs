use crate::collision::ContactPoint;
use crate::dynamics::RigidBody;
use crate::geometry::MaterialTable;

use super::contact_constraint::ContactConstraint;

/// Configuration for the constraint solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Maximum Gauss-Seidel iterations per step
    pub iterations: usize,
    /// Iteration stops once the summed impulse change drops below this
    pub tolerance: f32,
    /// Approach speed (m/s) below which restitution is ignored
    pub restitution_threshold: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            tolerance: 1e-7,
            restitution_threshold: 0.5,
        }
    }
}

/// Outcome of one solve
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolveStats {
    pub constraints: usize,
    pub iterations: usize,
    /// Summed absolute impulse change of the final iteration
    pub residual: f32,
}

/// Projected Gauss-Seidel constraint solver
#[derive(Debug, Default)]
pub struct PgsSolver {
    config: SolverConfig,
    constraints: Vec<ContactConstraint>,
}

impl PgsSolver {
    /// Creates a new PGS solver with the given configuration
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            constraints: Vec::new(),
        }
    }

    /// Builds velocity constraints for this step's contacts
    pub fn prepare(
        &mut self,
        contacts: &[ContactPoint],
        bodies: &[RigidBody],
        materials: &MaterialTable,
        dt: f32,
    ) {
        self.constraints.clear();

        for contact in contacts {
            let (Some(body_a), Some(body_b)) =
                (bodies.get(contact.body_a.index()), bodies.get(contact.body_b.index()))
            else {
                continue;
            };

            if !body_a.is_dynamic() && !body_b.is_dynamic() {
                continue;
            }

            let material = materials.resolve(body_a.material, body_b.material);
            self.constraints.push(ContactConstraint::new(
                contact,
                body_a,
                body_b,
                &material,
                self.config.restitution_threshold,
                dt,
            ));
        }
    }

    /// Iterates over all constraints until converged or out of iterations
    pub fn solve(&mut self, bodies: &mut [RigidBody]) -> SolveStats {
        let mut stats = SolveStats {
            constraints: self.constraints.len(),
            ..SolveStats::default()
        };

        if self.constraints.is_empty() {
            return stats;
        }

        let tolerance_sq = self.config.tolerance * self.config.tolerance;

        for _ in 0..self.config.iterations.max(1) {
            let mut delta_total = 0.0f32;

            for constraint in &mut self.constraints {
                let (body_a, body_b) = get_two_mut(bodies, constraint.body_a, constraint.body_b);
                delta_total += constraint.solve_normal(body_a, body_b).abs();
                delta_total += constraint.solve_friction(body_a, body_b);
            }

            stats.iterations += 1;
            stats.residual = delta_total;

            if delta_total * delta_total < tolerance_sq {
                break;
            }
        }

        stats
    }

    /// Constraints built by the last `prepare`
    pub fn constraints(&self) -> &[ContactConstraint] {
        &self.constraints
    }

    /// Returns the solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Sets the solver configuration
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }
}

/// Gets mutable references to two elements at different indices
fn get_two_mut(slice: &mut [RigidBody], a: usize, b: usize) -> (&mut RigidBody, &mut RigidBody) {
    assert!(a != b, "contact between a body and itself");
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::BodyHandle;
    use crate::dynamics::BodyType;
    use crate::geometry::Shape;
    use glam::Vec3;

    fn resting_pair() -> (Vec<RigidBody>, ContactPoint) {
        let mut ground = RigidBody::new().with_type(BodyType::Static).with_shape(Shape::plane());
        ground.handle = BodyHandle::new(0);

        let mut ball = RigidBody::new().with_mass(1.0).with_shape(Shape::sphere(1.0));
        ball.handle = BodyHandle::new(1);
        ball.position = Vec3::new(0.0, 0.99, 0.0);
        ball.linear_velocity = Vec3::new(0.0, -0.2, 0.0);

        let contact = ContactPoint {
            body_a: ball.handle,
            body_b: ground.handle,
            point_a: Vec3::new(0.0, -0.01, 0.0),
            point_b: Vec3::ZERO,
            normal: Vec3::NEG_Y,
            depth: 0.01,
        };

        (vec![ground, ball], contact)
    }

    #[test]
    fn test_solver_creation() {
        let solver = PgsSolver::default();
        assert_eq!(solver.config().iterations, 10);
        assert!(solver.constraints().is_empty());
    }

    #[test]
    fn test_prepare_constraints() {
        let (bodies, contact) = resting_pair();
        let mut solver = PgsSolver::default();

        solver.prepare(&[contact], &bodies, &MaterialTable::default(), 1.0 / 60.0);

        assert_eq!(solver.constraints().len(), 1);
        assert_eq!(solver.constraints()[0].body_a, 1);
    }

    #[test]
    fn test_solve_pushes_out_of_ground() {
        let (mut bodies, contact) = resting_pair();
        let mut solver = PgsSolver::new(SolverConfig {
            iterations: 7,
            tolerance: 0.1,
            ..SolverConfig::default()
        });

        solver.prepare(&[contact], &bodies, &MaterialTable::default(), 1.0 / 60.0);
        let stats = solver.solve(&mut bodies);

        assert_eq!(stats.constraints, 1);
        assert!(stats.iterations >= 1 && stats.iterations <= 7);
        assert!(bodies[1].linear_velocity.y > 0.0, "vy = {}", bodies[1].linear_velocity.y);
        assert_eq!(bodies[0].linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_zero_tolerance_runs_every_iteration() {
        let (mut bodies, contact) = resting_pair();
        let mut solver = PgsSolver::new(SolverConfig {
            iterations: 7,
            tolerance: 0.0,
            ..SolverConfig::default()
        });

        solver.prepare(&[contact], &bodies, &MaterialTable::default(), 1.0 / 60.0);

        assert_eq!(solver.solve(&mut bodies).iterations, 7);
    }

    #[test]
    fn test_empty_solve_is_noop() {
        let mut solver = PgsSolver::default();
        let mut bodies = Vec::new();
        assert_eq!(solver.solve(&mut bodies), SolveStats::default());
    }
}
