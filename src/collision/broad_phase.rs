use crate::dynamics::RigidBody;

use super::contact::BodyHandle;

/// All-pairs broad phase.
///
/// Returns every pair of live, shaped bodies in which at least one body is
/// dynamic and awake.
pub fn naive_pairs(bodies: &[RigidBody]) -> Vec<(BodyHandle, BodyHandle)> {
    let mut pairs = Vec::new();

    for (i, body_a) in bodies.iter().enumerate() {
        if !body_a.handle.is_valid() || body_a.shape.is_none() {
            continue;
        }

        for body_b in &bodies[i + 1..] {
            if !body_b.handle.is_valid() || body_b.shape.is_none() {
                continue;
            }

            let a_active = body_a.is_dynamic() && body_a.is_awake;
            let b_active = body_b.is_dynamic() && body_b.is_awake;
            if !a_active && !b_active {
                continue;
            }

            pairs.push((body_a.handle, body_b.handle));
        }
    }

    pairs
}
