//! Nearest-hit selection over per-triangle outcomes.
//!
//! The scan order is part of the contract: indices are visited from last to
//! first and a candidate must be strictly nearer than the best so far. When
//! several triangles share the minimal distance the highest index wins.
//! A forward scan or a `<=` comparison would pick a different triangle on
//! ties (and a different normal on shared edges).

use crate::dispatch::TriangleOutcome;
use crate::{MeshRaycastResult, Ray};

/// Index of the nearest valid outcome, or `None` if every triangle missed.
///
/// Outcomes with `distance >= miss_distance` are misses.
pub fn nearest_hit(outcomes: &[TriangleOutcome], miss_distance: f64) -> Option<usize> {
    let mut best = f64::INFINITY;
    let mut best_index = None;

    for (index, outcome) in outcomes.iter().enumerate().rev() {
        if outcome.distance >= miss_distance {
            continue;
        }
        if outcome.distance < best {
            best = outcome.distance;
            best_index = Some(index);
        }
    }

    best_index
}

/// Reduce outcomes to the caller-facing result.
pub fn resolve(ray: &Ray, outcomes: &[TriangleOutcome], miss_distance: f64) -> MeshRaycastResult {
    match nearest_hit(outcomes, miss_distance) {
        Some(index) => {
            let outcome = outcomes[index];
            MeshRaycastResult::new(ray.at(outcome.distance), outcome.normal, outcome.distance)
        }
        None => MeshRaycastResult::miss(),
    }
}
