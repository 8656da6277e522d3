//! Collision response for particles sharing a quadtree leaf
//!
//! Defines the [`CollisionResponse`] trait, the vector-projection response
//! used by the engine, and the pairwise pass run over one leaf at a time

use serde::Deserialize;
use tracing::trace;

use crate::simulation::states::{NVec2, Particle, ParticleId, ParticleSlab};

/// What the projection scalar is divided by
/// `collision: "norm"` or `collision: "norm_squared"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionDivisor {
    #[default]
    #[serde(rename = "norm")] // dot(relV, relP) / |relP|, the reference behaviour
    Norm,

    #[serde(rename = "norm_squared")] // dot(relV, relP) / |relP|^2, exact equal-mass elastic exchange
    NormSquared,
}

/// Trait for velocity responses to an overlapping pair.
/// Returns the new velocities of `(a, b)`, or `None` when the response is
/// undefined for this geometry (the pair is then left untouched)
pub trait CollisionResponse {
    fn respond(&self, a: &Particle, b: &Particle) -> Option<(NVec2, NVec2)>;
}

/// Equal-mass projection along the line of centers:
///
/// ```text
/// relV   = v1 - v2
/// relP   = p1 - p2
/// scalar = dot(relV, relP) / divisor(relP)
/// v1'    = v1 - scalar * relP
/// v2'    = v2 + scalar * relP
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionResponse {
    pub divisor: CollisionDivisor,
}

impl CollisionResponse for ProjectionResponse {
    fn respond(&self, a: &Particle, b: &Particle) -> Option<(NVec2, NVec2)> {
        let rel_v = a.v - b.v;
        let rel_p = a.x - b.x;

        let norm = rel_p.norm();
        let denom = match self.divisor {
            CollisionDivisor::Norm => norm,
            CollisionDivisor::NormSquared => norm * norm,
        };
        // coincident centers: no line of centers to project on
        if denom == 0.0 {
            return None;
        }

        let scalar = rel_v.dot(&rel_p) / denom;
        if !scalar.is_finite() {
            return None;
        }

        Some((a.v - scalar * rel_p, b.v + scalar * rel_p))
    }
}

/// Outcome of one leaf pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeafOutcome {
    pub resolved: usize,   // overlapping pairs whose velocities were rewritten
    pub coincident: usize, // overlapping pairs skipped because the response was undefined
}

/// Compare every unordered pair of `members` exactly once, in membership
/// order, and write back new velocities for overlapping pairs.
///
/// Velocities are updated in place, so a later pair in the same leaf sees
/// the result of an earlier one. Positions are never touched.
pub fn resolve_pairs<R>(slab: &mut ParticleSlab, members: &[ParticleId], response: &R) -> LeafOutcome
where
    R: CollisionResponse + ?Sized,
{
    let mut outcome = LeafOutcome::default();

    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            let (id_a, id_b) = (members[i], members[j]);

            let (Some(a), Some(b)) = (slab.get(id_a), slab.get(id_b)) else {
                continue;
            };
            if !a.overlaps(b) {
                continue;
            }

            match response.respond(a, b) {
                Some((va, vb)) => {
                    if let Some(a) = slab.get_mut(id_a) {
                        a.v = va;
                    }
                    if let Some(b) = slab.get_mut(id_b) {
                        b.v = vb;
                    }
                    outcome.resolved += 1;
                }
                None => {
                    trace!(a = id_a.index(), b = id_b.index(), "skipping pair with coincident centers");
                    outcome.coincident += 1;
                }
            }
        }
    }

    outcome
}
