//! Fixed-step driver for the particle arena
//!
//! One tick: bounce particles off the arena walls, translate them by their
//! velocity, then let the quadtree re-home, rebalance and collide

use tracing::info;

use crate::simulation::quadtree::{Quadtree, TickStats};
use crate::simulation::scenario::Scenario;

/// Negate velocity components that would carry a particle's radius-expanded
/// bounds out of the arena on the next move, then translate every particle.
///
/// The test uses the rounded center, as the renderer sees it. On x the
/// particle may touch `width`; on y it must stay strictly below `height`.
pub fn reflect_and_drift(tree: &mut Quadtree, width: u32, height: u32) {
    let (w, h) = (f64::from(width), f64::from(height));

    for (_, p) in tree.particles_mut() {
        let r = f64::from(p.radius());
        let next_x = p.rounded_x() as f64 + p.v.x;
        let next_y = p.rounded_y() as f64 + p.v.y;

        if next_x + r > w || next_x - r < 0.0 {
            p.v.x = -p.v.x;
        }
        if next_y + r >= h || next_y - r < 0.0 {
            p.v.y = -p.v.y;
        }

        p.advance();
    }
}

/// Advance the scenario by one tick
pub fn step(scenario: &mut Scenario) -> TickStats {
    // Split &mut Scenario into &mut fields in one destructuring step
    let Scenario {
        tree,
        parameters,
        ..
    } = &mut *scenario;

    reflect_and_drift(tree, parameters.width, parameters.height);
    tree.advance()
}

/// Run `ticks` steps, logging a summary every `engine.report_every` ticks.
/// Returns the counters summed over the whole run
pub fn run(scenario: &mut Scenario, ticks: u64) -> TickStats {
    let mut total = TickStats::default();
    let every = scenario.engine.report_every;

    for tick in 1..=ticks {
        let s = step(scenario);
        total += s;

        if every > 0 && tick % every == 0 {
            info!(
                tick,
                particles = scenario.tree.count(),
                leaves = scenario.tree.leaf_count(),
                depth = scenario.tree.depth(),
                collisions = s.resolved,
                "tick"
            );
        }
    }

    total
}
