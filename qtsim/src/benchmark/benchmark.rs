use std::time::Instant;

use crate::error::Result;
use crate::simulation::integrator::reflect_and_drift;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::Quadtree;
use crate::simulation::states::Particle;

const ARENA: u32 = 2000;
const RADIUS: u32 = 3;

/// Deterministic particle `i` of a benchmark set, no rand needed
fn bench_particle(i: usize) -> Result<Particle> {
    let i_f = i as f64;
    let half = f64::from(ARENA) * 0.5;
    let x = half + (i_f * 0.37).sin() * (half - 10.0);
    let y = half + (i_f * 0.13).cos() * (half - 10.0);
    let dx = (i_f * 0.07).sin() * 3.0;
    let dy = (i_f * 0.11).cos() * 3.0;
    Particle::new(RADIUS, x, y, dx, dy)
}

/// Helper to build a populated tree of size `n`
fn make_tree(n: usize) -> Result<Quadtree> {
    let mut tree = Quadtree::new(&Parameters::new(ARENA, ARENA))?;
    for i in 0..n {
        tree.insert(bench_particle(i)?);
    }
    // settle the initial splits so timing covers steady-state ticks
    for _ in 0..10 {
        tree.advance();
    }
    Ok(tree)
}

/// Brute-force overlap count over every pair, the baseline the tree avoids
fn all_pairs_overlaps(particles: &[Particle]) -> usize {
    let mut hits = 0;
    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            if particles[i].overlaps(&particles[j]) {
                hits += 1;
            }
        }
    }
    hits
}

/// Time one quadtree tick against one all-pairs overlap scan for a range of n.
/// Paste output directly into a spreadsheet to graph
pub fn bench_advance() -> Result<()> {
    let ns = [250, 500, 1000, 2000, 4000, 8000];
    let steps = 5;

    println!("N,tree_tick_ms,all_pairs_ms,leaves,depth");

    for n in ns {
        let mut tree = make_tree(n)?;

        let t0 = Instant::now();
        for _ in 0..steps {
            reflect_and_drift(&mut tree, ARENA, ARENA);
            tree.advance();
        }
        let tree_ms = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let particles: Vec<Particle> = tree.particles().map(|(_, p)| p.clone()).collect();
        let t1 = Instant::now();
        let hits = all_pairs_overlaps(&particles);
        let pairs_ms = t1.elapsed().as_secs_f64() * 1000.0;

        println!(
            "{},{:.6},{:.6},{},{}",
            n,
            tree_ms,
            pairs_ms,
            tree.leaf_count(),
            tree.depth()
        );
        tracing::debug!(n, hits, "all-pairs overlaps");
    }

    Ok(())
}
