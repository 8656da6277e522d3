//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! containing:
//! - engine settings (`Engine`)
//! - tree parameters (`Parameters`)
//! - the quadtree, already holding the initial particles
//! - the seeded RNG and spawn settings used for later random spawns

use rand::rngs::StdRng;
use rand::{rng, Rng, SeedableRng};
use tracing::info;

use crate::configuration::config::{ParticleConfig, ScenarioConfig};
use crate::error::{Error, Result};
use crate::simulation::collision::ProjectionResponse;
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::Quadtree;
use crate::simulation::states::{Particle, ParticleId};

/// Radius and speed range of randomly spawned particles
#[derive(Debug, Clone, Copy)]
pub struct Spawner {
    pub radius: u32,
    pub max_speed: u32,
}

impl Default for Spawner {
    fn default() -> Self {
        Self { radius: 5, max_speed: 4 }
    }
}

/// Runtime bundle constructed from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub tree: Quadtree,
    pub spawner: Spawner,
    rng: StdRng,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Parameters (runtime) from arena + tree config
        let parameters = Parameters {
            width: cfg.arena.width,
            height: cfg.arena.height,
            split_threshold: cfg.tree.split_threshold,
            max_depth: cfg.tree.max_depth,
        };

        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let engine = Engine {
            collision: e_cfg.collision,
            ticks: e_cfg.ticks,
            report_every: e_cfg.report_every,
        };

        let tree = Quadtree::new(&parameters)?.with_response(ProjectionResponse {
            divisor: engine.collision,
        });

        let (spawner, seed, count) = match &cfg.spawn {
            Some(s) => (
                Spawner {
                    radius: s.radius,
                    max_speed: s.max_speed,
                },
                s.seed,
                s.count,
            ),
            None => (Spawner::default(), None, 0),
        };

        let rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let mut scenario = Self {
            engine,
            parameters,
            tree,
            spawner,
            rng,
        };

        // Explicit particles first, then random ones
        let bounds = scenario.tree.bounds();
        for pc in &cfg.particles {
            let particle = particle_from_config(pc)?;
            if !particle.contains_center(&bounds) {
                return Err(Error::OutOfBounds(format!(
                    "particle at ({}, {}) starts outside the {}x{} arena",
                    particle.x.x, particle.x.y, bounds.width(), bounds.height()
                )));
            }
            scenario.tree.insert(particle);
        }
        for _ in 0..count {
            scenario.spawn_random()?;
        }

        info!(
            width = scenario.parameters.width,
            height = scenario.parameters.height,
            particles = scenario.tree.count(),
            "scenario built"
        );

        Ok(scenario)
    }

    /// Insert one particle at a random integer position with a random
    /// integer velocity.
    ///
    /// Centers are drawn from `[0, width - 2r) x [0, height - 2r)`, velocity
    /// components from `[-max_speed, max_speed]`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the arena is not wider and taller than `2r`.
    pub fn spawn_random(&mut self) -> Result<ParticleId> {
        let r = i64::from(self.spawner.radius);
        let span_x = i64::from(self.parameters.width) - 2 * r;
        let span_y = i64::from(self.parameters.height) - 2 * r;
        if span_x <= 0 || span_y <= 0 {
            return Err(Error::InvalidParam(format!(
                "arena {}x{} too small to spawn particles of radius {}",
                self.parameters.width, self.parameters.height, r
            )));
        }

        let s = i64::from(self.spawner.max_speed);
        let x = self.rng.random_range(0..span_x) as f64;
        let y = self.rng.random_range(0..span_y) as f64;
        let dx = self.rng.random_range(-s..=s) as f64;
        let dy = self.rng.random_range(-s..=s) as f64;

        let particle = Particle::new(self.spawner.radius, x, y, dx, dy)?;
        Ok(self.tree.insert(particle))
    }
}

fn particle_from_config(pc: &ParticleConfig) -> Result<Particle> {
    let [x, y] = pc.x[..] else {
        return Err(Error::InvalidParam(format!(
            "particle position needs 2 components, got {}",
            pc.x.len()
        )));
    };
    let (dx, dy) = match pc.v[..] {
        [] => (0.0, 0.0),
        [dx, dy] => (dx, dy),
        _ => {
            return Err(Error::InvalidParam(format!(
                "particle velocity needs 2 components, got {}",
                pc.v.len()
            )))
        }
    };
    Particle::new(pc.radius, x, y, dx, dy)
}
