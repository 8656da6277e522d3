pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Particle, ParticleId, ParticleSlab, NVec2};
pub use simulation::region::Rect;
pub use simulation::quadtree::{Quadtree, QuadNode, RegionRef, TickStats};
pub use simulation::collision::{CollisionDivisor, CollisionResponse, ProjectionResponse};
pub use simulation::params::Parameters;
pub use simulation::integrator::{reflect_and_drift, step, run};
pub use simulation::scenario::{Scenario, Spawner};

pub use configuration::config::{ArenaConfig, TreeConfig, EngineConfig, SpawnConfig, ParticleConfig, ScenarioConfig};

pub use benchmark::benchmark::bench_advance;

pub use error::{Error, Result};
