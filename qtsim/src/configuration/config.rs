//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`ArenaConfig`]    – size of the bounded arena (the quadtree root)
//! - [`TreeConfig`]     – split threshold and max depth of the quadtree
//! - [`EngineConfig`]   – collision divisor, run length, log cadence
//! - [`SpawnConfig`]    – optional random particles placed at start-up
//! - [`ParticleConfig`] – optional explicit particles
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example scenario matching these types:
//!
//! ```yaml
//! arena:
//!   width: 800
//!   height: 600
//!
//! tree:
//!   split_threshold: 5      # split a leaf at >= 5 particles
//!   max_depth: 8            # never split below depth 8
//!
//! engine:
//!   collision: "norm"       # or "norm_squared"
//!   ticks: 600
//!   report_every: 60
//!
//! spawn:
//!   count: 500
//!   radius: 5
//!   max_speed: 4
//!   seed: 42                # omit for a nondeterministic run
//!
//! particles:
//!   - radius: 5
//!     x: [ 100.0, 100.0 ]
//!     v: [   1.0,   0.0 ]
//! ```
//!
//! Only `arena` is required. The engine maps this configuration into its
//! runtime [`Scenario`](crate::simulation::scenario::Scenario).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::collision::CollisionDivisor;
use crate::simulation::params::{DEFAULT_MAX_DEPTH, DEFAULT_SPLIT_THRESHOLD};

/// Arena extent; the root region is `[0, width) x [0, height)`
#[derive(Deserialize, Debug, Clone)]
pub struct ArenaConfig {
    pub width: u32,
    pub height: u32,
}

/// Quadtree shape limits
#[derive(Deserialize, Debug, Clone)]
pub struct TreeConfig {
    #[serde(default = "default_split_threshold")]
    pub split_threshold: usize, // occupancy that triggers a split
    #[serde(default = "default_max_depth")]
    pub max_depth: u32, // regions at this depth never split
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub collision: CollisionDivisor, // divisor used by the projection response
    #[serde(default = "default_ticks")]
    pub ticks: u64, // number of ticks a headless run performs
    #[serde(default)]
    pub report_every: u64, // log a summary every n ticks, 0 = only at the end
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collision: CollisionDivisor::default(),
            ticks: default_ticks(),
            report_every: 0,
        }
    }
}

/// Random particles created when the scenario is built
#[derive(Deserialize, Debug, Clone)]
pub struct SpawnConfig {
    pub count: usize, // particles placed at start-up
    #[serde(default = "default_radius")]
    pub radius: u32, // radius of every spawned particle
    #[serde(default = "default_max_speed")]
    pub max_speed: u32, // velocity components drawn from [-max_speed, max_speed]
    pub seed: Option<u64>, // deterministic seed to make runs reproducible
}

/// Configuration for a single particle's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct ParticleConfig {
    pub radius: u32, // radius, fixed for the particle's lifetime
    pub x: Vec<f64>, // initial center [x, y]
    #[serde(default)]
    pub v: Vec<f64>, // initial velocity [dx, dy], zero if omitted
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub arena: ArenaConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    pub spawn: Option<SpawnConfig>,
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn default_split_threshold() -> usize {
    DEFAULT_SPLIT_THRESHOLD
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_ticks() -> u64 {
    600
}

fn default_radius() -> u32 {
    5
}

fn default_max_speed() -> u32 {
    4
}
