//! High-level runtime engine settings
//!
//! Selects the collision divisor and how long / how chattily a headless run
//! goes when driven by the binary

use crate::simulation::collision::CollisionDivisor;

#[derive(Debug, Clone)]
pub struct Engine {
    pub collision: CollisionDivisor, // norm (reference) or norm_squared
    pub ticks: u64, // ticks to run
    pub report_every: u64, // log a summary every n ticks, 0 = never
}
