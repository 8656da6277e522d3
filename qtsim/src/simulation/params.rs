//! Structural parameters for the quadtree
//!
//! `Parameters` holds:
//! - arena size (the root region is `[0, width) x [0, height)`),
//! - split threshold (leaf occupancy that triggers subdivision),
//! - max depth (hard cap on subdivision)

pub const DEFAULT_SPLIT_THRESHOLD: usize = 5;
pub const DEFAULT_MAX_DEPTH: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    pub width: u32, // arena width
    pub height: u32, // arena height
    pub split_threshold: usize, // split at occupancy >= this, collapse below it
    pub max_depth: u32, // regions at this depth never split
}

impl Parameters {
    /// Arena of the given size with the reference threshold (5) and depth (8)
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
