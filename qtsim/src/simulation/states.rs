//! Core state types for the particle arena.
//!
//! - `Particle` : a moving circle (integer radius, real position/velocity)
//! - `ParticleId`: stable handle handed out by the quadtree on insert
//!
//! Positions and velocities use `NVec2` (nalgebra) so the collision math can
//! stay in vector form.

use nalgebra::Vector2;

use crate::error::{Error, Result};
use crate::simulation::region::Rect;

pub type NVec2 = Vector2<f64>;

/// Handle to a particle owned by a [`Quadtree`](crate::simulation::quadtree::Quadtree)
///
/// A slot index plus the generation of that slot, so an id kept after its
/// particle was removed never aliases a later particle reusing the slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId {
    index: usize,
    generation: u32,
}

impl ParticleId {
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    radius: u32, // fixed at construction
    pub x: NVec2, // position
    pub v: NVec2, // velocity
}

impl Particle {
    /// Create a particle after validating it.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` is zero or any component is NaN/inf.
    pub fn new(radius: u32, x: f64, y: f64, dx: f64, dy: f64) -> Result<Self> {
        if radius == 0 {
            return Err(Error::InvalidParam("radius must be > 0".into()));
        }
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !dx.is_finite() || !dy.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            radius,
            x: NVec2::new(x, y),
            v: NVec2::new(dx, dy),
        })
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Center x rounded to the nearest integer (half away from zero)
    #[inline]
    pub fn rounded_x(&self) -> i64 {
        self.x.x.round() as i64
    }

    /// Center y rounded to the nearest integer (half away from zero)
    #[inline]
    pub fn rounded_y(&self) -> i64 {
        self.x.y.round() as i64
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = NVec2::new(x, y);
    }

    pub fn set_velocity(&mut self, dx: f64, dy: f64) {
        self.v = NVec2::new(dx, dy);
    }

    /// True iff the center lies in the half-open rectangle `[low, high)`.
    ///
    /// Radius is ignored so that at any single depth a particle belongs to
    /// exactly one of the four sibling quadrants.
    #[inline]
    pub fn contains_center(&self, rect: &Rect) -> bool {
        rect.contains_point(self.x.x, self.x.y)
    }

    /// Axis-aligned overlap test on the rounded centers.
    ///
    /// Two particles overlap when their rounded centers are within the sum of
    /// both radii on *both* axes (bound inclusive). This is a box test, so
    /// diagonal near-misses report an overlap. Comparing a particle with
    /// itself is always false.
    pub fn overlaps(&self, other: &Particle) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        let reach = u64::from(self.radius) + u64::from(other.radius);
        let dx = self.rounded_x().abs_diff(other.rounded_x());
        let dy = self.rounded_y().abs_diff(other.rounded_y());
        dx <= reach && dy <= reach
    }

    /// Translate by one tick: x += v
    #[inline]
    pub fn advance(&mut self) {
        self.x += self.v;
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    particle: Option<Particle>,
}

/// Generational storage for live particles, addressed by [`ParticleId`]
#[derive(Debug, Clone, Default)]
pub struct ParticleSlab {
    slots: Vec<Slot>,
    vacant: Vec<usize>, // indices of empty slots, reused LIFO
    live: usize,
}

impl ParticleSlab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, particle: Particle) -> ParticleId {
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.particle = Some(particle);
                ParticleId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Slot { generation: 0, particle: Some(particle) });
                ParticleId { index, generation: 0 }
            }
        }
    }

    /// Take the particle out; `None` for ids that are not live
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let particle = slot.particle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(id.index);
        self.live -= 1;
        Some(particle)
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.particle.as_ref())
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.particle.as_mut())
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.slots.iter().enumerate().filter_map(|(index, s)| {
            s.particle
                .as_ref()
                .map(|p| (ParticleId { index, generation: s.generation }, p))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParticleId, &mut Particle)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, s)| {
            let generation = s.generation;
            s.particle
                .as_mut()
                .map(|p| (ParticleId { index, generation }, p))
        })
    }
}
