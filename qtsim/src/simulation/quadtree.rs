//! # Rebalancing Quadtree (2D)
//!
//! This module implements the spatial index that keeps collision detection
//! sub-quadratic. The tree persists across ticks and is repaired
//! incrementally as particles move.
//!
//! ## Core Concepts
//!
//! - The arena is recursively subdivided into 4 regions (quadrants).
//! - Each region is a node of the tree. A node is either a leaf or has all
//!   four children, never a partial split.
//! - Membership is recorded top-down: a particle is listed in its leaf *and*
//!   in every ancestor of that leaf. The root's list is therefore the full
//!   particle set, which is what [`Quadtree::query`] and [`Quadtree::count`]
//!   return.
//! - Collisions are only looked for between particles of the same leaf.
//!
//! ## Per-tick pass ([`Quadtree::advance`])
//!
//! 1. Collect particles whose center has left their leaf (displaced).
//! 2. Remove each from every region and insert it again from the root.
//! 3. Split crowded leaves, collapse thinned-out subtrees.
//! 4. Resolve overlapping pairs inside every leaf.
//!
//! Nodes live in a flat `Vec` and refer to their children by index; there
//! are no parent links. Nodes freed by a collapse are recycled by later splits.

use std::ops::AddAssign;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::simulation::collision::{resolve_pairs, CollisionResponse, ProjectionResponse};
use crate::simulation::params::Parameters;
use crate::simulation::region::Rect;
use crate::simulation::states::{Particle, ParticleId, ParticleSlab};

/// A single quadtree node.
///
/// Each node represents a rectangular region and stores the ids of every
/// particle whose center lies inside it. `children` is either `None` (leaf)
/// or the indices of all four quadrants, in [`Rect::quadrant`] order.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub rect: Rect,
    pub depth: u32,
    pub children: Option<[usize; 4]>, // indices into Quadtree::nodes
    pub members: Vec<ParticleId>,
}

impl QuadNode {
    fn new(rect: Rect, depth: u32) -> Self {
        Self {
            rect,
            depth,
            children: None,
            members: Vec::new(),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Counters describing what one [`Quadtree::advance`] call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub displaced: usize,  // particles that left their leaf and were re-homed
    pub returned: usize,   // strays that came back inside the arena
    pub strayed: usize,    // displaced particles that ended up outside the arena
    pub splits: usize,     // leaves subdivided
    pub collapses: usize,  // subtrees folded back into a leaf
    pub resolved: usize,   // overlapping pairs whose velocities were rewritten
    pub coincident: usize, // overlapping pairs skipped for coincident centers
}

impl AddAssign for TickStats {
    fn add_assign(&mut self, rhs: Self) {
        self.displaced += rhs.displaced;
        self.returned += rhs.returned;
        self.strayed += rhs.strayed;
        self.splits += rhs.splits;
        self.collapses += rhs.collapses;
        self.resolved += rhs.resolved;
        self.coincident += rhs.coincident;
    }
}

/// The spatial index: owns the region tree and the particles in it.
pub struct Quadtree {
    nodes: Vec<QuadNode>,
    free: Vec<usize>, // recycled node indices
    root: usize,
    slab: ParticleSlab,
    strays: Vec<ParticleId>, // live particles whose center is outside the arena
    split_threshold: usize,
    max_depth: u32,
    response: Box<dyn CollisionResponse + Send + Sync>,
}

impl Quadtree {
    /// Create an empty tree covering `[0, width) x [0, height)`.
    ///
    /// Uses [`ProjectionResponse`] with its default divisor for collisions;
    /// see [`Quadtree::with_response`] to change that.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the arena is empty or the split threshold is 0.
    pub fn new(params: &Parameters) -> Result<Self> {
        if params.width == 0 || params.height == 0 {
            return Err(Error::InvalidParam("arena width and height must be > 0".into()));
        }
        if params.split_threshold == 0 {
            return Err(Error::InvalidParam("split_threshold must be > 0".into()));
        }

        let root = 0;
        let nodes = vec![QuadNode::new(Rect::arena(params.width, params.height), 0)];

        Ok(Self {
            nodes,
            free: Vec::new(),
            root,
            slab: ParticleSlab::new(),
            strays: Vec::new(),
            split_threshold: params.split_threshold,
            max_depth: params.max_depth,
            response: Box::new(ProjectionResponse::default()),
        })
    }

    /// Replace the collision response
    pub fn with_response<T>(mut self, response: T) -> Self
    where
        T: CollisionResponse + Send + Sync + 'static,
    {
        self.response = Box::new(response);
        self
    }

    pub fn bounds(&self) -> Rect {
        self.nodes[self.root].rect
    }

    pub fn split_threshold(&self) -> usize {
        self.split_threshold
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    // public operations ====================================================================

    /// Take ownership of `particle` and record it in every region containing
    /// its center, from the root down to a leaf.
    ///
    /// A particle whose center is outside the arena is still stored (and
    /// returned by [`Quadtree::particles_mut`]) but belongs to no region until
    /// it moves back inside; see [`Quadtree::strays`].
    pub fn insert(&mut self, particle: Particle) -> ParticleId {
        let id = self.slab.insert(particle);
        if !self.place(self.root, id) {
            warn!(id = id.index(), "inserted particle lies outside the arena");
            self.strays.push(id);
        }
        id
    }

    /// Erase `id` from every region (leaf or internal) and hand the particle
    /// back. Unknown or already removed ids are a no-op returning `None`.
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        if !self.slab.contains(id) {
            return None;
        }
        self.erase(self.root, id);
        self.strays.retain(|&s| s != id);
        self.slab.remove(id)
    }

    /// Per-tick entry point: re-home displaced particles, rebalance, then
    /// resolve collisions leaf by leaf.
    ///
    /// Call after the particles have been translated for this tick.
    pub fn advance(&mut self) -> TickStats {
        let mut stats = TickStats::default();

        // 1. displacement is only checked at leaves: a particle that left an
        //    ancestor has also left its leaf
        let displaced = self.find_displaced();
        let returning: Vec<ParticleId> = self
            .strays
            .iter()
            .copied()
            .filter(|&id| self.slab.get(id).is_some_and(|p| p.contains_center(&self.bounds())))
            .collect();

        // 2. re-home
        for &id in &displaced {
            self.erase(self.root, id);
            if !self.place(self.root, id) {
                self.strays.push(id);
                stats.strayed += 1;
            }
        }
        for &id in &returning {
            self.strays.retain(|&s| s != id);
            self.place(self.root, id);
        }
        stats.displaced = displaced.len();
        stats.returned = returning.len();

        // 3. split / collapse
        self.rebalance(self.root, &mut stats);

        // 4. collisions, leaves only
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match node.children {
                Some(children) => stack.extend(children.iter().rev()),
                None => {
                    let outcome = resolve_pairs(&mut self.slab, &node.members, &*self.response);
                    stats.resolved += outcome.resolved;
                    stats.coincident += outcome.coincident;
                }
            }
        }

        debug!(
            displaced = stats.displaced,
            returned = stats.returned,
            strayed = stats.strayed,
            splits = stats.splits,
            collapses = stats.collapses,
            resolved = stats.resolved,
            coincident = stats.coincident,
            "quadtree advanced"
        );

        stats
    }

    /// Ids in the root region: every particle inside the arena
    pub fn query(&self) -> &[ParticleId] {
        &self.nodes[self.root].members
    }

    /// Size of the root membership
    pub fn count(&self) -> usize {
        self.nodes[self.root].members.len()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slab.get(id)
    }

    /// Mutable access for the driver (translation, spawning tweaks).
    /// The tree is only brought up to date by the next [`Quadtree::advance`].
    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slab.get_mut(id)
    }

    /// Every live particle, strays included
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.slab.iter()
    }

    /// Every live particle, strays included
    pub fn particles_mut(&mut self) -> impl Iterator<Item = (ParticleId, &mut Particle)> {
        self.slab.iter_mut()
    }

    /// Number of live particles, strays included
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    /// Live particles that currently belong to no region
    pub fn strays(&self) -> &[ParticleId] {
        &self.strays
    }

    /// Borrowed view of the root region
    pub fn root(&self) -> RegionRef<'_> {
        RegionRef { tree: self, idx: self.root }
    }

    /// Depth-first (pre-order) list of every region rectangle with its depth,
    /// for drawing grid outlines
    pub fn outlines(&self) -> Vec<(Rect, u32)> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            out.push((node.rect, node.depth));
            if let Some(children) = node.children {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Regions currently in the tree
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.outlines_fold(0, |acc, node| acc + usize::from(node.is_leaf()))
    }

    /// Deepest level currently in the tree (root is 0)
    pub fn depth(&self) -> u32 {
        self.outlines_fold(0, |acc, node| acc.max(node.depth))
    }

    // helpers ==============================================================================

    fn outlines_fold<A>(&self, init: A, mut f: impl FnMut(A, &QuadNode) -> A) -> A {
        let mut acc = init;
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            acc = f(acc, node);
            if let Some(children) = node.children {
                stack.extend(children);
            }
        }
        acc
    }

    /// Record `id` in `node_idx` and below, if its center is inside.
    ///
    /// Returns whether the particle was recorded here. At most one child can
    /// contain the center, so the descent stops at the first that accepts it.
    fn place(&mut self, node_idx: usize, id: ParticleId) -> bool {
        let inside = self
            .slab
            .get(id)
            .is_some_and(|p| p.contains_center(&self.nodes[node_idx].rect));
        if !inside {
            return false;
        }

        self.nodes[node_idx].members.push(id);

        if let Some(children) = self.nodes[node_idx].children {
            for child in children {
                if self.place(child, id) {
                    break;
                }
            }
        }
        true
    }

    /// Remove `id` from `node_idx` and its whole subtree, regardless of where
    /// the particle is now (it may already have moved).
    fn erase(&mut self, node_idx: usize, id: ParticleId) {
        let members = &mut self.nodes[node_idx].members;
        if let Some(pos) = members.iter().position(|&m| m == id) {
            members.remove(pos);
        }

        if let Some(children) = self.nodes[node_idx].children {
            for child in children {
                self.erase(child, id);
            }
        }
    }

    /// Leaf members whose center no longer lies in their leaf, in
    /// depth-first order
    fn find_displaced(&self) -> Vec<ParticleId> {
        let mut displaced = Vec::new();
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match node.children {
                Some(children) => stack.extend(children.iter().rev()),
                None => displaced.extend(node.members.iter().copied().filter(|&id| {
                    self.slab
                        .get(id)
                        .is_some_and(|p| !p.contains_center(&node.rect))
                })),
            }
        }
        displaced
    }

    /// Split crowded leaves and collapse sparse subtrees, top-down.
    ///
    /// - occupancy >= threshold, leaf, depth < max depth: split, and do not
    ///   descend into the new children during this pass.
    /// - occupancy >= threshold, internal: recurse into the children.
    /// - occupancy < threshold, internal: drop the children. Their members
    ///   are already listed here, so nothing is lost.
    ///
    /// A leaf at max depth stays oversized.
    fn rebalance(&mut self, node_idx: usize, stats: &mut TickStats) {
        let node = &self.nodes[node_idx];
        let occupancy = node.members.len();
        let children = node.children;
        let depth = node.depth;

        if occupancy >= self.split_threshold {
            match children {
                None if depth < self.max_depth => {
                    self.subdivide(node_idx);
                    stats.splits += 1;
                }
                None => {}
                Some(children) => {
                    for child in children {
                        self.rebalance(child, stats);
                    }
                }
            }
        } else if children.is_some() {
            self.collapse(node_idx);
            stats.collapses += 1;
        }
    }

    /// Subdivide a leaf into 4 quadrants and hand each member to the one
    /// quadrant containing its center.
    ///
    /// Members are not duplicated further down here: each goes to exactly
    /// one child, one level below, unlike a fresh insert.
    fn subdivide(&mut self, node_idx: usize) {
        let rect = self.nodes[node_idx].rect;
        let depth = self.nodes[node_idx].depth + 1;

        let children = rect.quadrants().map(|q| self.alloc_node(q, depth));

        let members = self.nodes[node_idx].members.clone();
        for id in members {
            let Some(p) = self.slab.get(id) else {
                continue;
            };
            if let Some(&child) = children
                .iter()
                .find(|&&c| p.contains_center(&self.nodes[c].rect))
            {
                self.nodes[child].members.push(id);
            }
        }

        self.nodes[node_idx].children = Some(children);
    }

    /// Turn an internal node back into a leaf, recycling its whole subtree
    fn collapse(&mut self, node_idx: usize) {
        let Some(children) = self.nodes[node_idx].children.take() else {
            return;
        };
        let mut stack = children.to_vec();
        while let Some(idx) = stack.pop() {
            let node = &mut self.nodes[idx];
            if let Some(grandchildren) = node.children.take() {
                stack.extend(grandchildren);
            }
            node.members.clear();
            self.free.push(idx);
        }
    }

    fn alloc_node(&mut self, rect: Rect, depth: u32) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = QuadNode::new(rect, depth);
                idx
            }
            None => {
                self.nodes.push(QuadNode::new(rect, depth));
                self.nodes.len() - 1
            }
        }
    }
}

/// Read-only view of one region, for traversal and checks
#[derive(Clone, Copy)]
pub struct RegionRef<'a> {
    tree: &'a Quadtree,
    idx: usize,
}

impl<'a> RegionRef<'a> {
    fn node(&self) -> &'a QuadNode {
        &self.tree.nodes[self.idx]
    }

    pub fn rect(&self) -> Rect {
        self.node().rect
    }

    pub fn depth(&self) -> u32 {
        self.node().depth
    }

    pub fn members(&self) -> &'a [ParticleId] {
        &self.node().members
    }

    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// The four quadrants in [`Rect::quadrant`] order, or `None` for a leaf
    pub fn children(&self) -> Option<[RegionRef<'a>; 4]> {
        let tree = self.tree;
        self.node()
            .children
            .map(|c| c.map(|idx| RegionRef { tree, idx }))
    }

    /// Leaf (this region or below) whose rectangle contains `(x, y)`
    pub fn leaf_at(&self, x: f64, y: f64) -> Option<RegionRef<'a>> {
        if !self.rect().contains_point(x, y) {
            return None;
        }
        match self.children() {
            None => Some(*self),
            Some(children) => children.iter().find_map(|c| c.leaf_at(x, y)),
        }
    }
}
