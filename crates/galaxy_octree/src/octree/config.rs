//! OctreeConfig - root cube, depth limit and deletion pruning policy.

use glam::Vec3;

use super::Cube;

/// Depth limit used when none is given.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// How far pruning reaches after a point is deleted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PruneStrategy {
  /// Collapse only the node the point was removed from.
  #[default]
  SingleNode,
  /// Also collapse every ancestor that becomes empty, bottom-up.
  AncestorChain,
}

/// Configuration for building an [`Octree`](super::Octree).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OctreeConfig {
  /// Center of the root cube.
  pub center: Vec3,

  /// Half-extent of the root cube.
  pub radius: f32,

  /// Depth at which points are stored (root = 0).
  pub max_depth: u32,

  /// Pruning policy applied after deletions.
  pub prune: PruneStrategy,
}

impl OctreeConfig {
  /// Config for a root cube with default depth and pruning.
  pub fn new(center: Vec3, radius: f32) -> Self {
    Self {
      center,
      radius,
      ..Default::default()
    }
  }

  /// Set the storage depth.
  pub fn with_max_depth(mut self, max_depth: u32) -> Self {
    self.max_depth = max_depth;
    self
  }

  /// Set the pruning policy.
  pub fn with_prune(mut self, prune: PruneStrategy) -> Self {
    self.prune = prune;
    self
  }

  /// Check the root radius is usable.
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.radius.is_finite() && self.radius > 0.0
  }

  /// Root cube described by this config.
  #[inline]
  pub fn root_bounds(&self) -> Cube {
    Cube::new(self.center, self.radius)
  }

  /// Half-extent of nodes at the given depth.
  /// node_radius = radius / 2^depth
  #[inline]
  pub fn node_radius(&self, depth: u32) -> f32 {
    self.radius * 0.5f32.powi(depth as i32)
  }

  /// Half-extent of the nodes points are stored in.
  #[inline]
  pub fn storage_radius(&self) -> f32 {
    self.node_radius(self.max_depth)
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      center: Vec3::ZERO,
      radius: 1.0,
      max_depth: DEFAULT_MAX_DEPTH,
      prune: PruneStrategy::SingleNode,
    }
  }
}

/// Bulk-build depth for a target leaf half-extent.
///
/// depth = ceil(log2(root_radius / leaf_radius)), never below 0.
#[inline]
pub fn required_depth(root_radius: f32, leaf_radius: f32) -> u32 {
  let depth = (root_radius / leaf_radius).log2().ceil();
  if depth > 0.0 {
    depth as u32
  } else {
    0
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
