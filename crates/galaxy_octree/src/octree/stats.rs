//! Statistics reported by bulk builds and structural scans.

/// Statistics from a [`build_empty`](super::Octree::build_empty) run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
  /// Subdivision depth below the root.
  pub depth: u32,
  /// Number of tasks submitted to the executor (0 or 8).
  pub tasks: usize,
  /// Nodes created, root excluded.
  pub nodes_created: usize,
  /// Wall time of the whole build in microseconds.
  pub elapsed_us: u64,
}

impl BuildStats {
  /// Leaf count of a full tree of this depth (8^depth), `None` when it does
  /// not fit in a `usize`.
  #[inline]
  pub fn expected_leaves(&self) -> Option<usize> {
    8usize.checked_pow(self.depth)
  }
}

/// Structural snapshot of an octree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OctreeStats {
  /// Existing nodes, root included.
  pub nodes: usize,
  /// Nodes without children.
  pub leaves: usize,
  /// Stored points across all nodes.
  pub points: usize,
  /// Attached links across all nodes.
  pub links: usize,
  /// Depth of the deepest existing node.
  pub deepest: u32,
}

impl OctreeStats {
  /// Nodes with children.
  #[inline]
  pub fn interior(&self) -> usize {
    self.nodes - self.leaves
  }
}
