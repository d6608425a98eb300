//! Octree - owns the root node and runs every recursive algorithm.
//!
//! Points live at nodes of depth `max_depth`. Insertion grows the tree lazily,
//! one generation of 8 children at a time; [`Octree::build_empty`] grows it
//! eagerly, fanning out one task per root child.
//!
//! All operations except `build_empty` are single-threaded. Mutation goes
//! through `&mut self`, so concurrent callers need their own lock around the
//! tree.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use web_time::Instant;

use super::config::{required_depth, OctreeConfig, PruneStrategy};
use super::node::OctreeNode;
use super::stats::{BuildStats, OctreeStats};
use crate::error::OctreeError;
use crate::threading::{RayonExecutor, SubmitExt, TaskError, TaskExecutor};

/// Octree over a cubic region, generic over the link handle type `L`.
pub struct Octree<L = ()> {
  root: Box<OctreeNode<L>>,
  max_depth: u32,
  prune: PruneStrategy,
  executor: Arc<dyn TaskExecutor>,
}

impl<L> Octree<L> {
  /// Create an octree around the given cube, building on rayon's global
  /// pool.
  ///
  /// A negative or non-finite radius is clamped to 0, which yields a tree
  /// holding only its center point. Use [`from_config`](Self::from_config)
  /// to reject such radii instead.
  pub fn new(center: Vec3, radius: f32, max_depth: u32) -> Self {
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    let config = OctreeConfig::new(center, radius).with_max_depth(max_depth);
    Self::assemble(config, Arc::new(RayonExecutor::new()))
  }

  /// Create an octree from a config, building on rayon's global pool.
  pub fn from_config(config: OctreeConfig) -> Result<Self, OctreeError> {
    Self::with_executor(config, Arc::new(RayonExecutor::new()))
  }

  /// Create an octree that submits bulk-build work to `executor`.
  pub fn with_executor(
    config: OctreeConfig,
    executor: Arc<dyn TaskExecutor>,
  ) -> Result<Self, OctreeError> {
    if !config.is_valid() {
      return Err(OctreeError::InvalidRadius(config.radius));
    }
    Ok(Self::assemble(config, executor))
  }

  fn assemble(config: OctreeConfig, executor: Arc<dyn TaskExecutor>) -> Self {
    Self {
      root: Box::new(OctreeNode::new_root(config.center, config.radius)),
      max_depth: config.max_depth,
      prune: config.prune,
      executor,
    }
  }

  // ---------------------------------------------------------------------------
  // Accessors
  // ---------------------------------------------------------------------------

  /// Read-only root node.
  #[inline]
  pub fn root(&self) -> &OctreeNode<L> {
    &self.root
  }

  /// Depth at which points are stored.
  #[inline]
  pub fn max_depth(&self) -> u32 {
    self.max_depth
  }

  /// Current pruning policy.
  #[inline]
  pub fn prune_strategy(&self) -> PruneStrategy {
    self.prune
  }

  /// Change the pruning policy for subsequent deletions.
  pub fn set_prune_strategy(&mut self, prune: PruneStrategy) {
    self.prune = prune;
  }

  /// Configuration equivalent to this tree's parameters.
  pub fn config(&self) -> OctreeConfig {
    OctreeConfig {
      center: self.root.center(),
      radius: self.root.radius(),
      max_depth: self.max_depth,
      prune: self.prune,
    }
  }

  // ---------------------------------------------------------------------------
  // Bulk build
  // ---------------------------------------------------------------------------

  /// Subdivide the whole tree down to nodes of `leaf_radius`, storing no
  /// points.
  ///
  /// Depth is `ceil(log2(root_radius / leaf_radius))`. Each of the root's 8
  /// subtrees is built by one task on the executor; this call blocks until
  /// all 8 are joined. Existing children of the root are replaced.
  ///
  /// If any task fails the root is left without children and the failure is
  /// returned.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "octree::build_empty"))]
  pub fn build_empty(&mut self, leaf_radius: f32) -> Result<BuildStats, OctreeError>
  where
    L: Send + 'static,
  {
    if !(leaf_radius.is_finite() && leaf_radius > 0.0) {
      return Err(OctreeError::InvalidLeafRadius(leaf_radius));
    }

    let start = Instant::now();
    let depth = required_depth(self.root.radius(), leaf_radius);
    let mut stats = BuildStats {
      depth,
      ..Default::default()
    };

    if depth == 0 || self.root.radius() <= leaf_radius {
      stats.elapsed_us = start.elapsed().as_micros() as u64;
      return Ok(stats);
    }

    // Fan out: one task per root child, deeper levels stay on that task.
    let executor: &dyn TaskExecutor = &*self.executor;
    let handles: Vec<_> = self
      .root
      .make_children()
      .into_iter()
      .map(|mut child| {
        executor.submit(move || {
          let created = child.build_subtree(leaf_radius, depth - 1);
          (child, created)
        })
      })
      .collect();
    stats.tasks = handles.len();

    #[cfg(feature = "tracing")]
    tracing::debug!(depth, tasks = stats.tasks, "submitted subtree builds");

    // Join every handle, even after a failure.
    let mut children = Vec::with_capacity(handles.len());
    let mut failure: Option<TaskError> = None;
    for handle in handles {
      match handle.join() {
        Ok((child, created)) => {
          stats.nodes_created += created + 1;
          children.push(child);
        }
        Err(err) => {
          #[cfg(feature = "tracing")]
          tracing::warn!(error = %err, "subtree build task failed");
          failure.get_or_insert(err);
        }
      }
    }

    match (failure, <[Box<OctreeNode<L>>; 8]>::try_from(children)) {
      (None, Ok(children)) => self.root.set_children(children),
      (failure, _) => {
        self.root.clear_children();
        return Err(failure.unwrap_or(TaskError::Abandoned).into());
      }
    }

    stats.elapsed_us = start.elapsed().as_micros() as u64;

    #[cfg(feature = "tracing")]
    tracing::debug!(
      nodes = stats.nodes_created,
      elapsed_us = stats.elapsed_us,
      "empty tree built"
    );

    Ok(stats)
  }

  // ---------------------------------------------------------------------------
  // Point updates
  // ---------------------------------------------------------------------------

  /// Insert a point at depth `max_depth`, creating nodes along the way.
  ///
  /// Returns `false` when the point lies outside the root cube (or is NaN);
  /// the point is dropped in that case.
  pub fn insert(&mut self, point: Vec3) -> bool {
    let stored = insert_at(&mut self.root, point, self.max_depth);

    #[cfg(feature = "tracing")]
    if !stored {
      tracing::trace!(?point, "point outside octree bounds, dropped");
    }

    stored
  }

  /// Remove the first stored point exactly equal to `point`.
  ///
  /// Returns whether a point was removed. After a removal, empty nodes are
  /// collapsed according to the [`PruneStrategy`].
  pub fn delete(&mut self, point: Vec3) -> bool {
    delete_at(&mut self.root, point, self.max_depth, self.prune)
  }

  // ---------------------------------------------------------------------------
  // Queries
  // ---------------------------------------------------------------------------

  /// Stored points within `radius` of `point`, excluding `point` itself.
  pub fn query(&self, point: Vec3, radius: f32) -> Vec<Vec3> {
    let mut results = Vec::new();
    self.query_into(point, radius, &mut results);
    results
  }

  /// Like [`query`](Self::query), appending into `results`.
  ///
  /// Only nodes with children are visited; childless nodes are skipped.
  pub fn query_into(&self, point: Vec3, radius: f32, results: &mut Vec<Vec3>) {
    query_at(&self.root, point, radius, results);
  }

  /// First node in pre-order that contains `point` and satisfies `pred`.
  ///
  /// Every child is searched, not only the one holding `point`.
  pub fn find<P>(&self, point: Vec3, mut pred: P) -> Option<&OctreeNode<L>>
  where
    P: FnMut(&OctreeNode<L>) -> bool,
  {
    find_at(&self.root, point, &mut pred)
  }

  /// First node in pre-order that contains `point`.
  pub fn find_any(&self, point: Vec3) -> Option<&OctreeNode<L>> {
    self.find(point, |_| true)
  }

  /// Mutable variant of [`find`](Self::find), e.g. for attaching links.
  pub fn find_mut<P>(&mut self, point: Vec3, mut pred: P) -> Option<&mut OctreeNode<L>>
  where
    P: FnMut(&OctreeNode<L>) -> bool,
  {
    find_mut_at(&mut self.root, point, &mut pred)
  }

  /// Parent of a node belonging to this tree.
  ///
  /// Walks down from the root; `None` for the root or a foreign node.
  pub fn parent(&self, node: &OctreeNode<L>) -> Option<&OctreeNode<L>> {
    if node.depth() == 0 {
      return None;
    }

    let target = node.center();
    let mut current: &OctreeNode<L> = &self.root;
    while current.depth() + 1 < node.depth() {
      current = current.child(current.octant_of(target))?;
    }

    let child = current.child(node.octant()?)?;
    std::ptr::eq(child, node).then_some(current)
  }

  // ---------------------------------------------------------------------------
  // Traversal and accounting
  // ---------------------------------------------------------------------------

  /// Visit every node in pre-order, children in slot order 0..7.
  pub fn traverse<V>(&self, mut visitor: V)
  where
    V: FnMut(&OctreeNode<L>),
  {
    traverse_at(&self.root, &mut visitor);
  }

  /// Mutable variant of [`traverse`](Self::traverse).
  pub fn traverse_mut<V>(&mut self, mut visitor: V)
  where
    V: FnMut(&mut OctreeNode<L>),
  {
    traverse_mut_at(&mut self.root, &mut visitor);
  }

  /// Number of addressable leaf slots: valid childless nodes.
  pub fn capacity(&self) -> usize {
    capacity_at(&self.root)
  }

  /// Number of stored points across every node.
  pub fn size(&self) -> usize {
    size_at(&self.root)
  }

  /// Node, leaf, point and link counts in one pass.
  pub fn stats(&self) -> OctreeStats {
    let mut stats = OctreeStats::default();
    self.traverse(|node| {
      stats.nodes += 1;
      if node.is_leaf() {
        stats.leaves += 1;
      }
      stats.points += node.points().len();
      stats.links += node.links().len();
      stats.deepest = stats.deepest.max(node.depth());
    });
    stats
  }
}

impl<L> fmt::Debug for Octree<L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Octree")
      .field("bounds", &self.root.bounds())
      .field("max_depth", &self.max_depth)
      .field("prune", &self.prune)
      .field("threads", &self.executor.num_threads())
      .finish_non_exhaustive()
  }
}

// =============================================================================
// Recursive helpers
// =============================================================================

fn insert_at<L>(node: &mut OctreeNode<L>, point: Vec3, max_depth: u32) -> bool {
  if !node.contains(point) || node.depth() > max_depth {
    return false;
  }

  // Subdivide first, even at storage depth: the storage node keeps a
  // generation of children so queries descend into it.
  if node.is_leaf() {
    node.grow();
  }

  if node.depth() == max_depth {
    node.add_point(point);
    return true;
  }

  let octant = node.octant_of(point);
  match node.child_mut(octant) {
    Some(child) => insert_at(child, point, max_depth),
    None => false,
  }
}

fn delete_at<L>(
  node: &mut OctreeNode<L>,
  point: Vec3,
  max_depth: u32,
  prune: PruneStrategy,
) -> bool {
  if !node.contains(point) {
    return false;
  }

  let stores_here = node.is_leaf() || node.depth() >= max_depth;
  let removed = if stores_here {
    node.remove_point(point)
  } else {
    let octant = node.octant_of(point);
    match node.child_mut(octant) {
      Some(child) => delete_at(child, point, max_depth, prune),
      None => false,
    }
  };

  let prune_here = stores_here || prune == PruneStrategy::AncestorChain;
  if removed && prune_here && !node.is_leaf() && node.is_prunable() {
    #[cfg(feature = "tracing")]
    tracing::trace!(depth = node.depth(), "collapsing empty node");
    node.clear_children();
  }

  removed
}

fn query_at<L>(node: &OctreeNode<L>, point: Vec3, radius: f32, results: &mut Vec<Vec3>) {
  if node.is_leaf() {
    return;
  }

  results.extend(
    node
      .points()
      .iter()
      .copied()
      .filter(|stored| stored.distance(point) <= radius && *stored != point),
  );

  for child in node.children() {
    if child.intersects_sphere(point, radius) {
      query_at(child, point, radius, results);
    }
  }
}

fn find_at<'a, L, P>(node: &'a OctreeNode<L>, point: Vec3, pred: &mut P) -> Option<&'a OctreeNode<L>>
where
  P: FnMut(&OctreeNode<L>) -> bool,
{
  if node.contains(point) && pred(node) {
    return Some(node);
  }

  node.children().find_map(|child| find_at(child, point, pred))
}

fn find_mut_at<'a, L, P>(
  node: &'a mut OctreeNode<L>,
  point: Vec3,
  pred: &mut P,
) -> Option<&'a mut OctreeNode<L>>
where
  P: FnMut(&OctreeNode<L>) -> bool,
{
  if node.contains(point) && pred(&*node) {
    return Some(node);
  }

  for child in node.children_mut() {
    if let Some(found) = find_mut_at(child, point, pred) {
      return Some(found);
    }
  }
  None
}

fn traverse_at<L, V>(node: &OctreeNode<L>, visitor: &mut V)
where
  V: FnMut(&OctreeNode<L>),
{
  visitor(node);
  for child in node.children() {
    traverse_at(child, visitor);
  }
}

fn traverse_mut_at<L, V>(node: &mut OctreeNode<L>, visitor: &mut V)
where
  V: FnMut(&mut OctreeNode<L>),
{
  visitor(&mut *node);
  for child in node.children_mut() {
    traverse_mut_at(child, visitor);
  }
}

fn capacity_at<L>(node: &OctreeNode<L>) -> usize {
  if node.is_leaf() {
    return usize::from(node.is_valid());
  }
  node.children().map(capacity_at).sum()
}

fn size_at<L>(node: &OctreeNode<L>) -> usize {
  node.points().len() + node.children().map(size_at).sum::<usize>()
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
