//! OctreeNode - one cubic cell of the octree.
//!
//! A node owns its 8 child slots. It knows its own depth and which octant of
//! its parent it occupies, so the parent cube is recovered with coordinate
//! math instead of a back-pointer.

use glam::Vec3;
use smallvec::SmallVec;

use super::bounds::Cube;

/// Octree cell, generic over the link handle type `L`.
///
/// `L` is whatever the caller uses to refer to externally owned objects
/// (`Weak<T>`, `&'a T`, an index). The node stores the handles but never
/// dereferences them.
#[derive(Debug)]
pub struct OctreeNode<L> {
  bounds: Cube,
  depth: u32,
  /// Slot index within the parent. `None` for the root.
  octant: Option<u8>,
  valid: bool,
  /// Children were created on demand by insertion, not by a bulk build.
  grown: bool,
  children: [Option<Box<OctreeNode<L>>>; 8],
  points: Vec<Vec3>,
  links: SmallVec<[L; 2]>,
}

impl<L> OctreeNode<L> {
  /// Create a root node.
  pub fn new_root(center: Vec3, radius: f32) -> Self {
    Self::with_bounds(Cube::new(center, radius), 0, None)
  }

  fn with_bounds(bounds: Cube, depth: u32, octant: Option<u8>) -> Self {
    Self {
      bounds,
      depth,
      octant,
      valid: true,
      grown: false,
      children: Default::default(),
      points: Vec::new(),
      links: SmallVec::new(),
    }
  }

  // ---------------------------------------------------------------------------
  // Geometry
  // ---------------------------------------------------------------------------

  /// Cube covered by this node.
  #[inline]
  pub fn bounds(&self) -> Cube {
    self.bounds
  }

  /// Cube center.
  #[inline]
  pub fn center(&self) -> Vec3 {
    self.bounds.center
  }

  /// Half-extent of the cube.
  #[inline]
  pub fn radius(&self) -> f32 {
    self.bounds.radius
  }

  /// Distance from the root (root = 0).
  #[inline]
  pub fn depth(&self) -> u32 {
    self.depth
  }

  /// Slot index within the parent, `None` for the root.
  #[inline]
  pub fn octant(&self) -> Option<u8> {
    self.octant
  }

  /// Cube of the parent node, `None` for the root.
  pub fn parent_bounds(&self) -> Option<Cube> {
    self.octant.map(|octant| self.bounds.parent(octant))
  }

  /// Inclusive bounds test.
  #[inline]
  pub fn contains(&self, point: Vec3) -> bool {
    self.bounds.contains_point(point)
  }

  /// Child slot (0-7) that `point` falls into.
  #[inline]
  pub fn octant_of(&self, point: Vec3) -> u8 {
    self.bounds.octant_of(point)
  }

  /// Check if the sphere at `point` with `radius` touches this cube.
  #[inline]
  pub fn intersects_sphere(&self, point: Vec3, radius: f32) -> bool {
    self.bounds.intersects_sphere(point, radius)
  }

  // ---------------------------------------------------------------------------
  // Structure
  // ---------------------------------------------------------------------------

  /// True when no child slot is occupied.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.iter().all(Option::is_none)
  }

  /// Child in the given slot.
  #[inline]
  pub fn child(&self, octant: u8) -> Option<&OctreeNode<L>> {
    self.children.get(octant as usize)?.as_deref()
  }

  /// Mutable child in the given slot.
  #[inline]
  pub fn child_mut(&mut self, octant: u8) -> Option<&mut OctreeNode<L>> {
    self.children.get_mut(octant as usize)?.as_deref_mut()
  }

  /// Existing children in slot order.
  pub fn children(&self) -> impl Iterator<Item = &OctreeNode<L>> {
    self.children.iter().filter_map(|child| child.as_deref())
  }

  pub(crate) fn children_mut(&mut self) -> impl Iterator<Item = &mut OctreeNode<L>> {
    self.children.iter_mut().filter_map(|child| child.as_deref_mut())
  }

  /// Fresh, empty nodes for all 8 octants.
  pub(crate) fn make_children(&self) -> [Box<OctreeNode<L>>; 8] {
    std::array::from_fn(|octant| {
      let octant = octant as u8;
      Box::new(Self::with_bounds(
        self.bounds.child(octant),
        self.depth + 1,
        Some(octant),
      ))
    })
  }

  /// Create all 8 children, replacing any existing ones.
  pub(crate) fn subdivide(&mut self) {
    self.set_children(self.make_children());
  }

  /// Subdivide on demand. Only children created this way can be pruned.
  pub(crate) fn grow(&mut self) {
    self.subdivide();
    self.grown = true;
  }

  /// Whether the current children were created on demand.
  #[inline]
  pub fn is_grown(&self) -> bool {
    self.grown
  }

  pub(crate) fn set_children(&mut self, children: [Box<OctreeNode<L>>; 8]) {
    for (slot, child) in self.children.iter_mut().zip(children) {
      *slot = Some(child);
    }
    self.grown = false;
  }

  /// Drop all children and their subtrees.
  pub(crate) fn clear_children(&mut self) {
    for slot in &mut self.children {
      *slot = None;
    }
    self.grown = false;
  }

  /// Subdivide down `levels` more generations, stopping once nodes are no
  /// larger than `leaf_radius`. Returns the number of nodes created.
  pub(crate) fn build_subtree(&mut self, leaf_radius: f32, levels: u32) -> usize {
    if self.radius() <= leaf_radius || levels == 0 {
      return 0;
    }

    self.subdivide();
    let mut created = 8;
    for child in self.children_mut() {
      created += child.build_subtree(leaf_radius, levels - 1);
    }
    created
  }

  /// Children were grown on demand and can be dropped without losing data.
  ///
  /// Only looks one level down: children must themselves be childless and
  /// hold neither points nor links. A node still storing points keeps its
  /// children so queries keep descending into it. The node's own links
  /// survive a collapse and do not block it.
  pub(crate) fn is_prunable(&self) -> bool {
    self.grown
      && self.points.is_empty()
      && self
        .children()
        .all(|child| child.is_leaf() && child.points.is_empty() && child.links.is_empty())
  }

  // ---------------------------------------------------------------------------
  // Capacity flag
  // ---------------------------------------------------------------------------

  /// Whether this node counts towards [`Octree::capacity`](super::Octree::capacity).
  #[inline]
  pub fn is_valid(&self) -> bool {
    self.valid
  }

  /// Mark this node as (in)valid for capacity accounting.
  #[inline]
  pub fn set_valid(&mut self, valid: bool) {
    self.valid = valid;
  }

  // ---------------------------------------------------------------------------
  // Points
  // ---------------------------------------------------------------------------

  /// Stored points, in insertion order.
  #[inline]
  pub fn points(&self) -> &[Vec3] {
    &self.points
  }

  /// Append a point.
  pub fn add_point(&mut self, point: Vec3) {
    self.points.push(point);
  }

  /// Remove the first stored point exactly equal to `point`.
  ///
  /// Returns whether a point was removed.
  pub fn remove_point(&mut self, point: Vec3) -> bool {
    match self.points.iter().position(|stored| *stored == point) {
      Some(index) => {
        self.points.remove(index);
        true
      }
      None => false,
    }
  }

  /// Remove every stored point.
  pub fn clear_points(&mut self) {
    self.points.clear();
  }

  // ---------------------------------------------------------------------------
  // Links
  // ---------------------------------------------------------------------------

  /// Attached link handles, in insertion order.
  #[inline]
  pub fn links(&self) -> &[L] {
    &self.links
  }

  /// Attach a link handle.
  pub fn add_link(&mut self, link: L) {
    self.links.push(link);
  }

  /// First link matching `pred`, if any.
  pub fn link<P>(&self, mut pred: P) -> Option<&L>
  where
    P: FnMut(&L) -> bool,
  {
    self.links.iter().find(|link| pred(*link))
  }

  /// Detach every link handle.
  pub fn remove_links(&mut self) {
    self.links.clear();
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
