use super::*;

// =========================================================================
// OctreeNode Tests - Geometry, Storage and Links
// =========================================================================

fn unit_root() -> OctreeNode<u32> {
  OctreeNode::new_root(Vec3::ZERO, 1.0)
}

/// Fresh root has no parent, no children and is valid.
#[test]
fn test_new_root() {
  let root = unit_root();

  assert_eq!(root.depth(), 0);
  assert_eq!(root.octant(), None);
  assert_eq!(root.parent_bounds(), None);
  assert!(root.is_leaf());
  assert!(root.is_valid());
  assert!(root.points().is_empty());
  assert!(root.links().is_empty());
}

/// Bounds test is inclusive on every face.
#[test]
fn test_contains_inclusive() {
  let root = OctreeNode::<u32>::new_root(Vec3::new(2.0, 2.0, 2.0), 2.0);

  assert!(root.contains(Vec3::ZERO));
  assert!(root.contains(Vec3::splat(4.0)));
  assert!(root.contains(Vec3::new(0.0, 4.0, 2.0)));
  assert!(!root.contains(Vec3::new(-0.001, 2.0, 2.0)));
  assert!(!root.contains(Vec3::new(2.0, 2.0, 4.001)));
}

/// Center point maps to octant 7, strictly-below point to octant 0.
#[test]
fn test_octant_of_center_and_below() {
  let root = OctreeNode::<u32>::new_root(Vec3::new(5.0, -5.0, 1.0), 4.0);

  assert_eq!(root.octant_of(root.center()), 7);
  assert_eq!(root.octant_of(Vec3::new(4.0, -6.0, 0.0)), 0);
  assert_eq!(root.octant_of(Vec3::new(5.0, -6.0, 0.0)), 4, "x on center plane");
}

/// Subdividing creates exactly 8 children, one generation deeper.
#[test]
fn test_subdivide_creates_8_children() {
  let mut root = unit_root();
  root.subdivide();

  assert!(!root.is_leaf());
  assert_eq!(root.children().count(), 8);

  for octant in 0u8..8 {
    let child = root.child(octant).expect("slot should be filled");
    assert_eq!(child.depth(), 1);
    assert_eq!(child.octant(), Some(octant));
    assert_eq!(child.radius(), 0.5);
    assert_eq!(root.octant_of(child.center()), octant);
    assert_eq!(child.parent_bounds(), Some(root.bounds()));
    assert!(child.is_leaf());
  }
}

/// Out of range slot yields None rather than panicking.
#[test]
fn test_child_out_of_range() {
  let mut root = unit_root();
  root.subdivide();

  assert!(root.child(8).is_none());
  assert!(root.child_mut(200).is_none());
}

/// Clearing children turns the node back into a leaf.
#[test]
fn test_clear_children() {
  let mut root = unit_root();
  root.subdivide();
  root.clear_children();

  assert!(root.is_leaf());
  assert_eq!(root.children().count(), 0);
}

/// build_subtree stops at the requested level count.
#[test]
fn test_build_subtree_levels() {
  let mut root = OctreeNode::<u32>::new_root(Vec3::ZERO, 8.0);
  let created = root.build_subtree(1.0, 2);

  assert_eq!(created, 8 + 64);
  let grandchild = root.child(0).and_then(|c| c.child(0)).unwrap();
  assert_eq!(grandchild.depth(), 2);
  assert_eq!(grandchild.radius(), 2.0);
  assert!(grandchild.is_leaf());
}

/// build_subtree also stops once nodes are no larger than the leaf radius.
#[test]
fn test_build_subtree_stops_at_leaf_radius() {
  let mut root = OctreeNode::<u32>::new_root(Vec3::ZERO, 8.0);
  let created = root.build_subtree(4.0, 10);

  assert_eq!(created, 8, "children of radius 4 are already leaf sized");
}

/// Points keep insertion order; duplicates are allowed.
#[test]
fn test_point_storage() {
  let mut node = unit_root();
  let a = Vec3::new(0.1, 0.2, 0.3);
  let b = Vec3::new(-0.1, 0.0, 0.5);

  node.add_point(a);
  node.add_point(b);
  node.add_point(a);
  assert_eq!(node.points(), &[a, b, a]);

  // Removes the first exact match only
  assert!(node.remove_point(a));
  assert_eq!(node.points(), &[b, a]);

  // Absent point is a no-op
  assert!(!node.remove_point(Vec3::splat(0.9)));
  assert_eq!(node.points().len(), 2);

  node.clear_points();
  assert!(node.points().is_empty());
}

/// Link lookup returns the first match or None.
#[test]
fn test_link_storage() {
  let mut node = unit_root();
  node.add_link(10);
  node.add_link(25);
  node.add_link(30);

  assert_eq!(node.link(|id| *id > 20), Some(&25));
  assert_eq!(node.link(|id| *id > 100), None);
  assert_eq!(node.links(), &[10, 25, 30]);

  node.remove_links();
  assert!(node.links().is_empty());
  assert_eq!(node.link(|_| true), None);
}

/// Links can be borrowed references to externally owned objects.
#[test]
fn test_borrowed_links() {
  let names = vec!["Sol".to_string(), "Vega".to_string()];
  let mut node: OctreeNode<&String> = OctreeNode::new_root(Vec3::ZERO, 1.0);

  for name in &names {
    node.add_link(name);
  }

  let vega = node.link(|name| name.starts_with('V')).copied();
  assert!(std::ptr::eq(vega.unwrap(), &names[1]));
}

/// Validity flag toggles independently of contents.
#[test]
fn test_valid_flag() {
  let mut node = unit_root();
  node.set_valid(false);
  assert!(!node.is_valid());
  node.set_valid(true);
  assert!(node.is_valid());
}

/// Prunable means grown node whose children are empty leaves.
#[test]
fn test_is_prunable() {
  let mut node = unit_root();
  assert!(!node.is_prunable(), "leaf has nothing to collapse");

  node.grow();
  assert!(node.is_grown());
  assert!(node.is_prunable(), "empty grown children are prunable");

  node.child_mut(3).unwrap().add_point(Vec3::splat(0.1));
  assert!(!node.is_prunable(), "child holds a point");

  node.child_mut(3).unwrap().clear_points();
  node.child_mut(5).unwrap().add_link(7);
  assert!(!node.is_prunable(), "child holds a link");

  node.child_mut(5).unwrap().remove_links();
  node.child_mut(0).unwrap().grow();
  assert!(!node.is_prunable(), "grandchildren block pruning");
}

/// A node keeps its own links when collapsed, so they never block it.
#[test]
fn test_own_links_do_not_block_pruning() {
  let mut node = unit_root();
  node.grow();
  node.add_link(11);
  assert!(node.is_prunable());

  node.add_point(Vec3::ZERO);
  assert!(!node.is_prunable(), "stored points keep the node subdivided");
}

/// Bulk-built children are never prunable; regrowing or clearing resets.
#[test]
fn test_built_children_not_prunable() {
  let mut node = OctreeNode::<u32>::new_root(Vec3::ZERO, 8.0);
  node.build_subtree(4.0, 1);
  assert!(!node.is_leaf());
  assert!(!node.is_grown());
  assert!(!node.is_prunable());

  node.grow();
  assert!(node.is_grown());

  node.clear_children();
  assert!(!node.is_grown());
}
