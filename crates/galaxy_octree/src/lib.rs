//! galaxy_octree - generic octree spatial index for large point sets
//!
//! This crate stores 3D points (star positions in a galaxy-scale
//! simulation) in a hierarchical cube partition and answers spatial
//! questions about them.
//!
//! # Features
//!
//! - **Parallel bulk build**: pre-subdivide down to a leaf size, one task per
//!   root octant on a pluggable [`TaskExecutor`]
//! - **Lazy growth**: insertion creates one generation of 8 children at a time
//! - **Radius queries**: sphere-pruned descent, query point excluded
//! - **Predicate lookup**: pre-order search for the first matching node
//! - **Links**: attach caller-owned object handles to any node
//!
//! # Example
//!
//! ```ignore
//! use galaxy_octree::{Octree, Vec3};
//!
//! let mut stars: Octree = Octree::new(Vec3::ZERO, 1024.0, 6);
//! stars.insert(Vec3::new(10.0, -3.0, 42.0));
//! stars.insert(Vec3::new(11.0, -3.5, 40.0));
//!
//! let neighbours = stars.query(Vec3::new(10.0, -3.0, 42.0), 5.0);
//! assert_eq!(neighbours.len(), 1);
//! ```

pub mod error;
pub use error::OctreeError;

// Octree spatial index
pub mod octree;
pub use octree::{
  BuildStats, Cube, Octree, OctreeConfig, OctreeNode, OctreeStats, PruneStrategy,
};

// Task submission contract for the bulk build
pub mod threading;
pub use threading::{
  InlineExecutor, RayonExecutor, SubmitExt, TaskError, TaskExecutor, TaskHandle, TaskId,
};

pub use glam::Vec3;
