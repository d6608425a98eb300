//! Octree module: explicit, pointer-free spatial subdivision of a cube.
//!
//! Every node is an axis-aligned cube given by center and half-extent
//! ("radius"). A node either has no children or exactly 8, one per octant.
//!
//! # Octant Convention
//!
//! ```text
//! octant = (x >= cx) << 2 | (y >= cy) << 1 | (z >= cz)
//! ```
//!
//! A point on the center maps to octant 7.
//!
//! # Storage Depth
//!
//! Points are stored at nodes of depth `max_depth` (root = 0). The node
//! radius there is `radius / 2^max_depth`.
//!
//! # Module Structure
//!
//! - [`bounds`]: `Cube` - center/half-extent geometry and octant math
//! - [`config`]: `OctreeConfig` - root cube, depth limit, pruning policy
//! - [`node`]: `OctreeNode` - owned children, points and links
//! - [`tree`]: `Octree` - build, insert, delete, query, find, traverse
//! - [`stats`]: `BuildStats`, `OctreeStats`

pub mod bounds;
pub mod config;
pub mod node;
pub mod stats;
pub mod tree;

// Re-exports
pub use bounds::{octant_direction, Cube};
pub use config::{required_depth, OctreeConfig, PruneStrategy, DEFAULT_MAX_DEPTH};
pub use node::OctreeNode;
pub use stats::{BuildStats, OctreeStats};
pub use tree::Octree;
