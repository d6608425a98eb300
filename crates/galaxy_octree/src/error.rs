//! Error types for octree construction and bulk building.

use thiserror::Error;

use crate::threading::TaskError;

/// Errors reported by [`Octree`](crate::Octree) operations.
///
/// Point-level operations (insert, delete, find) never fail; they report
/// their outcome through `bool`/`Option` instead.
#[derive(Debug, Error)]
pub enum OctreeError {
  /// Root half-extent was zero, negative or not finite.
  #[error("octree radius must be finite and positive, got {0}")]
  InvalidRadius(f32),

  /// Target leaf half-extent for a bulk build was zero, negative or not finite.
  #[error("leaf radius must be finite and positive, got {0}")]
  InvalidLeafRadius(f32),

  /// A subtree build task failed while being joined.
  #[error("subtree build task failed: {0}")]
  Task(#[from] TaskError),
}
