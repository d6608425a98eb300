//! Axis-aligned cube described by center and half-extent.

use glam::Vec3;

/// Axis-aligned cube spanning `[center - radius, center + radius]` on every
/// axis.
///
/// Octant numbering used throughout the octree:
/// - bit 2: +X half (`x >= center.x`)
/// - bit 1: +Y half (`y >= center.y`)
/// - bit 0: +Z half (`z >= center.z`)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cube {
  /// Cube center.
  pub center: Vec3,
  /// Half-extent along each axis.
  pub radius: f32,
}

impl Cube {
  /// Create a new cube from center and half-extent.
  ///
  /// # Panics
  /// Debug-asserts that the radius is not negative.
  pub fn new(center: Vec3, radius: f32) -> Self {
    debug_assert!(radius >= 0.0, "cube radius must be >= 0");
    Self { center, radius }
  }

  /// Minimum corner (inclusive).
  #[inline]
  pub fn min(&self) -> Vec3 {
    self.center - Vec3::splat(self.radius)
  }

  /// Maximum corner (inclusive).
  #[inline]
  pub fn max(&self) -> Vec3 {
    self.center + Vec3::splat(self.radius)
  }

  /// Edge length (twice the radius).
  #[inline]
  pub fn size(&self) -> f32 {
    self.radius * 2.0
  }

  /// Check if the cube contains a point, boundary included.
  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    let min = self.min();
    let max = self.max();
    point.x >= min.x
      && point.x <= max.x
      && point.y >= min.y
      && point.y <= max.y
      && point.z >= min.z
      && point.z <= max.z
  }

  /// Octant (0-7) of `point` relative to the center.
  ///
  /// A point exactly at the center maps to octant 7.
  #[inline]
  pub fn octant_of(&self, point: Vec3) -> u8 {
    let mut octant = 0;
    if point.x >= self.center.x {
      octant |= 4;
    }
    if point.y >= self.center.y {
      octant |= 2;
    }
    if point.z >= self.center.z {
      octant |= 1;
    }
    octant
  }

  /// Check if a sphere touches the cube.
  ///
  /// Measures the distance from `point` to its clamp into the cube.
  #[inline]
  pub fn intersects_sphere(&self, point: Vec3, radius: f32) -> bool {
    let closest = point.clamp(self.min(), self.max());
    point.distance(closest) <= radius
  }

  /// Sub-cube for the given octant (half the radius).
  #[inline]
  pub fn child(&self, octant: u8) -> Cube {
    let half = self.radius * 0.5;
    Cube {
      center: self.center + octant_direction(octant) * half,
      radius: half,
    }
  }

  /// Enclosing cube, given this cube's octant within it.
  ///
  /// Inverse of [`child`](Self::child).
  #[inline]
  pub fn parent(&self, octant: u8) -> Cube {
    Cube {
      center: self.center - octant_direction(octant) * self.radius,
      radius: self.radius * 2.0,
    }
  }
}

/// Unit sign vector of an octant: -1 or +1 per axis.
#[inline]
pub fn octant_direction(octant: u8) -> Vec3 {
  let sign = |bit: u8| if octant & bit != 0 { 1.0 } else { -1.0 };
  Vec3::new(sign(4), sign(2), sign(1))
}
