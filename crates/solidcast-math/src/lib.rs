#![warn(missing_docs)]

//! Math types for the solidcast ray tracing core.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for ray/solid geometry: points, vectors, directions, and the
//! distance tolerance shared by the boolean evaluation code.

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Distance tolerance for ray/boolean comparisons.
///
/// Two hit distances closer than `dist` are treated as the same surface
/// crossing. The squared form is carried alongside so point-to-point
/// comparisons can avoid the square root.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub dist: f64,
    /// `dist * dist`, for squared-distance comparisons.
    pub dist_sq: f64,
}

impl Tolerance {
    /// Default modeling tolerance (0.0005 model units).
    pub const DEFAULT: Self = Self {
        dist: 0.0005,
        dist_sq: 0.0005 * 0.0005,
    };

    /// Create a tolerance from a linear distance.
    pub fn from_dist(dist: f64) -> Self {
        Self {
            dist,
            dist_sq: dist * dist,
        }
    }

    /// Check if a scalar is effectively zero.
    #[inline]
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.dist
    }

    /// Check if two distances along a ray coincide.
    #[inline]
    pub fn dists_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.dist
    }

    /// Check if two points are coincident within tolerance.
    #[inline]
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm_squared() < self.dist_sq
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
