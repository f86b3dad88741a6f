use nalgebra::{Translation2, UnitComplex};

use crate::error::{GeometryError, Result};
use crate::math::{Isometry2, Point2, Vector2, TOLERANCE};

/// A planar rigid transform: rotation about the origin, then translation.
///
/// Used to move between a local frame (for example a grid whose X axis runs
/// along a room's orientation edge) and level space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    iso: Isometry2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            iso: Isometry2::identity(),
        }
    }

    /// Creates a transform with the given origin and counter-clockwise
    /// rotation angle in radians.
    #[must_use]
    pub fn new(origin: Point2, angle: f64) -> Self {
        Self {
            iso: Isometry2::new(origin.coords, angle),
        }
    }

    /// Creates a transform whose X axis points along `x_axis`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ZeroVector` if `x_axis` has zero length.
    pub fn from_x_axis(origin: Point2, x_axis: Vector2) -> Result<Self> {
        if x_axis.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self::new(origin, x_axis.y.atan2(x_axis.x)))
    }

    /// A pure translation.
    #[must_use]
    pub fn translation(offset: Vector2) -> Self {
        Self {
            iso: Isometry2::from_parts(Translation2::from(offset), UnitComplex::identity()),
        }
    }

    /// A pure rotation about the origin.
    #[must_use]
    pub fn rotation(angle: f64) -> Self {
        Self::new(Point2::origin(), angle)
    }

    /// Returns the transform that applies `self` first, then `other`.
    #[must_use]
    pub fn concatenated(&self, other: &Transform) -> Self {
        Self {
            iso: other.iso * self.iso,
        }
    }

    /// Returns the inverse transform.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            iso: self.iso.inverse(),
        }
    }

    /// Transforms a point.
    #[must_use]
    pub fn of_point(&self, point: &Point2) -> Point2 {
        self.iso.transform_point(point)
    }

    /// Transforms a direction (rotation only).
    #[must_use]
    pub fn of_vector(&self, vector: &Vector2) -> Vector2 {
        self.iso.transform_vector(vector)
    }

    /// The image of the origin.
    #[must_use]
    pub fn origin(&self) -> Point2 {
        Point2::from(self.iso.translation.vector)
    }

    /// The image of the unit X axis.
    #[must_use]
    pub fn x_axis(&self) -> Vector2 {
        self.of_vector(&Vector2::x())
    }

    /// The image of the unit Y axis.
    #[must_use]
    pub fn y_axis(&self) -> Vector2 {
        self.of_vector(&Vector2::y())
    }

    /// Rotation angle in radians, in `(-pi, pi]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.iso.rotation.angle()
    }
}
