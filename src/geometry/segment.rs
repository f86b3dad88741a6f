use crate::math::distance_2d::{point_to_segment_dist, segment_to_segment_dist};
use crate::math::{cross_2d, Point2, Vector2, TOLERANCE};

use super::Transform;

/// A bounded straight line between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

impl Segment {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Convenience constructor from raw coordinates.
    #[must_use]
    pub fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Unit direction from start to end; zero for a degenerate segment.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        let d = self.end - self.start;
        let len = d.norm();
        if len < TOLERANCE {
            Vector2::zeros()
        } else {
            d / len
        }
    }

    #[must_use]
    pub fn mid(&self) -> Point2 {
        self.point_at(0.5)
    }

    /// Point at normalized parameter `t` (0 = start, 1 = end).
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.start + (self.end - self.start) * t
    }

    #[must_use]
    pub fn distance_to_point(&self, p: &Point2) -> f64 {
        point_to_segment_dist(p, &self.start, &self.end)
    }

    #[must_use]
    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        segment_to_segment_dist(&self.start, &self.end, &other.start, &other.end)
    }

    /// Signed offset of `p` along this segment's direction, measured from start.
    #[must_use]
    pub fn project(&self, p: &Point2) -> f64 {
        (p - self.start).dot(&self.direction())
    }

    /// Checks if `other` lies on the same infinite line, in either direction.
    ///
    /// Directions must be parallel and both endpoints of `other` must lie
    /// within `tolerance` of this segment's supporting line.
    #[must_use]
    pub fn is_collinear(&self, other: &Segment, tolerance: f64) -> bool {
        let d = self.direction();
        let od = other.direction();
        if d.norm() < TOLERANCE || od.norm() < TOLERANCE {
            return false;
        }
        if cross_2d(&d, &od).abs() > tolerance {
            return false;
        }
        let off_line = |p: &Point2| cross_2d(&d, &(p - self.start)).abs();
        off_line(&other.start) <= tolerance && off_line(&other.end) <= tolerance
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(transform.of_point(&self.start), transform.of_point(&self.end))
    }

    /// Checks if both segments have the same endpoints, in either order.
    #[must_use]
    pub fn approx_eq_undirected(&self, other: &Segment, tolerance: f64) -> bool {
        let close = |a: &Point2, b: &Point2| (a - b).norm() <= tolerance;
        (close(&self.start, &other.start) && close(&self.end, &other.end))
            || (close(&self.start, &other.end) && close(&self.end, &other.start))
    }
}
