use geo::Intersects;

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{centroid_2d, point_in_polygon_2d, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

use super::{Aabb2, Segment, Transform};

/// A closed, simple polygon in the plane.
///
/// The closing vertex is implicit: the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2>,
}

impl Polygon {
    /// Creates a polygon from its vertices.
    ///
    /// A repeated closing vertex and consecutive duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if fewer than 3 distinct vertices remain.
    pub fn new(vertices: Vec<Point2>) -> Result<Self> {
        let mut cleaned: Vec<Point2> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if cleaned.last().is_some_and(|last| (last - v).norm() < TOLERANCE) {
                continue;
            }
            cleaned.push(v);
        }
        while cleaned.len() > 1
            && cleaned
                .first()
                .zip(cleaned.last())
                .is_some_and(|(f, l)| (f - l).norm() < TOLERANCE)
        {
            cleaned.pop();
        }
        if cleaned.len() < 3 {
            return Err(GeometryError::Degenerate(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                cleaned.len()
            ))
            .into());
        }
        Ok(Self { vertices: cleaned })
    }

    /// Axis-aligned rectangle, counter-clockwise from `min`.
    #[must_use]
    pub fn rectangle(min: Point2, max: Point2) -> Self {
        Self {
            vertices: vec![
                min,
                Point2::new(max.x, min.y),
                max,
                Point2::new(min.x, max.y),
            ],
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    /// Boundary segments in vertex order, including the closing segment.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.vertices)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn centroid(&self) -> Point2 {
        centroid_2d(&self.vertices)
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        // A polygon always has vertices.
        Aabb2::from_points(&self.vertices)
            .unwrap_or_else(|| Aabb2::new(Point2::origin(), Point2::origin()))
    }

    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        point_in_polygon_2d(point, &self.vertices)
    }

    /// Checks if the two polygons overlap or touch.
    #[must_use]
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.to_geo().intersects(&other.to_geo())
    }

    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| transform.of_point(v)).collect(),
        }
    }

    /// Returns a copy with each segment's midpoint inserted after its start.
    #[must_use]
    pub fn densified(&self) -> Self {
        let mut vertices = Vec::with_capacity(self.vertices.len() * 2);
        for seg in self.segments() {
            vertices.push(seg.start);
            vertices.push(seg.mid());
        }
        Self { vertices }
    }

    /// The longest boundary segment; the first one wins ties.
    #[must_use]
    pub fn longest_segment(&self) -> Segment {
        let segments = self.segments();
        let mut best = segments[0];
        for seg in &segments[1..] {
            if seg.length() > best.length() {
                best = *seg;
            }
        }
        best
    }

    /// Returns a counter-clockwise copy of this polygon.
    #[must_use]
    pub fn counter_clockwise(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if self.signed_area() < 0.0 {
            vertices.reverse();
        }
        Self { vertices }
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(to_line_string(&self.vertices), Vec::new())
    }

    /// Builds a polygon from a `geo` ring, dropping the repeated closing point.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the ring has fewer than 3 distinct points.
    pub fn from_geo_ring(ring: &geo::LineString<f64>) -> Result<Self> {
        Self::new(ring.coords().map(|c| Point2::new(c.x, c.y)).collect())
    }
}

pub(crate) fn to_line_string(points: &[Point2]) -> geo::LineString<f64> {
    geo::LineString::from(points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>())
}
