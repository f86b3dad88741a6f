use crate::error::{GeometryError, Result};
use crate::math::Point2;

use super::polygon::to_line_string;
use super::{Aabb2, Polygon, Segment, Transform};

/// An outer boundary with zero or more voids (holes).
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    perimeter: Polygon,
    voids: Vec<Polygon>,
}

impl Profile {
    /// Creates a profile. Every void must sit inside the perimeter.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidProfile` if a void's centroid lies
    /// outside the perimeter or a void is larger than the perimeter.
    pub fn new(perimeter: Polygon, voids: Vec<Polygon>) -> Result<Self> {
        for (i, void) in voids.iter().enumerate() {
            if !perimeter.contains(&void.centroid()) || void.area() >= perimeter.area() {
                return Err(GeometryError::InvalidProfile(format!(
                    "void {i} is not inside the perimeter"
                ))
                .into());
            }
        }
        Ok(Self { perimeter, voids })
    }

    /// A profile without voids.
    #[must_use]
    pub fn from_perimeter(perimeter: Polygon) -> Self {
        Self {
            perimeter,
            voids: Vec::new(),
        }
    }

    #[must_use]
    pub fn perimeter(&self) -> &Polygon {
        &self.perimeter
    }

    #[must_use]
    pub fn voids(&self) -> &[Polygon] {
        &self.voids
    }

    /// Perimeter area minus void areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.perimeter.area() - self.voids.iter().map(Polygon::area).sum::<f64>()
    }

    /// Segments of the perimeter followed by the segments of every void.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = self.perimeter.segments();
        for void in &self.voids {
            segments.extend(void.segments());
        }
        segments
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        self.perimeter.bounds()
    }

    /// Checks if `point` lies inside the perimeter and outside every void.
    #[must_use]
    pub fn contains(&self, point: &Point2) -> bool {
        self.perimeter.contains(point) && !self.voids.iter().any(|v| v.contains(point))
    }

    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            perimeter: self.perimeter.transformed(transform),
            voids: self.voids.iter().map(|v| v.transformed(transform)).collect(),
        }
    }

    #[must_use]
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            to_line_string(self.perimeter.vertices()),
            self.voids
                .iter()
                .map(|v| to_line_string(v.vertices()))
                .collect(),
        )
    }

    /// Converts a `geo` polygon (exterior plus interiors) into a profile.
    ///
    /// Degenerate interior rings are skipped.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the exterior ring is degenerate.
    pub fn from_geo(polygon: &geo::Polygon<f64>) -> Result<Self> {
        let perimeter = Polygon::from_geo_ring(polygon.exterior())?;
        let voids = polygon
            .interiors()
            .iter()
            .filter_map(|ring| Polygon::from_geo_ring(ring).ok())
            .collect();
        Ok(Self { perimeter, voids })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn donut() -> Profile {
        Profile::new(
            Polygon::rectangle(p(0.0, 0.0), p(10.0, 10.0)),
            vec![Polygon::rectangle(p(4.0, 4.0), p(6.0, 6.0))],
        )
        .unwrap()
    }

    #[test]
    fn area_subtracts_voids() {
        assert_relative_eq!(donut().area(), 96.0);
    }

    #[test]
    fn segments_include_voids() {
        assert_eq!(donut().segments().len(), 8);
    }

    #[test]
    fn contains_respects_voids() {
        let d = donut();
        assert!(d.contains(&p(1.0, 1.0)));
        assert!(!d.contains(&p(5.0, 5.0)));
    }

    #[test]
    fn void_outside_perimeter_is_rejected() {
        let result = Profile::new(
            Polygon::rectangle(p(0.0, 0.0), p(2.0, 2.0)),
            vec![Polygon::rectangle(p(5.0, 5.0), p(6.0, 6.0))],
        );
        assert!(result.is_err());
    }

    #[test]
    fn geo_conversion_keeps_interiors() {
        let g = donut().to_geo();
        assert_eq!(g.interiors().len(), 1);
        let back = Profile::from_geo(&g).unwrap();
        assert_relative_eq!(back.area(), 96.0);
    }
}
