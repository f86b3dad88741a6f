use geo::{Area, BooleanOps};

use crate::error::{GridError, Result};
use crate::geometry::{Polygon, Profile, Segment, Transform};
use crate::math::{Point2, LENGTH_TOLERANCE};

use super::cell::CellIndex;
use super::grid_1d::{Domain1d, Grid1d};

/// Area difference under which a trimmed cell still counts as whole.
pub const TRIM_AREA_TOLERANCE: f64 = 0.01;

/// One of the two grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    U,
    V,
}

/// A 2D grid over a profile, laid out in an oriented local frame.
///
/// U runs along the orientation's x axis and V along its y axis. Cell
/// rectangles are computed in the local frame and mapped to world space
/// through the orientation transform.
#[derive(Debug, Clone)]
pub struct Grid2d<L = ()> {
    boundary: Profile,
    orientation: Transform,
    u: Grid1d<L>,
    v: Grid1d<L>,
}

impl<L: Clone> Grid2d<L> {
    /// Builds an undivided grid whose domains are the bounds of `boundary`
    /// seen from `orientation`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::DegenerateBoundary` if the profile has no area.
    pub fn new(boundary: &Profile, orientation: Transform) -> Result<Self> {
        let local = boundary.transformed(&orientation.inverted());
        let bounds = local.bounds();
        Self::with_domains(
            boundary,
            orientation,
            Domain1d::new(bounds.min.x, bounds.max.x),
            Domain1d::new(bounds.min.y, bounds.max.y),
        )
    }

    /// Builds an undivided grid over explicit local domains.
    ///
    /// # Errors
    ///
    /// Returns `GridError::DegenerateBoundary` if the profile has no area, or
    /// `GridError::InvalidDomain` if either domain is empty.
    pub fn with_domains(
        boundary: &Profile,
        orientation: Transform,
        u: Domain1d,
        v: Domain1d,
    ) -> Result<Self> {
        if boundary.area() < LENGTH_TOLERANCE {
            return Err(GridError::DegenerateBoundary(format!(
                "boundary area {:.6} is too small",
                boundary.area()
            ))
            .into());
        }
        Ok(Self {
            boundary: boundary.clone(),
            orientation,
            u: Grid1d::new(u.min, u.max)?,
            v: Grid1d::new(v.min, v.max)?,
        })
    }

    #[must_use]
    pub fn boundary(&self) -> &Profile {
        &self.boundary
    }

    #[must_use]
    pub fn orientation(&self) -> &Transform {
        &self.orientation
    }

    #[must_use]
    pub fn u(&self) -> &Grid1d<L> {
        &self.u
    }

    #[must_use]
    pub fn v(&self) -> &Grid1d<L> {
        &self.v
    }

    pub fn u_mut(&mut self) -> &mut Grid1d<L> {
        &mut self.u
    }

    pub fn v_mut(&mut self) -> &mut Grid1d<L> {
        &mut self.v
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.u.len() * self.v.len()
    }

    /// Lazily yields every cell index, U outer and V inner.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        let nv = self.v.len();
        (0..self.u.len()).flat_map(move |u| (0..nv).map(move |v| CellIndex::new(u, v)))
    }

    /// Local U and V domains of a cell.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn cell_domains(&self, index: CellIndex) -> Result<(Domain1d, Domain1d)> {
        match (self.u.cell(index.u), self.v.cell(index.v)) {
            (Some(u), Some(v)) => Ok((u.domain, v.domain)),
            _ => Err(GridError::CellOutOfRange {
                u: index.u,
                v: index.v,
            }
            .into()),
        }
    }

    /// Labels of the U and V cells a grid cell sits in.
    #[must_use]
    pub fn cell_labels(&self, index: CellIndex) -> (Option<L>, Option<L>) {
        (
            self.u.cell(index.u).and_then(|c| c.label.clone()),
            self.v.cell(index.v).and_then(|c| c.label.clone()),
        )
    }

    /// The untrimmed world-space rectangle of a cell.
    ///
    /// Vertices run `(u_min, v_min)`, `(u_max, v_min)`, `(u_max, v_max)`,
    /// `(u_min, v_max)` in the local frame.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn cell_geometry(&self, index: CellIndex) -> Result<Polygon> {
        let (u, v) = self.cell_domains(index)?;
        let local = Polygon::rectangle(Point2::new(u.min, v.min), Point2::new(u.max, v.max));
        Ok(local.transformed(&self.orientation))
    }

    /// The cell rectangle intersected with the boundary profile.
    ///
    /// The result may be empty, a single piece, or several disjoint pieces.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn trimmed_cell_geometry(&self, index: CellIndex) -> Result<Vec<Profile>> {
        let rect = self.cell_geometry(index)?;
        let pieces = rect.to_geo().intersection(&self.boundary.to_geo());
        Ok(pieces
            .iter()
            .filter(|p| p.unsigned_area() > LENGTH_TOLERANCE)
            .filter_map(|p| Profile::from_geo(p).ok())
            .collect())
    }

    /// Checks if the boundary cuts into the cell: the trimmed geometry is not
    /// exactly one piece with the area of the full rectangle.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn is_trimmed(&self, index: CellIndex) -> Result<bool> {
        let full = self.cell_geometry(index)?.area();
        let pieces = self.trimmed_cell_geometry(index)?;
        Ok(match pieces.as_slice() {
            [single] => (single.area() - full).abs() >= TRIM_AREA_TOLERANCE,
            _ => true,
        })
    }

    /// A new undivided grid covering one cell, sharing boundary and orientation.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn cell_grid(&self, index: CellIndex) -> Result<Grid2d<L>> {
        let (u, v) = self.cell_domains(index)?;
        Grid2d::with_domains(&self.boundary, self.orientation, u, v)
    }

    /// World-space lines along the cell boundaries of one axis, clipped to
    /// the profile. `Axis::U` yields the lines of constant U.
    #[must_use]
    pub fn cell_separators(&self, axis: Axis, include_ends: bool) -> Vec<Segment> {
        let (positions, across) = match axis {
            Axis::U => (self.u.separators(include_ends), self.v.domain()),
            Axis::V => (self.v.separators(include_ends), self.u.domain()),
        };
        let lines: Vec<geo::LineString<f64>> = positions
            .iter()
            .map(|&at| {
                let (a, b) = match axis {
                    Axis::U => (Point2::new(at, across.min), Point2::new(at, across.max)),
                    Axis::V => (Point2::new(across.min, at), Point2::new(across.max, at)),
                };
                let a = self.orientation.of_point(&a);
                let b = self.orientation.of_point(&b);
                geo::LineString::from(vec![(a.x, a.y), (b.x, b.y)])
            })
            .collect();
        let clipped = self
            .boundary
            .to_geo()
            .clip(&geo::MultiLineString::new(lines), false);
        clipped
            .iter()
            .filter_map(|ls| {
                let first = ls.coords().next()?;
                let last = ls.coords().last()?;
                let seg = Segment::new(Point2::new(first.x, first.y), Point2::new(last.x, last.y));
                (seg.length() > LENGTH_TOLERANCE).then_some(seg)
            })
            .collect()
    }

    /// Splits the U axis at the local U coordinate of each world point.
    pub fn split_u_at_points(&mut self, points: &[Point2]) {
        let to_local = self.orientation.inverted();
        let positions: Vec<f64> = points.iter().map(|p| to_local.of_point(p).x).collect();
        self.u.split_at_positions(&positions);
    }
}
