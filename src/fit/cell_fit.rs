use tracing::debug;

use crate::error::Result;
use crate::geometry::{Polygon, Profile, Segment, Transform};
use crate::grid::{CellIndex, Grid2d};
use crate::math::polygon_2d::left_normal;
use crate::math::{Point2, Vector2};

use super::catalog::{Catalog, ContentConfiguration, PlacedElement};
use super::inscribed_rect::largest_inscribed_rectangle;

/// Trimmed cells with fewer vertices than this are densified before the
/// inscribed-rectangle search.
pub const DEFAULT_DENSIFY_THRESHOLD: usize = 8;

/// How the target rectangle for a cell was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
    /// The cell was untrimmed; its own rectangle was used.
    Regular,
    /// Largest inscribed rectangle of the trimmed cell.
    Inscribed,
    /// Quadrilateral of trimmed-cell vertices nearest the cell corners.
    Cinched,
}

/// Why no content was placed in a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The cell lies entirely outside the boundary.
    OutsideBoundary,
    /// No catalog entry fits strictly inside the available rectangle.
    TooSmall { width: f64, depth: f64 },
}

/// A configuration placed in a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedContent {
    pub configuration: String,
    /// Maps the configuration's local footprint into place.
    pub transform: Transform,
    /// The rectangle the content was fitted into.
    pub target: Polygon,
    pub method: FitMethod,
    pub elements: Vec<PlacedElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Placed(PlacedContent),
    Skipped(SkipReason),
}

impl FitOutcome {
    #[must_use]
    pub fn placed(&self) -> Option<&PlacedContent> {
        match self {
            FitOutcome::Placed(content) => Some(content),
            FitOutcome::Skipped(_) => None,
        }
    }
}

/// Centers `config` in the rectangle `target`, whose first edge gives the
/// width direction and whose last edge gives the depth direction.
fn centered_transform(config: &ContentConfiguration, target: &[Point2; 4], width: f64, depth: f64) -> Transform {
    let x = direction(&target[0], &target[1]);
    let y = left_normal(x);
    // A target wound clockwise extends to the right of its first edge.
    let base = if (target[3] - target[0]).dot(&y) < 0.0 {
        target[3]
    } else {
        target[0]
    };
    let origin = base + x * ((width - config.width) * 0.5) + y * ((depth - config.depth) * 0.5);
    Transform::new(origin, x.y.atan2(x.x))
}

fn direction(a: &Point2, b: &Point2) -> Vector2 {
    Segment::new(*a, *b).direction()
}

/// Fits the best catalog entry into a rectangle of the given size.
///
/// `target` holds the rectangle corners, starting at a corner whose next
/// corner runs along the width.
#[must_use]
pub fn fit_rectangle(
    catalog: &Catalog,
    width: f64,
    depth: f64,
    target: &Polygon,
    method: FitMethod,
) -> FitOutcome {
    let Some(config) = catalog.select_best_fit(width, depth) else {
        return FitOutcome::Skipped(SkipReason::TooSmall { width, depth });
    };
    let corners = match target.vertices() {
        [a, b, c, d, ..] => [*a, *b, *c, *d],
        _ => return FitOutcome::Skipped(SkipReason::TooSmall { width, depth }),
    };
    let transform = centered_transform(config, &corners, width, depth);
    FitOutcome::Placed(PlacedContent {
        configuration: config.name.clone(),
        transform,
        target: target.clone(),
        method,
        elements: config.instantiate(&transform),
    })
}

/// Fits catalog content into the cells of a grid.
///
/// Untrimmed cells use their own rectangle. Trimmed cells use the largest
/// inscribed rectangle of their biggest piece, searched both in the plane's
/// axes and along that piece's longest edge; if the search fails, the
/// cinched quadrilateral is used instead.
#[derive(Debug, Clone)]
pub struct FitCell<'a, L> {
    catalog: &'a Catalog,
    grid: &'a Grid2d<L>,
    densify_threshold: usize,
}

impl<'a, L: Clone> FitCell<'a, L> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, grid: &'a Grid2d<L>) -> Self {
        Self {
            catalog,
            grid,
            densify_threshold: DEFAULT_DENSIFY_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_densify_threshold(mut self, threshold: usize) -> Self {
        self.densify_threshold = threshold;
        self
    }

    /// Fits one cell.
    ///
    /// # Errors
    ///
    /// Returns `GridError::CellOutOfRange` for an index outside the grid.
    pub fn execute(&self, index: CellIndex) -> Result<FitOutcome> {
        let rect = self.grid.cell_geometry(index)?;
        let segments = rect.segments();
        let width = segments[0].length();
        let depth = segments[1].length();
        let pieces = self.grid.trimmed_cell_geometry(index)?;

        let Some(largest) = pieces
            .iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
        else {
            return Ok(FitOutcome::Skipped(SkipReason::OutsideBoundary));
        };
        if !self.grid.is_trimmed(index)? {
            return Ok(fit_rectangle(self.catalog, width, depth, &rect, FitMethod::Regular));
        }

        let shape = if largest.perimeter().vertices().len() < self.densify_threshold {
            Profile::new(largest.perimeter().densified(), largest.voids().to_vec())
                .unwrap_or_else(|_| largest.clone())
        } else {
            largest.clone()
        };

        Ok(self.fit_trimmed(index, &shape, &rect))
    }

    /// Fits a trimmed piece: inscribed rectangle first, cinched
    /// quadrilateral when the search fails.
    fn fit_trimmed(&self, index: CellIndex, shape: &Profile, rect: &Polygon) -> FitOutcome {
        match self.inscribed(shape, &rect.segments()) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(?index, %err, "inscribed rectangle failed, cinching");
                self.cinched(shape, rect)
            }
        }
    }

    /// Fits every cell, U outer and V inner.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`FitCell::execute`].
    pub fn execute_all(&self) -> Result<Vec<(CellIndex, FitOutcome)>> {
        self.grid
            .cells()
            .map(|index| Ok((index, self.execute(index)?)))
            .collect()
    }

    fn inscribed(&self, shape: &Profile, cell_segments: &[Segment]) -> Result<FitOutcome> {
        let in_plane = largest_inscribed_rectangle(shape)?;

        let longest = shape.perimeter().longest_segment();
        let to_edge = Transform::from_x_axis(longest.start, longest.end - longest.start)?;
        let along_edge = largest_inscribed_rectangle(&shape.transformed(&to_edge.inverted()))?;

        let best = if in_plane.area() > along_edge.area() {
            in_plane.polygon()
        } else {
            along_edge.polygon().transformed(&to_edge)
        };

        let u_dir = cell_segments[0].direction();
        let v_dir = cell_segments[1].direction();
        let rect_segments = best.segments();
        let best_along = |dir: Vector2| {
            rect_segments
                .iter()
                .copied()
                .max_by(|a, b| a.direction().dot(&dir).total_cmp(&b.direction().dot(&dir)))
                .unwrap_or(rect_segments[0])
        };
        let width_seg = best_along(u_dir);
        let depth_seg = best_along(v_dir);
        let width = width_seg.length();
        let depth = depth_seg.length();
        let offset = depth_seg.direction() * depth;
        let target = Polygon::new(vec![
            width_seg.start,
            width_seg.end,
            width_seg.end + offset,
            width_seg.start + offset,
        ])?;
        Ok(fit_rectangle(self.catalog, width, depth, &target, FitMethod::Inscribed))
    }

    fn cinched(&self, shape: &Profile, rect: &Polygon) -> FitOutcome {
        let vertices = shape.perimeter().vertices();
        let nearest = |corner: &Point2| {
            vertices
                .iter()
                .copied()
                .min_by(|a, b| (a - corner).norm().total_cmp(&(b - corner).norm()))
                .unwrap_or(*corner)
        };
        let q: Vec<Point2> = rect.vertices().iter().map(nearest).collect();
        let width = (q[1] - q[0]).norm().min((q[2] - q[3]).norm());
        let depth = (q[2] - q[1]).norm().min((q[3] - q[0]).norm());
        match Polygon::new(q) {
            Ok(target) => fit_rectangle(self.catalog, width, depth, &target, FitMethod::Cinched),
            Err(_) => FitOutcome::Skipped(SkipReason::TooSmall { width, depth }),
        }
    }
}
