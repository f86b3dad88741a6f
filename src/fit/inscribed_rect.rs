use crate::error::{FitError, Result};
use crate::geometry::{Polygon, Profile, Segment};
use crate::math::intersect_2d::segment_crosses_rect_interior;
use crate::math::polygon_2d::is_self_intersecting_2d;
use crate::math::{Point2, LENGTH_TOLERANCE, TOLERANCE};

/// Uniform subdivisions added on each axis on top of the vertex coordinates.
const GRID_RESOLUTION: usize = 24;

/// An axis-aligned rectangle, in the frame of the searched profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InscribedRect {
    pub min: Point2,
    pub max: Point2,
}

impl InscribedRect {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.depth()
    }

    #[must_use]
    pub fn polygon(&self) -> Polygon {
        Polygon::rectangle(self.min, self.max)
    }
}

/// Breakpoints along one axis: every vertex coordinate plus a uniform
/// subdivision of the range, sorted with near-duplicates removed.
fn breakpoints(coords: impl Iterator<Item = f64>, lo: f64, hi: f64) -> Vec<f64> {
    let mut values: Vec<f64> = coords.collect();
    #[allow(clippy::cast_precision_loss)]
    let step = (hi - lo) / GRID_RESOLUTION as f64;
    #[allow(clippy::cast_precision_loss)]
    values.extend((0..=GRID_RESOLUTION).map(|i| lo + step * i as f64));
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| (*a - *b).abs() < LENGTH_TOLERANCE);
    values
}

/// Finds a large axis-aligned rectangle inside `profile`.
///
/// The plane is cut into a compressed grid along the profile's vertex
/// coordinates and a uniform subdivision. A grid cell is usable when its
/// center lies inside the profile and no boundary edge crosses its interior.
/// The result is the largest-area rectangle made of usable cells.
///
/// # Errors
///
/// Returns `FitError::InscribedRectangle` if the profile is degenerate,
/// self-intersecting, or has no usable cell.
pub fn largest_inscribed_rectangle(profile: &Profile) -> Result<InscribedRect> {
    let perimeter = profile.perimeter();
    if perimeter.area() < TOLERANCE {
        return Err(FitError::InscribedRectangle("degenerate polygon".into()).into());
    }
    if is_self_intersecting_2d(perimeter.vertices()) {
        return Err(FitError::InscribedRectangle("self-intersecting polygon".into()).into());
    }

    let bounds = profile.bounds();
    let edges: Vec<Segment> = profile.segments();
    let points: Vec<Point2> = edges.iter().map(|s| s.start).collect();
    let xs = breakpoints(points.iter().map(|p| p.x), bounds.min.x, bounds.max.x);
    let ys = breakpoints(points.iter().map(|p| p.y), bounds.min.y, bounds.max.y);
    let (nx, ny) = (xs.len() - 1, ys.len() - 1);

    let usable: Vec<Vec<bool>> = (0..nx)
        .map(|i| {
            (0..ny)
                .map(|j| {
                    let min = Point2::new(xs[i], ys[j]);
                    let max = Point2::new(xs[i + 1], ys[j + 1]);
                    let center = Point2::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
                    profile.contains(&center)
                        && !edges
                            .iter()
                            .any(|e| segment_crosses_rect_interior(&e.start, &e.end, &min, &max))
                })
                .collect()
        })
        .collect();

    let mut best: Option<InscribedRect> = None;
    let mut column_ok = vec![true; ny];
    for i0 in 0..nx {
        column_ok.fill(true);
        for i1 in i0..nx {
            for (j, ok) in column_ok.iter_mut().enumerate() {
                *ok &= usable[i1][j];
            }
            let mut run_start = None;
            for j in 0..=ny {
                let ok = j < ny && column_ok[j];
                match (ok, run_start) {
                    (true, None) => run_start = Some(j),
                    (false, Some(start)) => {
                        let candidate = InscribedRect {
                            min: Point2::new(xs[i0], ys[start]),
                            max: Point2::new(xs[i1 + 1], ys[j]),
                        };
                        if best.map_or(true, |b| candidate.area() > b.area()) {
                            best = Some(candidate);
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
            if !column_ok.iter().any(|ok| *ok) {
                break;
            }
        }
    }

    best.ok_or_else(|| FitError::InscribedRectangle("no interior cell".into()).into())
}
