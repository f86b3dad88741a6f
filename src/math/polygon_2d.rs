use super::intersect_2d::segment_segment_intersect_2d;
use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Computes the area centroid of a simple polygon.
///
/// Falls back to the vertex average when the polygon has no area.
#[must_use]
pub fn centroid_2d(points: &[Point2]) -> Point2 {
    let n = points.len();
    if n == 0 {
        return Point2::origin();
    }
    let area = signed_area_2d(points);
    if area.abs() < TOLERANCE {
        let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
        #[allow(clippy::cast_precision_loss)]
        return Point2::from(sum / n as f64);
    }
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let f = points[i].x * points[j].y - points[j].x * points[i].y;
        cx += (points[i].x + points[j].x) * f;
        cy += (points[i].y + points[j].y) * f;
    }
    Point2::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// Even-odd point-in-polygon test.
///
/// Points exactly on the boundary may land on either side.
#[must_use]
pub fn point_in_polygon_2d(point: &Point2, points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&points[i], &points[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Checks if any two non-adjacent edges of a closed polygon cross.
#[must_use]
pub fn is_self_intersecting_2d(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let a0 = points[i];
        let a1 = points[(i + 1) % n];
        for j in (i + 2)..n {
            // Skip the pair that shares the closing vertex.
            if i == 0 && j == n - 1 {
                continue;
            }
            let b0 = points[j];
            let b1 = points[(j + 1) % n];
            if segment_segment_intersect_2d(&a0, &a1, &b0, &b1).is_some() {
                return true;
            }
        }
    }
    false
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}
