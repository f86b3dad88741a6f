use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let delta = p2 - p1;
    let t = cross_2d(&delta, d2) / cross;
    let u = cross_2d(&delta, d1) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel (including collinear) segments never intersect here.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t = t.clamp(0.0, 1.0);
        Some((a0 + da * t, t, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Checks whether the segment `a`→`b` passes through the open interior of the
/// axis-aligned rectangle `[min, max]` (Liang-Barsky clipping).
///
/// Touching the rectangle's boundary does not count.
#[must_use]
pub fn segment_crosses_rect_interior(a: &Point2, b: &Point2, min: &Point2, max: &Point2) -> bool {
    let eps = TOLERANCE * 10.0;
    let (lo_x, hi_x) = (min.x + eps, max.x - eps);
    let (lo_y, hi_y) = (min.y + eps, max.y - eps);
    if lo_x >= hi_x || lo_y >= hi_y {
        return false;
    }

    let d = b - a;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let checks = [
        (-d.x, a.x - lo_x),
        (d.x, hi_x - a.x),
        (-d.y, a.y - lo_y),
        (d.y, hi_y - a.y),
    ];
    for (p, q) in checks {
        if p.abs() < TOLERANCE {
            if q <= 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 >= t1 {
            return false;
        }
    }
    t1 - t0 > TOLERANCE
}
