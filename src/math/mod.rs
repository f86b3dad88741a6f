pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 2D rigid transformation (rotation followed by translation).
pub type Isometry2 = nalgebra::Isometry2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-9;

/// Tolerance used when comparing lengths that come out of accumulated sums,
/// e.g. cell boundaries produced by repeated pattern lengths.
pub const LENGTH_TOLERANCE: f64 = 1e-6;

/// 2D cross product (z component of the 3D cross product).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
