pub mod bounds;
pub mod polygon;
pub mod profile;
pub mod segment;
pub mod transform;

pub use bounds::Aabb2;
pub use polygon::Polygon;
pub use profile::Profile;
pub use segment::Segment;
pub use transform::Transform;
