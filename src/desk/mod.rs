//! Open-plan desk layout: desk and aisle banding, collaboration space and
//! column avoidance.

pub mod collab;
pub mod columns;
pub mod layout;
pub mod seats;

pub use collab::{carve_collaboration, CollabCadence};
pub use columns::{valid_grids, Column, ColumnIndex, ColumnKey, DEFAULT_BUCKET_SIZE};
pub use layout::{
    Band, DeskLayout, DeskRole, DeskSkip, Facing, LayoutDesks, PlacedDesk, CULL_SEARCH_DISTANCE,
};
pub use seats::{is_double_sided, seats_per_desk};
