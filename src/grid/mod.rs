pub mod cell;
pub mod grid_1d;
pub mod grid_2d;

pub use cell::{CellIndex, CellRoles};
pub use grid_1d::{
    Cell1d, Domain1d, EvenDivisionMode, FixedDivisionMode, Grid1d, PatternMode,
};
pub use grid_2d::{Axis, Grid2d, TRIM_AREA_TOLERANCE};
