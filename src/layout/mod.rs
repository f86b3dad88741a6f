//! Room and level orchestration: orientation, gridding, fitting and desk
//! layout, with failures reported as warnings.

pub mod by_fit;
pub mod desks;
pub mod warning;

pub use by_fit::{layout_level_by_fit, layout_room_by_fit, LevelFit, LevelInput, RoomFit};
pub use desks::{desk_orientation, layout_desks_in_room, RoomDesks};
pub use warning::LayoutWarning;
