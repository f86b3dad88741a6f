//! Grid-based interior layout.
//!
//! Rooms are gridded along an orientation edge chosen from corridor access,
//! cells are filled with catalog content or banded into desk layouts, and
//! the wall candidates every room contributes are merged per level.

pub mod classify;
pub mod config;
pub mod desk;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod math;
pub mod partitions;

pub use error::{LayoutError, Result};
