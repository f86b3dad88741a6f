use crate::classify::find_edge_adjacent_to_segments;
use crate::config::LayoutSettings;
use crate::desk::{valid_grids, Band, ColumnIndex, DeskLayout, LayoutDesks};
use crate::error::Result;
use crate::fit::Catalog;
use crate::geometry::{Profile, Segment, Transform};
use crate::grid::Grid2d;
use crate::math::Point2;

use super::warning::LayoutWarning;

/// Desks laid out in one room, across all of its usable grids.
#[derive(Debug, Clone, Default)]
pub struct RoomDesks {
    pub room: usize,
    pub layouts: Vec<DeskLayout>,
    pub desk_count: usize,
    pub seat_count: u32,
    pub collab_profiles: Vec<Profile>,
    pub warnings: Vec<LayoutWarning>,
}

/// Grid orientation for a desk room: along the edge with the best corridor
/// access, turned by `rotation` radians.
///
/// # Errors
///
/// Returns `ClassifyError::NoEdges` for a boundary without edges.
pub fn desk_orientation(boundary: &Profile, corridors: &[Segment], rotation: f64) -> Result<Transform> {
    let access = find_edge_adjacent_to_segments(&boundary.perimeter().segments(), corridors)?;
    let direction = Transform::rotation(rotation).of_vector(&(access.edge.end - access.edge.start));
    Transform::from_x_axis(Point2::origin(), direction)
}

/// Lays desks out in a room.
///
/// The configured desk type is looked up in `catalog`, the room is gridded
/// along its corridor edge, columns are avoided per the configured strategy,
/// and each usable grid is banded and filled independently.
#[must_use]
pub fn layout_desks_in_room(
    room: usize,
    boundary: &Profile,
    corridors: &[Segment],
    catalog: &Catalog,
    columns: &ColumnIndex,
    settings: &LayoutSettings,
) -> RoomDesks {
    let mut out = RoomDesks {
        room,
        ..RoomDesks::default()
    };
    let Some(desk) = catalog.get(&settings.desk.desk_type) else {
        LayoutWarning::MissingConfiguration {
            room,
            name: settings.desk.desk_type.clone(),
        }
        .emit(&mut out.warnings);
        return out;
    };
    let Ok(orientation) = desk_orientation(boundary, corridors, settings.grid_rotation_radians()) else {
        LayoutWarning::NoOrientation { room }.emit(&mut out.warnings);
        return out;
    };

    let grids = Grid2d::<Band>::new(boundary, orientation)
        .and_then(|grid| valid_grids(&grid, columns, settings.desk.column_avoidance));
    let grids = match grids {
        Ok(grids) => grids,
        Err(err) => {
            LayoutWarning::GridConstruction {
                room,
                reason: err.to_string(),
            }
            .emit(&mut out.warnings);
            return out;
        }
    };

    let operation = LayoutDesks::new(desk, &settings.desk).with_columns(columns);
    for grid in &grids {
        match operation.execute(grid) {
            Ok(mut layout) => {
                out.desk_count += layout.desks.len();
                out.seat_count += layout.seat_count;
                out.collab_profiles.extend(layout.collab_profiles.iter().cloned());
                out.warnings.append(&mut layout.warnings);
                out.layouts.push(layout);
            }
            Err(err) => LayoutWarning::GridConstruction {
                room,
                reason: err.to_string(),
            }
            .emit(&mut out.warnings),
        }
    }
    out
}
