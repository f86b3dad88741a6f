use std::f64::consts::FRAC_PI_2;

use geo::BooleanOps;
use tracing::debug;

use crate::config::{check_ranges, density_check, AvoidanceStrategy, DeskSection};
use crate::error::Result;
use crate::fit::{ContentConfiguration, PlacedElement};
use crate::geometry::{Polygon, Profile, Transform};
use crate::grid::{CellIndex, CellRoles, FixedDivisionMode, Grid1d, Grid2d, PatternMode};
use crate::layout::LayoutWarning;
use crate::math::Point2;

use super::collab::{carve_collaboration, CollabCadence};
use super::columns::ColumnIndex;
use super::seats::{is_double_sided, seats_per_desk};

/// Distance around a cell searched for columns when culling.
pub const CULL_SEARCH_DISTANCE: f64 = 0.3;

/// Desk runs with more than four and fewer than seven desks use three-desk
/// runs instead, so no near-empty run is left at the end.
const SHORT_RUN_RANGE: (usize, usize) = (4, 7);

/// Label of one band of a desk grid axis.
///
/// The V axis alternates `Desk` columns and `Aisle`s; the U axis alternates
/// `Forward` and `Backward` desk rows with back-to-back `Aisle`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Desk,
    Aisle,
    Forward,
    Backward,
}

/// Which way a desk row faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Forward,
    Backward,
}

/// What a cell of a desk grid is used for. Aisle cells carry no role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeskRole {
    Desk(Facing),
    /// A desk column crossing a row without a facing (a remainder row).
    Unoriented,
    Collab,
}

/// Why a desk cell received no desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeskSkip {
    /// The room boundary cuts into the cell.
    Trimmed,
    /// A column stands in or touches the cell.
    Column,
    /// The cell's row has no facing.
    Unoriented,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedDesk {
    pub cell: CellIndex,
    pub facing: Facing,
    pub transform: Transform,
    /// The desk's rectangle in level space.
    pub footprint: Polygon,
    pub seats: u32,
    pub elements: Vec<PlacedElement>,
}

/// Result of laying desks out in one grid.
#[derive(Debug, Clone)]
pub struct DeskLayout {
    /// The grid after desk banding.
    pub grid: Grid2d<Band>,
    pub roles: CellRoles<DeskRole>,
    pub desks: Vec<PlacedDesk>,
    pub skipped: Vec<(CellIndex, DeskSkip)>,
    pub seat_count: u32,
    /// Merged outlines of the untrimmed collaboration cells.
    pub collab_profiles: Vec<Profile>,
    pub warnings: Vec<LayoutWarning>,
}

/// Lays desks out in an oriented grid.
///
/// The V axis is banded into desk columns (desk width) separated by aisles,
/// the U axis into facing desk rows (desk depth) separated by back-to-back
/// gaps. Collaboration space then replaces some desks, and every remaining
/// whole desk cell receives one desk.
#[derive(Debug, Clone)]
pub struct LayoutDesks<'a> {
    desk: &'a ContentConfiguration,
    aisle_width: f64,
    back_to_back_width: f64,
    collaboration_density: f64,
    avoidance: AvoidanceStrategy,
    columns: Option<&'a ColumnIndex>,
}

impl<'a> LayoutDesks<'a> {
    #[must_use]
    pub fn new(desk: &'a ContentConfiguration, settings: &DeskSection) -> Self {
        Self {
            desk,
            aisle_width: settings.aisle_width,
            back_to_back_width: settings.back_to_back_width,
            collaboration_density: settings.collaboration_density,
            avoidance: settings.column_avoidance,
            columns: None,
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: &'a ColumnIndex) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Bands `grid` and places desks.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidLength` if the desk size, aisle width or
    /// back-to-back width is not positive, and `ConfigError::OutOfRange` for
    /// a collaboration density outside [0, 1).
    pub fn execute(&self, grid: &Grid2d<Band>) -> Result<DeskLayout> {
        check_ranges(&[density_check(self.collaboration_density)])?;
        let mut grid = grid.clone();
        let cross = self.cross_pattern(grid.v().domain().length())?;
        grid.v_mut()
            .divide_by_pattern(&cross, PatternMode::Cycle, FixedDivisionMode::RemainderAtBothEnds)?;
        grid.u_mut().divide_by_pattern(
            &self.row_pattern(),
            PatternMode::Cycle,
            FixedDivisionMode::RemainderAtBothEnds,
        )?;

        let in_aisles = desk_cells_in_aisle_rows(&grid);
        if !in_aisles.is_empty() {
            debug!(count = in_aisles.len(), cells = ?in_aisles, "no desk direction in aisle rows");
        }
        let mut roles = initial_roles(&grid);
        if let Some(cadence) = CollabCadence::from_density(self.collaboration_density) {
            roles = carve_collaboration(&grid, roles, cadence);
        }

        let seats = seats_per_desk(&self.desk.name);
        let mut desks = Vec::new();
        let mut skipped = Vec::new();
        let mut warnings = Vec::new();
        for (index, role) in roles.iter() {
            let facing = match role {
                DeskRole::Collab => continue,
                DeskRole::Desk(facing) => Some(facing),
                DeskRole::Unoriented => None,
            };
            if grid.is_trimmed(index)? {
                skipped.push((index, DeskSkip::Trimmed));
                continue;
            }
            let cell = grid.cell_geometry(index)?;
            if self.blocked_by_column(&cell) {
                debug!(?index, "desk culled by column");
                skipped.push((index, DeskSkip::Column));
                continue;
            }
            let Some(facing) = facing else {
                LayoutWarning::UnorientedDeskCell { cell: index }.emit(&mut warnings);
                skipped.push((index, DeskSkip::Unoriented));
                continue;
            };
            let transform = desk_transform(grid.orientation(), &cell, facing);
            desks.push(PlacedDesk {
                cell: index,
                facing,
                transform,
                footprint: Polygon::rectangle(
                    Point2::origin(),
                    Point2::new(self.desk.width, self.desk.depth),
                )
                .transformed(&transform),
                seats,
                elements: self.desk.instantiate(&transform),
            });
        }

        let seat_count = desks.iter().map(|d| d.seats).sum();
        let collab_profiles = collab_profiles(&grid, &roles)?;
        Ok(DeskLayout {
            grid,
            roles,
            desks,
            skipped,
            seat_count,
            collab_profiles,
            warnings,
        })
    }

    /// Desk columns come in runs of four, or three when four would leave a
    /// short trailing run.
    fn cross_pattern(&self, length: f64) -> Result<Vec<(Band, f64)>> {
        let run = |desks: usize| {
            let mut pattern = vec![(Band::Desk, self.desk.width); desks];
            pattern.push((Band::Aisle, self.aisle_width));
            pattern
        };
        let mut trial: Grid1d<Band> = Grid1d::from_length(length)?;
        trial.divide_by_pattern(&run(4), PatternMode::Cycle, FixedDivisionMode::RemainderAtBothEnds)?;
        let count = trial.count_of(&Band::Desk);
        let (low, high) = SHORT_RUN_RANGE;
        Ok(if count > low && count < high { run(3) } else { run(4) })
    }

    fn row_pattern(&self) -> Vec<(Band, f64)> {
        let depth = self.desk.depth;
        if is_double_sided(&self.desk.name) {
            vec![(Band::Forward, depth), (Band::Aisle, self.back_to_back_width)]
        } else {
            vec![
                (Band::Aisle, self.back_to_back_width),
                (Band::Forward, depth),
                (Band::Backward, depth),
            ]
        }
    }

    fn blocked_by_column(&self, cell: &Polygon) -> bool {
        let Some(columns) = self.columns else {
            return false;
        };
        if self.avoidance != AvoidanceStrategy::Cull {
            return false;
        }
        columns
            .find_within_bounds(&cell.bounds(), CULL_SEARCH_DISTANCE)
            .iter()
            .any(|(_, c)| cell.contains(&c.location) || c.profile.intersects(cell))
    }
}

/// Roles straight from the banding: every desk column cell gets its row's
/// facing, or `Unoriented` in a remainder row.
fn initial_roles(grid: &Grid2d<Band>) -> CellRoles<DeskRole> {
    grid.cells()
        .filter_map(|index| match grid.cell_labels(index) {
            (Some(Band::Forward), Some(Band::Desk)) => Some((index, DeskRole::Desk(Facing::Forward))),
            (Some(Band::Backward), Some(Band::Desk)) => {
                Some((index, DeskRole::Desk(Facing::Backward)))
            }
            (None, Some(Band::Desk)) => Some((index, DeskRole::Unoriented)),
            _ => None,
        })
        .collect()
}

/// Desk column cells crossed by a back-to-back aisle row. They take no role.
fn desk_cells_in_aisle_rows(grid: &Grid2d<Band>) -> Vec<CellIndex> {
    grid.cells()
        .filter(|index| grid.cell_labels(*index) == (Some(Band::Aisle), Some(Band::Desk)))
        .collect()
}

/// Forward desks are turned a quarter left from the grid and anchored at the
/// cell's far-U near-V corner; backward desks a quarter right, anchored at
/// the near-U far-V corner.
fn desk_transform(orientation: &Transform, cell: &Polygon, facing: Facing) -> Transform {
    let corners = cell.vertices();
    match facing {
        Facing::Forward => Transform::new(corners[1], orientation.angle() + FRAC_PI_2),
        Facing::Backward => Transform::new(corners[3], orientation.angle() - FRAC_PI_2),
    }
}

fn collab_profiles(grid: &Grid2d<Band>, roles: &CellRoles<DeskRole>) -> Result<Vec<Profile>> {
    let mut merged = geo::MultiPolygon::<f64>::new(Vec::new());
    for index in roles.cells_with(DeskRole::Collab) {
        if !grid.is_trimmed(index)? {
            let cell = geo::MultiPolygon::new(vec![grid.cell_geometry(index)?.to_geo()]);
            merged = merged.union(&cell);
        }
    }
    merged.iter().map(Profile::from_geo).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::desk::columns::Column;
    use approx::assert_relative_eq;
    use std::collections::BTreeSet;

    const DESK_WIDTH: f64 = 2.0;
    const DESK_DEPTH: f64 = 1.0;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn settings() -> DeskSection {
        DeskSection {
            aisle_width: 1.0,
            back_to_back_width: 1.0,
            ..DeskSection::default()
        }
    }

    fn grid_over(boundary: &Profile) -> Grid2d<Band> {
        Grid2d::new(boundary, Transform::identity()).unwrap()
    }

    /// 10 along U; across V, six desks and one aisle.
    fn open_plan() -> Profile {
        Profile::from_perimeter(Polygon::rectangle(p(0.0, 0.0), p(10.0, 6.0 * DESK_WIDTH + 1.0)))
    }

    fn desk_columns(layout: &DeskLayout) -> BTreeSet<usize> {
        layout.desks.iter().map(|d| d.cell.v).collect()
    }

    #[test]
    fn six_desks_across_use_two_runs_of_three() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&open_plan()))
            .unwrap();

        let labels: Vec<Option<Band>> = layout.grid.v().cells().iter().map(|c| c.label).collect();
        let d = Some(Band::Desk);
        assert_eq!(labels, vec![d, d, d, Some(Band::Aisle), d, d, d]);
        assert_eq!(desk_columns(&layout).len(), 6);
        // Rows: remainder, then A F B three times, then remainder.
        assert_eq!(layout.desks.len(), 36);
        assert_eq!(layout.seat_count, 36);
        // Desk columns crossing the two remainder rows have no facing.
        assert_eq!(layout.warnings.len(), 12);
    }

    #[test]
    fn five_desks_across_split_three_and_two() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let boundary =
            Profile::from_perimeter(Polygon::rectangle(p(0.0, 0.0), p(10.0, 5.0 * DESK_WIDTH + 1.0)));
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&boundary))
            .unwrap();
        assert_eq!(layout.grid.v().count_of(&Band::Desk), 5);
        assert_eq!(layout.grid.v().cells()[3].label, Some(Band::Aisle));
    }

    #[test]
    fn long_runs_keep_four_desks() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let boundary =
            Profile::from_perimeter(Polygon::rectangle(p(0.0, 0.0), p(10.0, 8.0 * DESK_WIDTH + 1.0)));
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&boundary))
            .unwrap();
        assert_eq!(layout.grid.v().cells()[4].label, Some(Band::Aisle));
        assert_eq!(layout.grid.v().count_of(&Band::Desk), 8);
    }

    #[test]
    fn desk_footprint_fills_its_cell() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&open_plan()))
            .unwrap();
        for placed in layout.desks.iter().take(12) {
            let cell = layout.grid.cell_geometry(placed.cell).unwrap().bounds();
            let footprint = placed.footprint.bounds();
            assert_relative_eq!(footprint.min.x, cell.min.x, epsilon = 1e-9);
            assert_relative_eq!(footprint.min.y, cell.min.y, epsilon = 1e-9);
            assert_relative_eq!(footprint.max.x, cell.max.x, epsilon = 1e-9);
            assert_relative_eq!(footprint.max.y, cell.max.y, epsilon = 1e-9);
        }
        let facings: BTreeSet<bool> = layout
            .desks
            .iter()
            .map(|d| d.facing == Facing::Forward)
            .collect();
        assert_eq!(facings.len(), 2);
    }

    #[test]
    fn double_desks_are_single_loaded_and_count_two_seats() {
        let desk = ContentConfiguration::new("Double Desk", DESK_WIDTH, DESK_DEPTH);
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&open_plan()))
            .unwrap();
        let rows: Vec<Option<Band>> = layout.grid.u().cells().iter().map(|c| c.label).collect();
        assert!(!rows.contains(&Some(Band::Backward)));
        assert!(layout.desks.iter().all(|d| d.facing == Facing::Forward));
        assert_eq!(layout.seat_count, 2 * u32::try_from(layout.desks.len()).unwrap());
    }

    #[test]
    fn collaboration_space_replaces_desks() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let settings = DeskSection {
            collaboration_density: 0.75,
            ..settings()
        };
        let layout = LayoutDesks::new(&desk, &settings)
            .execute(&grid_over(&open_plan()))
            .unwrap();
        // Every second row group, two leading columns per run.
        assert_eq!(layout.roles.count(DeskRole::Collab), 8);
        assert_eq!(layout.desks.len(), 28);
        assert_eq!(layout.collab_profiles.len(), 2);
        let area: f64 = layout.collab_profiles.iter().map(Profile::area).sum();
        assert_relative_eq!(area, 8.0 * DESK_WIDTH * DESK_DEPTH, epsilon = 1e-6);
    }

    #[test]
    fn culling_skips_cells_with_columns() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let columns: ColumnIndex = [Column {
            location: p(2.0, 1.0),
            profile: Polygon::rectangle(p(1.8, 0.8), p(2.2, 1.2)),
        }]
        .into_iter()
        .collect();

        let culled = LayoutDesks::new(&desk, &settings())
            .with_columns(&columns)
            .execute(&grid_over(&open_plan()))
            .unwrap();
        assert_eq!(culled.desks.len(), 35);
        assert!(culled
            .skipped
            .contains(&(CellIndex::new(2, 0), DeskSkip::Column)));

        let ignored = DeskSection {
            column_avoidance: AvoidanceStrategy::None,
            ..settings()
        };
        let kept = LayoutDesks::new(&desk, &ignored)
            .with_columns(&columns)
            .execute(&grid_over(&open_plan()))
            .unwrap();
        assert_eq!(kept.desks.len(), 36);
    }

    #[test]
    fn trimmed_cells_get_no_desk() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let boundary = Profile::new(
            Polygon::rectangle(p(0.0, 0.0), p(10.0, 13.0)),
            vec![Polygon::rectangle(p(1.6, 0.5), p(2.4, 1.5))],
        )
        .unwrap();
        let layout = LayoutDesks::new(&desk, &settings())
            .execute(&grid_over(&boundary))
            .unwrap();
        assert_eq!(layout.desks.len(), 35);
        assert!(layout
            .skipped
            .contains(&(CellIndex::new(2, 0), DeskSkip::Trimmed)));
    }

    #[test]
    fn aisle_rows_over_desk_columns_take_no_role() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let operation = LayoutDesks::new(&desk, &settings());
        let mut grid = grid_over(&open_plan());
        grid.u_mut()
            .divide_by_pattern(
                &operation.row_pattern(),
                PatternMode::Cycle,
                FixedDivisionMode::RemainderAtBothEnds,
            )
            .unwrap();
        grid.v_mut()
            .divide_by_pattern(
                &[(Band::Desk, DESK_WIDTH)],
                PatternMode::Cycle,
                FixedDivisionMode::RemainderAtBothEnds,
            )
            .unwrap();

        let in_aisles = desk_cells_in_aisle_rows(&grid);
        // Three aisle rows across six desk columns.
        assert_eq!(in_aisles.len(), 18);
        let roles = initial_roles(&grid);
        assert!(in_aisles.iter().all(|index| roles.get(*index).is_none()));
    }

    #[test]
    fn density_outside_unit_range_is_an_error() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        for density in [1.0, -0.1, f64::NAN] {
            let settings = DeskSection {
                collaboration_density: density,
                ..settings()
            };
            assert!(LayoutDesks::new(&desk, &settings)
                .execute(&grid_over(&open_plan()))
                .is_err());
        }
    }

    #[test]
    fn non_positive_aisle_is_an_error() {
        let desk = ContentConfiguration::new("Simple Desk", DESK_WIDTH, DESK_DEPTH);
        let settings = DeskSection {
            aisle_width: 0.0,
            ..settings()
        };
        assert!(LayoutDesks::new(&desk, &settings)
            .execute(&grid_over(&open_plan()))
            .is_err());
    }
}
