use tracing::debug;

use crate::classify::{wall_candidate_options, WallCandidate};
use crate::config::LayoutSettings;
use crate::fit::{Catalog, FitCell, FitOutcome, PlacedContent, SkipReason};
use crate::geometry::{Profile, Segment, Transform};
use crate::grid::{CellIndex, Grid2d};
use crate::math::Point2;
use crate::partitions::{InteriorPartitionCandidate, LevelId};

use super::warning::LayoutWarning;

/// The rooms of one level together with what they are laid out against.
#[derive(Debug, Clone)]
pub struct LevelInput {
    pub level: LevelId,
    pub transform: Transform,
    /// Wall height; the configured default is used when absent.
    pub height: Option<f64>,
    pub rooms: Vec<Profile>,
    /// Corridor and core edges that give rooms their orientation.
    pub corridors: Vec<Segment>,
    /// Outer floor boundary, used when there are no corridors.
    pub floor: Option<Profile>,
}

/// Content fitted into one room.
#[derive(Debug, Clone, Default)]
pub struct RoomFit {
    pub room: usize,
    /// The orientation edge that produced the layout, if any did.
    pub orientation_edge: Option<Segment>,
    pub placed: Vec<(CellIndex, PlacedContent)>,
    pub skipped: Vec<(CellIndex, SkipReason)>,
    pub wall_candidates: Vec<WallCandidate>,
    pub warnings: Vec<LayoutWarning>,
}

/// Every room of a level plus the level's partition candidate.
#[derive(Debug, Clone)]
pub struct LevelFit {
    pub level: LevelId,
    pub rooms: Vec<RoomFit>,
    pub partitions: Option<InteriorPartitionCandidate>,
}

impl LevelFit {
    pub fn warnings(&self) -> impl Iterator<Item = &LayoutWarning> {
        self.rooms.iter().flat_map(|r| r.warnings.iter())
    }
}

/// Fits catalog content into a room, trying orientation edges best first.
///
/// For each option the room gets an undivided grid aligned to the option's
/// edge, and every cell is fitted. The first option that places anything
/// wins and contributes its wall candidates. With an empty catalog the
/// first option wins outright.
#[must_use]
pub fn layout_room_by_fit(
    room: usize,
    boundary: &Profile,
    corridors: &[Segment],
    floor: Option<&Profile>,
    catalog: &Catalog,
    settings: &LayoutSettings,
) -> RoomFit {
    let mut fit = RoomFit {
        room,
        ..RoomFit::default()
    };
    let edges = boundary.perimeter().segments();
    for option in wall_candidate_options(&edges, floor, corridors, None) {
        let edge = option.orientation_edge;
        let Ok(orientation) = Transform::from_x_axis(Point2::origin(), edge.end - edge.start) else {
            continue;
        };
        let grid: Grid2d = match Grid2d::new(boundary, orientation) {
            Ok(grid) => grid,
            Err(err) => {
                LayoutWarning::DegenerateBoundary {
                    room,
                    reason: err.to_string(),
                }
                .emit(&mut fit.warnings);
                return fit;
            }
        };
        let outcomes = match FitCell::new(catalog, &grid)
            .with_densify_threshold(settings.fit.densify_threshold)
            .execute_all()
        {
            Ok(outcomes) => outcomes,
            Err(err) => {
                LayoutWarning::GridConstruction {
                    room,
                    reason: err.to_string(),
                }
                .emit(&mut fit.warnings);
                continue;
            }
        };

        let mut placed = Vec::new();
        let mut skipped = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                FitOutcome::Placed(content) => placed.push((index, content)),
                FitOutcome::Skipped(reason) => skipped.push((index, reason)),
            }
        }
        if placed.is_empty() && !catalog.is_empty() {
            debug!(room, ?edge, "nothing fits along this edge");
            continue;
        }
        fit.orientation_edge = Some(edge);
        fit.placed = placed;
        fit.skipped = skipped;
        fit.wall_candidates = option.candidates;
        return fit;
    }

    LayoutWarning::NoOrientation { room }.emit(&mut fit.warnings);
    fit
}

/// Lays out every room of a level by fit.
///
/// Rooms are independent of each other. With `create_walls` the wall
/// candidates of all rooms are gathered into one partition candidate for
/// the level.
#[must_use]
pub fn layout_level_by_fit(
    level: &LevelInput,
    catalog: &Catalog,
    settings: &LayoutSettings,
    create_walls: bool,
) -> LevelFit {
    let rooms: Vec<RoomFit> = level
        .rooms
        .iter()
        .enumerate()
        .map(|(i, boundary)| {
            layout_room_by_fit(
                i,
                boundary,
                &level.corridors,
                level.floor.as_ref(),
                catalog,
                settings,
            )
        })
        .collect();

    let partitions = create_walls.then(|| InteriorPartitionCandidate {
        level: level.level,
        wall_candidates: rooms
            .iter()
            .flat_map(|r| r.wall_candidates.iter().copied())
            .collect(),
        height: level.height.unwrap_or(settings.walls.default_height),
        level_transform: level.transform,
    });

    LevelFit {
        level: level.level,
        rooms,
        partitions,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::WallType;
    use crate::fit::{ContentConfiguration, FitMethod};
    use crate::geometry::Polygon;
    use crate::partitions::{merge_level_partitions, DEFAULT_COLLINEAR_TOLERANCE};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn room(min: (f64, f64), max: (f64, f64)) -> Profile {
        Profile::from_perimeter(Polygon::rectangle(p(min.0, min.1), p(max.0, max.1)))
    }

    fn catalog() -> Catalog {
        [
            ContentConfiguration::new("boardroom", 12.0, 8.0),
            ContentConfiguration::new("meeting", 4.0, 3.0),
        ]
        .into_iter()
        .collect()
    }

    fn corridor() -> Vec<Segment> {
        vec![Segment::from_coords(-5.0, -1.0, 25.0, -1.0)]
    }

    #[test]
    fn fits_content_and_contributes_walls() {
        init_tracing();
        let fit = layout_room_by_fit(
            0,
            &room((0.0, 0.0), (10.0, 6.0)),
            &corridor(),
            None,
            &catalog(),
            &LayoutSettings::default(),
        );
        assert!(fit.warnings.is_empty());
        let edge = fit.orientation_edge.unwrap();
        assert_relative_eq!(edge.mid().y, 0.0, epsilon = 1e-12);
        assert_eq!(fit.placed.len(), 1);
        assert_eq!(fit.placed[0].1.configuration, "meeting");
        assert_eq!(fit.placed[0].1.method, FitMethod::Regular);
        assert_eq!(fit.wall_candidates.len(), 4);
        assert_eq!(fit.wall_candidates[0].wall_type, WallType::Glass);
    }

    #[test]
    fn empty_catalog_still_contributes_walls() {
        let fit = layout_room_by_fit(
            0,
            &room((0.0, 0.0), (10.0, 6.0)),
            &corridor(),
            None,
            &Catalog::new(),
            &LayoutSettings::default(),
        );
        assert!(fit.placed.is_empty());
        assert_eq!(fit.wall_candidates.len(), 4);
        assert!(fit.warnings.is_empty());
    }

    #[test]
    fn nothing_fits_in_any_orientation() {
        init_tracing();
        let fit = layout_room_by_fit(
            3,
            &room((0.0, 0.0), (3.0, 2.0)),
            &corridor(),
            None,
            &catalog(),
            &LayoutSettings::default(),
        );
        assert!(fit.wall_candidates.is_empty());
        assert_eq!(fit.warnings, vec![LayoutWarning::NoOrientation { room: 3 }]);
    }

    #[test]
    fn sliver_room_is_skipped() {
        let fit = layout_room_by_fit(
            0,
            &room((0.0, 0.0), (10.0, 1e-8)),
            &[],
            None,
            &catalog(),
            &LayoutSettings::default(),
        );
        assert!(matches!(
            fit.warnings.as_slice(),
            [LayoutWarning::DegenerateBoundary { room: 0, .. }]
        ));
    }

    #[test]
    fn level_gathers_walls_of_every_room() {
        let level = LevelInput {
            level: LevelId(2),
            transform: Transform::identity(),
            height: None,
            rooms: vec![room((0.0, 0.0), (10.0, 6.0)), room((10.0, 0.0), (20.0, 6.0))],
            corridors: corridor(),
            floor: None,
        };
        let result = layout_level_by_fit(&level, &catalog(), &LayoutSettings::default(), true);
        assert_eq!(result.rooms.len(), 2);
        assert_eq!(result.warnings().count(), 0);

        let partitions = result.partitions.unwrap();
        assert_eq!(partitions.wall_candidates.len(), 8);
        assert_relative_eq!(partitions.height, 3.0);

        // The shared wall at x = 10 is contributed twice and merged once.
        let merged = merge_level_partitions(&[partitions], DEFAULT_COLLINEAR_TOLERANCE);
        let shared = merged[0]
            .walls
            .iter()
            .filter(|w| (w.line.start.x - 10.0).abs() < 1e-9 && (w.line.end.x - 10.0).abs() < 1e-9)
            .count();
        assert_eq!(shared, 1);
    }

    #[test]
    fn no_partitions_without_walls() {
        let level = LevelInput {
            level: LevelId(0),
            transform: Transform::identity(),
            height: Some(4.0),
            rooms: vec![room((0.0, 0.0), (10.0, 6.0))],
            corridors: corridor(),
            floor: None,
        };
        let result = layout_level_by_fit(&level, &catalog(), &LayoutSettings::default(), false);
        assert!(result.partitions.is_none());
        assert_eq!(result.rooms[0].placed.len(), 1);
    }
}
