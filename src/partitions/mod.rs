pub mod dedup;

pub use dedup::{deduplicate_wall_lines, DeduplicateWalls, DEFAULT_COLLINEAR_TOLERANCE, MIN_WALL_LENGTH};

use crate::classify::WallCandidate;
use crate::geometry::Transform;

/// Wall height used when a level does not provide one.
pub const DEFAULT_WALL_HEIGHT: f64 = 3.0;

/// Identifies a building level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(pub u32);

/// The wall candidates of every room on one level, with the level's wall
/// height and placement. One is produced per level after all of its rooms
/// are laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct InteriorPartitionCandidate {
    pub level: LevelId,
    pub wall_candidates: Vec<WallCandidate>,
    pub height: f64,
    pub level_transform: Transform,
}

/// Deduplicated walls for one level, ready to be realized.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPartitions {
    pub level: LevelId,
    pub walls: Vec<WallCandidate>,
    pub height: f64,
    pub level_transform: Transform,
}

/// Groups partition candidates by level, in first-seen order, and
/// deduplicates each level's walls together.
///
/// Each level keeps the lowest height among its candidates and the transform
/// of its first candidate.
#[must_use]
pub fn merge_level_partitions(
    candidates: &[InteriorPartitionCandidate],
    tolerance: f64,
) -> Vec<LevelPartitions> {
    let mut levels: Vec<(LevelId, Vec<&InteriorPartitionCandidate>)> = Vec::new();
    for candidate in candidates {
        match levels.iter_mut().find(|(id, _)| *id == candidate.level) {
            Some((_, group)) => group.push(candidate),
            None => levels.push((candidate.level, vec![candidate])),
        }
    }

    levels
        .into_iter()
        .map(|(level, group)| {
            let all: Vec<WallCandidate> = group
                .iter()
                .flat_map(|c| c.wall_candidates.iter().copied())
                .collect();
            let height = group
                .iter()
                .map(|c| c.height)
                .reduce(f64::min)
                .unwrap_or(DEFAULT_WALL_HEIGHT);
            let level_transform = group
                .first()
                .map(|c| c.level_transform)
                .unwrap_or_default();
            LevelPartitions {
                level,
                walls: DeduplicateWalls::new(&all).with_tolerance(tolerance).execute(),
                height,
                level_transform,
            }
        })
        .collect()
}
