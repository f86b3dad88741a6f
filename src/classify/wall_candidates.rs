use tracing::debug;

use crate::error::Result;
use crate::geometry::{Profile, Segment};
use crate::grid::{Axis, Grid2d};

use super::access_edge::{
    find_all_edges_adjacent_to_segments, find_edges_by_access, find_primary_access_edge,
    sort_edges_by_primary_access, AccessEdge,
};

/// The kind of interior wall a candidate line becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallType {
    Solid,
    Partition,
    Glass,
    /// A reference edge for glazing; never realized as a wall itself.
    GlassEdge,
}

impl WallType {
    /// Conflict-resolution rank; a higher value wins where walls overlap.
    /// `GlassEdge` has no rank and is ignored by deduplication.
    #[must_use]
    pub fn priority(self) -> Option<u8> {
        match self {
            WallType::Solid => Some(3),
            WallType::Partition => Some(2),
            WallType::Glass => Some(1),
            WallType::GlassEdge => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCandidate {
    pub line: Segment,
    pub wall_type: WallType,
}

impl WallCandidate {
    #[must_use]
    pub fn new(line: Segment, wall_type: WallType) -> Self {
        Self { line, wall_type }
    }
}

/// Wall candidates derived from one choice of orientation edge.
#[derive(Debug, Clone, PartialEq)]
pub struct WallCandidateOption {
    pub orientation_edge: Segment,
    pub candidates: Vec<WallCandidate>,
}

fn classify_access(
    access: AccessEdge,
    floor: Option<&Profile>,
    filter: Option<&[WallType]>,
) -> WallCandidateOption {
    let mut candidates = vec![WallCandidate::new(access.edge, WallType::Glass)];
    let solid = match floor {
        // Edges along the floor boundary are facade, not interior walls.
        Some(floor) => find_all_edges_adjacent_to_segments(&access.others, &floor.segments()).other,
        None => access.others,
    };
    candidates.extend(solid.into_iter().map(|s| WallCandidate::new(s, WallType::Solid)));
    if let Some(filter) = filter {
        candidates.retain(|c| filter.contains(&c.wall_type));
    }
    WallCandidateOption {
        orientation_edge: access.edge,
        candidates,
    }
}

/// Wall candidates for a room given in level coordinates.
///
/// The primary access edge becomes `Glass`; every other edge becomes
/// `Solid`, except edges along the floor boundary when one is given.
/// `filter` keeps only the listed wall types.
///
/// # Errors
///
/// Returns `ClassifyError::NoEdges` if the room has no edges.
pub fn find_wall_candidates(
    room_edges: &[Segment],
    floor: Option<&Profile>,
    references: &[Segment],
    filter: Option<&[WallType]>,
) -> Result<WallCandidateOption> {
    let access = find_primary_access_edge(room_edges, references, floor)?;
    Ok(classify_access(access, floor, filter))
}

/// One set of wall candidates per ranked orientation edge, best first.
#[must_use]
pub fn wall_candidate_options(
    room_edges: &[Segment],
    floor: Option<&Profile>,
    references: &[Segment],
    filter: Option<&[WallType]>,
) -> Vec<WallCandidateOption> {
    sort_edges_by_primary_access(room_edges, references, floor)
        .into_iter()
        .map(|access| classify_access(access, floor, filter))
        .collect()
}

/// Partition and glazing candidates from a subdivided grid.
///
/// Every V separator, ends included, becomes a `Partition`. For each cell,
/// the trimmed-cell edge with the best access to the `GlassEdge` lines in
/// `candidates` becomes `Glass`; without any `GlassEdge` lines no glazing is
/// produced.
#[must_use]
pub fn partitions_and_glazing_from_grid<L: Clone>(
    candidates: &[WallCandidate],
    grid: &Grid2d<L>,
) -> Vec<WallCandidate> {
    let mut out: Vec<WallCandidate> = grid
        .cell_separators(Axis::V, true)
        .into_iter()
        .map(|s| WallCandidate::new(s, WallType::Partition))
        .collect();

    let glass_lines: Vec<Segment> = candidates
        .iter()
        .filter(|c| c.wall_type == WallType::GlassEdge)
        .map(|c| c.line)
        .collect();
    if glass_lines.is_empty() {
        debug!("no glass edges, skipping glazing");
        return out;
    }

    for index in grid.cells() {
        let Ok(pieces) = grid.trimmed_cell_geometry(index) else {
            continue;
        };
        let segments: Vec<Segment> = pieces.iter().flat_map(Profile::segments).collect();
        if let Some(best) = find_edges_by_access(&segments, &glass_lines, None).first() {
            out.push(WallCandidate::new(best.edge, WallType::Glass));
        }
    }
    out
}
