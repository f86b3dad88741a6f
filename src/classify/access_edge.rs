use tracing::debug;

use crate::error::{ClassifyError, Result};
use crate::geometry::{Polygon, Profile, Segment};

/// Midpoint-to-segment distance under which an edge counts as adjacent.
pub const ADJACENCY_DISTANCE: f64 = 0.3;

/// Distances closer than this are treated as equal when ranking edges.
pub const DISTANCE_TIE_TOLERANCE: f64 = 0.1;

/// Core segments whose direction has an absolute dot product with the edge
/// below this are considered perpendicular and ignored.
const PERPENDICULAR_DOT: f64 = 1e-3;

/// A chosen orientation edge and every other edge of the room, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessEdge {
    pub edge: Segment,
    pub others: Vec<Segment>,
}

/// Edges split by whether their midpoint lies near a comparison segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePartition {
    pub adjacent: Vec<Segment>,
    pub other: Vec<Segment>,
}

impl AccessEdge {
    fn pick(edges: &[Segment], index: usize) -> Self {
        Self {
            edge: edges[index],
            others: edges
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, e)| *e)
                .collect(),
        }
    }
}

fn min_distance_to(edge: &Segment, references: &[Segment]) -> f64 {
    let mid = edge.mid();
    references
        .iter()
        .map(|r| r.distance_to_point(&mid))
        .fold(f64::INFINITY, f64::min)
}

/// Indices of `edges` sorted by length, longest first; equal lengths keep
/// input order.
fn by_length_desc(edges: &[Segment], indices: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut order: Vec<usize> = indices.collect();
    order.sort_by(|&a, &b| edges[b].length().total_cmp(&edges[a].length()));
    order
}

/// Ranks edge indices by distance to the references.
///
/// Repeatedly takes, among the remaining edges, those within
/// [`DISTANCE_TIE_TOLERANCE`] of the closest one and selects the longest of
/// them; equal lengths fall back to the lower index.
fn rank_by_distance(edges: &[Segment], distances: &[(usize, f64)]) -> Vec<usize> {
    let mut remaining: Vec<(usize, f64)> = distances.to_vec();
    let mut ranked = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let best = remaining
            .iter()
            .map(|(_, d)| *d)
            .fold(f64::INFINITY, f64::min);
        let mut pick = 0;
        for (slot, (index, dist)) in remaining.iter().enumerate() {
            if *dist > best + DISTANCE_TIE_TOLERANCE {
                continue;
            }
            let (current, current_dist) = remaining[pick];
            let current_ok = current_dist <= best + DISTANCE_TIE_TOLERANCE;
            let longer = edges[*index].length() > edges[current].length();
            let same_len_lower = edges[*index].length() == edges[current].length() && *index < current;
            if !current_ok || longer || same_len_lower {
                pick = slot;
            }
        }
        ranked.push(remaining.remove(pick).0);
    }
    ranked
}

/// Splits `edges` into those whose midpoint is within [`ADJACENCY_DISTANCE`]
/// of any comparison segment and the rest.
#[must_use]
pub fn find_all_edges_adjacent_to_segments(
    edges: &[Segment],
    comparison: &[Segment],
) -> EdgePartition {
    let mut partition = EdgePartition::default();
    for edge in edges {
        if min_distance_to(edge, comparison) < ADJACENCY_DISTANCE {
            partition.adjacent.push(*edge);
        } else {
            partition.other.push(*edge);
        }
    }
    partition
}

/// Every edge ranked by access to the reference segments, each paired with
/// the remaining edges.
///
/// With `max_distance`, edges whose midpoint is not closer than it are left
/// out of the ranking. Without reference segments the edges are ranked by
/// length, unless a maximum distance is given, in which case nothing
/// qualifies.
#[must_use]
pub fn find_edges_by_access(
    edges: &[Segment],
    references: &[Segment],
    max_distance: Option<f64>,
) -> Vec<AccessEdge> {
    if references.is_empty() {
        if max_distance.is_some() {
            debug!("no reference segments within the maximum distance");
            return Vec::new();
        }
        return by_length_desc(edges, 0..edges.len())
            .into_iter()
            .map(|i| AccessEdge::pick(edges, i))
            .collect();
    }
    let distances: Vec<(usize, f64)> = edges
        .iter()
        .enumerate()
        .map(|(i, e)| (i, min_distance_to(e, references)))
        .filter(|(_, d)| max_distance.map_or(true, |max| *d < max))
        .collect();
    rank_by_distance(edges, &distances)
        .into_iter()
        .map(|i| AccessEdge::pick(edges, i))
        .collect()
}

/// The edge with the best access to the reference segments.
///
/// # Errors
///
/// Returns `ClassifyError::NoEdges` if `edges` is empty.
pub fn find_edge_adjacent_to_segments(
    edges: &[Segment],
    references: &[Segment],
) -> Result<AccessEdge> {
    find_edges_by_access(edges, references, None)
        .into_iter()
        .next()
        .ok_or_else(|| ClassifyError::NoEdges.into())
}

/// Candidate indices when only a floor boundary is known: the edges away
/// from the floor boundary, or all edges if every one of them is adjacent.
fn floor_candidates(edges: &[Segment], floor: &Profile) -> Vec<usize> {
    let floor_segments = floor.segments();
    let away: Vec<usize> = edges
        .iter()
        .enumerate()
        .filter(|(_, e)| min_distance_to(e, &floor_segments) >= ADJACENCY_DISTANCE)
        .map(|(i, _)| i)
        .collect();
    if away.is_empty() {
        (0..edges.len()).collect()
    } else {
        away
    }
}

/// Every viable orientation edge in preference order.
///
/// Reference segments (corridors) take precedence; without them, edges away
/// from the floor boundary are preferred, longest first; without either,
/// edges are ordered by length.
#[must_use]
pub fn sort_edges_by_primary_access(
    edges: &[Segment],
    references: &[Segment],
    floor: Option<&Profile>,
) -> Vec<AccessEdge> {
    if !references.is_empty() {
        return find_edges_by_access(edges, references, None);
    }
    let candidates = match floor {
        Some(floor) => floor_candidates(edges, floor),
        None => (0..edges.len()).collect(),
    };
    by_length_desc(edges, candidates.into_iter())
        .into_iter()
        .map(|i| AccessEdge::pick(edges, i))
        .collect()
}

/// The single best orientation edge. Always the first entry of
/// [`sort_edges_by_primary_access`].
///
/// # Errors
///
/// Returns `ClassifyError::NoEdges` if `edges` is empty.
pub fn find_primary_access_edge(
    edges: &[Segment],
    references: &[Segment],
    floor: Option<&Profile>,
) -> Result<AccessEdge> {
    sort_edges_by_primary_access(edges, references, floor)
        .into_iter()
        .next()
        .ok_or_else(|| ClassifyError::NoEdges.into())
}

/// The perimeter edge whose midpoint is closest to a core segment that is
/// not perpendicular to it. Ties within [`DISTANCE_TIE_TOLERANCE`] go to the
/// longer edge.
#[must_use]
pub fn find_edge_closest_to_core(perimeter: &Polygon, core: &Polygon) -> Option<Segment> {
    let edges = perimeter.segments();
    let core_segments = core.segments();
    let distances: Vec<(usize, f64)> = edges
        .iter()
        .enumerate()
        .filter_map(|(i, edge)| {
            let dir = edge.direction();
            let mid = edge.mid();
            let dist = core_segments
                .iter()
                .filter(|c| c.direction().dot(&dir).abs() > PERPENDICULAR_DOT)
                .map(|c| c.distance_to_point(&mid))
                .fold(f64::INFINITY, f64::min);
            dist.is_finite().then_some((i, dist))
        })
        .collect();
    rank_by_distance(&edges, &distances)
        .first()
        .map(|&i| edges[i])
}
