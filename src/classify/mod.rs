pub mod access_edge;
pub mod wall_candidates;

pub use access_edge::{
    find_all_edges_adjacent_to_segments, find_edge_adjacent_to_segments,
    find_edge_closest_to_core, find_edges_by_access, find_primary_access_edge,
    sort_edges_by_primary_access, AccessEdge, EdgePartition, ADJACENCY_DISTANCE,
    DISTANCE_TIE_TOLERANCE,
};
pub use wall_candidates::{
    find_wall_candidates, partitions_and_glazing_from_grid, wall_candidate_options,
    WallCandidate, WallCandidateOption, WallType,
};
