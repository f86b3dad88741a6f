use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::config::AvoidanceStrategy;
use crate::error::{GeometryError, Result};
use crate::geometry::{Aabb2, Polygon};
use crate::grid::Grid2d;
use crate::math::Point2;

slotmap::new_key_type! {
    /// Key of a column in a [`ColumnIndex`].
    pub struct ColumnKey;
}

/// Default edge length of a spatial hash bucket (meters).
pub const DEFAULT_BUCKET_SIZE: f64 = 2.0;

/// Sub-grids narrower than the widest column times this factor are dropped
/// by adaptive avoidance.
const ADAPTIVE_CLEARANCE: f64 = 1.05;

/// A structural column: its insertion point and footprint in level space.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub location: Point2,
    pub profile: Polygon,
}

/// Column records bucketed by location for bounding-box lookups.
///
/// Built once per layout, then only queried.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    columns: SlotMap<ColumnKey, Column>,
    buckets: HashMap<(i64, i64), Vec<ColumnKey>>,
    bucket_size: f64,
}

impl Default for ColumnIndex {
    fn default() -> Self {
        Self {
            columns: SlotMap::with_key(),
            buckets: HashMap::new(),
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl ColumnIndex {
    /// An empty index with buckets of the given edge length.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` unless `bucket_size` is finite and
    /// positive.
    pub fn new(bucket_size: f64) -> Result<Self> {
        if !bucket_size.is_finite() || bucket_size <= 0.0 {
            return Err(GeometryError::Degenerate(format!(
                "bucket size must be finite and positive, got {bucket_size}"
            ))
            .into());
        }
        Ok(Self {
            bucket_size,
            ..Self::default()
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn bucket_of(&self, p: &Point2) -> (i64, i64) {
        (
            (p.x / self.bucket_size).floor() as i64,
            (p.y / self.bucket_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, column: Column) -> ColumnKey {
        let bucket = self.bucket_of(&column.location);
        let key = self.columns.insert(column);
        self.buckets.entry(bucket).or_default().push(key);
        key
    }

    #[must_use]
    pub fn get(&self, key: ColumnKey) -> Option<&Column> {
        self.columns.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnKey, &Column)> {
        self.columns.iter()
    }

    /// Columns whose location lies inside `bounds` grown by `expand` on
    /// every side, in insertion order.
    #[must_use]
    pub fn find_within_bounds(&self, bounds: &Aabb2, expand: f64) -> Vec<(ColumnKey, &Column)> {
        let search = bounds.expanded(expand);
        let (x0, y0) = self.bucket_of(&search.min);
        let (x1, y1) = self.bucket_of(&search.max);
        let mut keys: Vec<ColumnKey> = (x0..=x1)
            .flat_map(|bx| (y0..=y1).map(move |by| (bx, by)))
            .filter_map(|bucket| self.buckets.get(&bucket))
            .flatten()
            .copied()
            .filter(|key| {
                self.columns
                    .get(*key)
                    .is_some_and(|c| search.contains(&c.location))
            })
            .collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .filter_map(|key| self.columns.get(key).map(|c| (key, c)))
            .collect()
    }
}

impl FromIterator<Column> for ColumnIndex {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut index = ColumnIndex::default();
        for column in iter {
            index.insert(column);
        }
        index
    }
}

/// The grids desks may be laid out in.
///
/// Under [`AvoidanceStrategy::AdaptiveGrid`] the U axis is split at the
/// extents of every column standing inside the boundary, and only the
/// resulting sub-grids wider and deeper than the widest column (with 5%
/// clearance) are kept. Otherwise the whole grid is returned.
///
/// # Errors
///
/// Propagates sub-grid construction errors.
pub fn valid_grids<L: Clone>(
    grid: &Grid2d<L>,
    columns: &ColumnIndex,
    strategy: AvoidanceStrategy,
) -> Result<Vec<Grid2d<L>>> {
    if columns.is_empty() || strategy != AvoidanceStrategy::AdaptiveGrid {
        return Ok(vec![grid.clone()]);
    }

    let perimeter = grid.boundary().perimeter();
    let mut split = grid.clone();
    let mut widest = 0.0_f64;
    for (_, column) in columns.find_within_bounds(&perimeter.bounds(), 0.0) {
        if !perimeter.contains(&column.location) {
            continue;
        }
        let extent = column.profile.bounds();
        widest = widest.max((extent.max - extent.min).norm());
        split.split_u_at_points(&[extent.min, extent.max]);
    }
    let threshold = widest * ADAPTIVE_CLEARANCE;

    let mut grids = Vec::new();
    for index in split.cells() {
        let (u, v) = split.cell_domains(index)?;
        if u.length() > threshold && v.length() > threshold {
            grids.push(split.cell_grid(index)?);
        }
    }
    debug!(count = grids.len(), threshold, "adaptive sub-grids");
    Ok(grids)
}
