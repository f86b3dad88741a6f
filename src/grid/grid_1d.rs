use crate::error::{GridError, Result};
use crate::math::LENGTH_TOLERANCE;

/// A closed scalar interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain1d {
    pub min: f64,
    pub max: f64,
}

impl Domain1d {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Checks if the open intervals overlap by more than the tolerance.
    #[must_use]
    pub fn overlaps(&self, other: &Domain1d) -> bool {
        self.min.max(other.min) < self.max.min(other.max) - LENGTH_TOLERANCE
    }
}

/// Where the leftover length goes when whole cells do not fill the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixedDivisionMode {
    #[default]
    RemainderAtEnd,
    RemainderAtStart,
    /// Half of the remainder at each end.
    RemainderAtBothEnds,
    RemainderNearMiddle,
}

/// How a pattern repeats across the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternMode {
    /// A single pass through the pattern.
    None,
    #[default]
    Cycle,
    /// Forward, then reversed, then forward again.
    Flip,
}

/// How an approximate length is turned into a cell count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvenDivisionMode {
    #[default]
    Nearest,
    RoundUp,
    RoundDown,
}

/// One cell of a [`Grid1d`]. Cells created to absorb a remainder carry no label.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell1d<L> {
    pub domain: Domain1d,
    pub label: Option<L>,
}

impl<L> Cell1d<L> {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.domain.length()
    }
}

/// A 1D interval partitioned into ordered, optionally labeled cells.
///
/// An undivided axis holds a single unlabeled cell spanning the domain.
/// Every division replaces the current partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid1d<L = ()> {
    domain: Domain1d,
    cells: Vec<Cell1d<L>>,
}

impl<L: Clone> Grid1d<L> {
    /// Creates an undivided axis over `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidDomain` if the domain is empty or not finite.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || max - min < LENGTH_TOLERANCE {
            return Err(GridError::InvalidDomain { min, max }.into());
        }
        let domain = Domain1d::new(min, max);
        Ok(Self {
            domain,
            cells: vec![Cell1d {
                domain,
                label: None,
            }],
        })
    }

    /// Creates an undivided axis over `[0, length]`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidDomain` if `length` is not positive.
    pub fn from_length(length: f64) -> Result<Self> {
        Self::new(0.0, length)
    }

    #[must_use]
    pub fn domain(&self) -> Domain1d {
        self.domain
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell1d<L>] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Cell1d<L>> {
        self.cells.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: an axis has at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Divides the domain into `count` equal, unlabeled cells.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidCount` if `count` is zero.
    pub fn divide_by_count(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(GridError::InvalidCount.into());
        }
        #[allow(clippy::cast_precision_loss)]
        let size = self.domain.length() / count as f64;
        self.assign(vec![(size, None); count]);
        Ok(())
    }

    /// Divides the domain into cells of exactly `length`, placing the leftover
    /// as shorter unlabeled cell(s) per `mode`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidLength` if `length` is not positive.
    pub fn divide_by_fixed_length(&mut self, length: f64, mode: FixedDivisionMode) -> Result<()> {
        if !(length > LENGTH_TOLERANCE) {
            return Err(GridError::InvalidLength(length).into());
        }
        let total = self.domain.length();
        let count = whole_count(total, length);
        #[allow(clippy::cast_precision_loss)]
        let remainder = total - count as f64 * length;
        let cells = vec![(length, None); count];
        self.assign(place_remainder(cells, remainder, mode));
        Ok(())
    }

    /// Divides the domain into equal cells whose size is as close to `target`
    /// as the rounding `mode` allows.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidLength` if `target` is not positive.
    pub fn divide_by_approximate_length(
        &mut self,
        target: f64,
        mode: EvenDivisionMode,
    ) -> Result<()> {
        if !(target > LENGTH_TOLERANCE) {
            return Err(GridError::InvalidLength(target).into());
        }
        let ratio = self.domain.length() / target;
        let rounded = match mode {
            EvenDivisionMode::Nearest => ratio.round(),
            EvenDivisionMode::RoundUp => ratio.ceil(),
            EvenDivisionMode::RoundDown => ratio.floor(),
        };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = rounded.max(1.0) as usize;
        self.divide_by_count(count)
    }

    /// Fills the domain with whole repeats of `pattern` entries, in the order
    /// given by `pattern_mode`, stopping at the first entry that no longer
    /// fits. The leftover length becomes unlabeled cell(s) per
    /// `remainder_mode`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::EmptyPattern` if the pattern is empty, or
    /// `GridError::InvalidLength` if any entry length is not positive.
    pub fn divide_by_pattern(
        &mut self,
        pattern: &[(L, f64)],
        pattern_mode: PatternMode,
        remainder_mode: FixedDivisionMode,
    ) -> Result<()> {
        if pattern.is_empty() {
            return Err(GridError::EmptyPattern.into());
        }
        if let Some((_, bad)) = pattern.iter().find(|(_, len)| !(*len > LENGTH_TOLERANCE)) {
            return Err(GridError::InvalidLength(*bad).into());
        }

        let total = self.domain.length();
        let mut filled = 0.0;
        let mut cells = Vec::new();
        let mut index = 0;
        while let Some((label, len)) = pattern_entry(pattern, pattern_mode, index) {
            if filled + len > total + LENGTH_TOLERANCE {
                break;
            }
            cells.push((*len, Some(label.clone())));
            filled += len;
            index += 1;
        }
        self.assign(place_remainder(cells, total - filled, remainder_mode));
        Ok(())
    }

    /// Splits at offsets measured from the domain minimum.
    pub fn split_at_offsets(&mut self, offsets: &[f64]) {
        let min = self.domain.min;
        for offset in offsets {
            self.split_at_position(min + offset);
        }
    }

    /// Splits at absolute positions. See [`Grid1d::split_at_position`].
    pub fn split_at_positions(&mut self, positions: &[f64]) {
        for &position in positions {
            self.split_at_position(position);
        }
    }

    /// Splits the cell containing `position` in two; both halves keep the
    /// cell's label. Positions outside the domain or on an existing boundary
    /// are ignored.
    pub fn split_at_position(&mut self, position: f64) {
        let Some(index) = self.cells.iter().position(|c| {
            position > c.domain.min + LENGTH_TOLERANCE && position < c.domain.max - LENGTH_TOLERANCE
        }) else {
            return;
        };
        let cell = self.cells[index].clone();
        let right = Cell1d {
            domain: Domain1d::new(position, cell.domain.max),
            label: cell.label.clone(),
        };
        self.cells[index].domain.max = position;
        self.cells.insert(index + 1, right);
    }

    /// Cell boundary positions in ascending order. Without `include_ends`
    /// only interior boundaries are returned.
    #[must_use]
    pub fn separators(&self, include_ends: bool) -> Vec<f64> {
        let mut positions = Vec::with_capacity(self.cells.len() + 1);
        if include_ends {
            positions.push(self.domain.min);
        }
        let last = self.cells.len().saturating_sub(1);
        for (i, cell) in self.cells.iter().enumerate() {
            if i < last || include_ends {
                positions.push(cell.domain.max);
            }
        }
        positions
    }

    /// An undivided sub-axis over one cell's domain.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Grid1d<L>> {
        let cell = self.cells.get(index)?;
        Some(Grid1d {
            domain: cell.domain,
            cells: vec![cell.clone()],
        })
    }

    /// The labeled pieces left after removing every obstruction interval
    /// from every cell. Pieces shorter than the length tolerance are dropped.
    #[must_use]
    pub fn trimmed(&self, obstructions: &[Domain1d]) -> Vec<Cell1d<L>> {
        let mut result = Vec::new();
        for cell in &self.cells {
            let mut pieces = vec![cell.domain];
            for obstruction in obstructions {
                pieces = pieces
                    .into_iter()
                    .flat_map(|piece| subtract(piece, obstruction))
                    .collect();
            }
            result.extend(
                pieces
                    .into_iter()
                    .filter(|p| p.length() > LENGTH_TOLERANCE)
                    .map(|domain| Cell1d {
                        domain,
                        label: cell.label.clone(),
                    }),
            );
        }
        result
    }

    fn assign(&mut self, lengths: Vec<(f64, Option<L>)>) {
        let mut cells = Vec::with_capacity(lengths.len());
        let mut cursor = self.domain.min;
        for (len, label) in lengths {
            let max = cursor + len;
            cells.push(Cell1d {
                domain: Domain1d::new(cursor, max),
                label,
            });
            cursor = max;
        }
        // Absorb accumulated drift into the last boundary.
        if let Some(last) = cells.last_mut() {
            last.domain.max = self.domain.max;
        }
        if cells.is_empty() {
            cells.push(Cell1d {
                domain: self.domain,
                label: None,
            });
        }
        self.cells = cells;
    }
}

impl<L: Clone + PartialEq> Grid1d<L> {
    /// Number of cells carrying `label`.
    #[must_use]
    pub fn count_of(&self, label: &L) -> usize {
        self.cells
            .iter()
            .filter(|c| c.label.as_ref() == Some(label))
            .count()
    }
}

/// Number of whole `length` cells in `total`, treating near-exact fits as fits.
fn whole_count(total: f64, length: f64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mut count = (total / length).floor().max(0.0) as usize;
    #[allow(clippy::cast_precision_loss)]
    if total - (count + 1) as f64 * length > -LENGTH_TOLERANCE {
        count += 1;
    }
    count
}

fn pattern_entry<L>(pattern: &[(L, f64)], mode: PatternMode, index: usize) -> Option<(&L, &f64)> {
    let n = pattern.len();
    let pos = index % n;
    let entry = match mode {
        PatternMode::None if index >= n => return None,
        PatternMode::None | PatternMode::Cycle => &pattern[pos],
        PatternMode::Flip if (index / n) % 2 == 1 => &pattern[n - 1 - pos],
        PatternMode::Flip => &pattern[pos],
    };
    Some((&entry.0, &entry.1))
}

fn place_remainder<L>(
    mut cells: Vec<(f64, Option<L>)>,
    remainder: f64,
    mode: FixedDivisionMode,
) -> Vec<(f64, Option<L>)> {
    if remainder <= LENGTH_TOLERANCE {
        return cells;
    }
    if cells.is_empty() {
        return vec![(remainder, None)];
    }
    match mode {
        FixedDivisionMode::RemainderAtEnd => cells.push((remainder, None)),
        FixedDivisionMode::RemainderAtStart => cells.insert(0, (remainder, None)),
        FixedDivisionMode::RemainderAtBothEnds => {
            cells.insert(0, (remainder * 0.5, None));
            cells.push((remainder * 0.5, None));
        }
        FixedDivisionMode::RemainderNearMiddle => {
            let mid = cells.len() / 2;
            cells.insert(mid, (remainder, None));
        }
    }
    cells
}

fn subtract(piece: Domain1d, obstruction: &Domain1d) -> Vec<Domain1d> {
    if !piece.overlaps(obstruction) {
        return vec![piece];
    }
    let mut out = Vec::with_capacity(2);
    if obstruction.min > piece.min {
        out.push(Domain1d::new(piece.min, obstruction.min));
    }
    if obstruction.max < piece.max {
        out.push(Domain1d::new(obstruction.max, piece.max));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Band {
        A,
        B,
    }

    fn lengths<L>(grid: &Grid1d<L>) -> Vec<f64> {
        grid.cells.iter().map(Cell1d::length).collect()
    }

    #[test]
    fn invalid_domain_is_rejected() {
        assert!(Grid1d::<()>::new(5.0, 5.0).is_err());
        assert!(Grid1d::<()>::new(5.0, 1.0).is_err());
        assert!(Grid1d::<()>::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn fixed_length_remainder_at_end() {
        let mut g = Grid1d::<()>::from_length(10.0).unwrap();
        g.divide_by_fixed_length(3.0, FixedDivisionMode::RemainderAtEnd).unwrap();
        let l = lengths(&g);
        assert_eq!(l.len(), 4);
        assert_relative_eq!(l[3], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn fixed_length_remainder_at_both_ends() {
        let mut g = Grid1d::<()>::new(2.0, 12.0).unwrap();
        g.divide_by_fixed_length(3.0, FixedDivisionMode::RemainderAtBothEnds).unwrap();
        let l = lengths(&g);
        assert_eq!(l.len(), 5);
        assert_relative_eq!(l[0], 0.5, epsilon = 1e-9);
        assert_relative_eq!(l[4], 0.5, epsilon = 1e-9);
        assert_relative_eq!(g.cells[1].domain.min, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn fixed_length_exact_fit_has_no_remainder() {
        let mut g = Grid1d::<()>::from_length(7.5).unwrap();
        g.divide_by_fixed_length(2.5, FixedDivisionMode::RemainderNearMiddle).unwrap();
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn fixed_length_longer_than_domain_is_one_remainder_cell() {
        let mut g = Grid1d::<()>::from_length(2.0).unwrap();
        g.divide_by_fixed_length(3.0, FixedDivisionMode::RemainderAtEnd).unwrap();
        assert_eq!(g.len(), 1);
        assert_relative_eq!(g.cells[0].length(), 2.0);
    }

    #[test]
    fn zero_length_division_fails() {
        let mut g = Grid1d::<()>::from_length(2.0).unwrap();
        assert!(g.divide_by_fixed_length(0.0, FixedDivisionMode::RemainderAtEnd).is_err());
        assert!(g.divide_by_approximate_length(-1.0, EvenDivisionMode::Nearest).is_err());
    }

    #[test]
    fn approximate_length_picks_nearest_count() {
        let mut g = Grid1d::<()>::from_length(10.0).unwrap();
        g.divide_by_approximate_length(3.0, EvenDivisionMode::Nearest).unwrap();
        assert_eq!(g.len(), 3);
        g.divide_by_approximate_length(3.0, EvenDivisionMode::RoundUp).unwrap();
        assert_eq!(g.len(), 4);
        g.divide_by_approximate_length(30.0, EvenDivisionMode::RoundDown).unwrap();
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn pattern_cycles_and_labels() {
        let mut g = Grid1d::from_length(10.0).unwrap();
        g.divide_by_pattern(
            &[(Band::A, 2.0), (Band::B, 1.0)],
            PatternMode::Cycle,
            FixedDivisionMode::RemainderAtEnd,
        )
        .unwrap();
        // A B A B A B = 9.0, then A no longer fits: remainder 1.0.
        assert_eq!(g.len(), 7);
        assert_eq!(g.count_of(&Band::A), 3);
        assert_eq!(g.count_of(&Band::B), 3);
        assert!(g.cells[6].label.is_none());
    }

    #[test]
    fn pattern_single_pass() {
        let mut g = Grid1d::from_length(10.0).unwrap();
        g.divide_by_pattern(
            &[(Band::A, 2.0), (Band::B, 1.0)],
            PatternMode::None,
            FixedDivisionMode::RemainderAtStart,
        )
        .unwrap();
        assert_eq!(g.len(), 3);
        assert!(g.cells[0].label.is_none());
        assert_relative_eq!(g.cells[0].length(), 7.0);
    }

    #[test]
    fn pattern_flip_reverses_alternate_repeats() {
        let mut g = Grid1d::from_length(6.0).unwrap();
        g.divide_by_pattern(
            &[(Band::A, 1.0), (Band::B, 2.0)],
            PatternMode::Flip,
            FixedDivisionMode::RemainderAtEnd,
        )
        .unwrap();
        let labels: Vec<_> = g.cells.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            vec![Some(Band::A), Some(Band::B), Some(Band::B), Some(Band::A)]
        );
    }

    #[test]
    fn empty_pattern_fails() {
        let mut g = Grid1d::<Band>::from_length(6.0).unwrap();
        assert!(g
            .divide_by_pattern(&[], PatternMode::Cycle, FixedDivisionMode::RemainderAtEnd)
            .is_err());
        assert!(g
            .divide_by_pattern(
                &[(Band::A, 0.0)],
                PatternMode::Cycle,
                FixedDivisionMode::RemainderAtEnd
            )
            .is_err());
    }

    #[test]
    fn split_keeps_label_and_ignores_boundaries() {
        let mut g = Grid1d::from_length(4.0).unwrap();
        g.divide_by_pattern(
            &[(Band::A, 2.0)],
            PatternMode::Cycle,
            FixedDivisionMode::RemainderAtEnd,
        )
        .unwrap();
        g.split_at_offsets(&[1.0, 2.0, 9.0]);
        assert_eq!(g.len(), 3);
        assert_eq!(g.cells[0].label, Some(Band::A));
        assert_eq!(g.cells[1].label, Some(Band::A));
        assert_eq!(g.separators(false), vec![1.0, 2.0]);
        assert_eq!(g.separators(true), vec![0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn child_spans_one_cell() {
        let mut g = Grid1d::<()>::from_length(4.0).unwrap();
        g.divide_by_count(4).unwrap();
        let child = g.child(2).unwrap();
        assert_relative_eq!(child.domain().min, 2.0);
        assert_relative_eq!(child.domain().max, 3.0);
        assert!(g.child(4).is_none());
    }

    #[test]
    fn trimmed_removes_obstructions() {
        let mut g = Grid1d::<()>::from_length(10.0).unwrap();
        g.divide_by_count(2).unwrap();
        let pieces = g.trimmed(&[Domain1d::new(4.0, 6.0), Domain1d::new(9.0, 12.0)]);
        let spans: Vec<_> = pieces.iter().map(|c| (c.domain.min, c.domain.max)).collect();
        assert_eq!(spans, vec![(0.0, 4.0), (6.0, 9.0)]);
    }

    proptest! {
        #[test]
        fn fixed_length_remainder_law(total in 1.0f64..200.0, cell in 0.3f64..20.0) {
            let ratio = total / cell;
            prop_assume!((ratio - ratio.round()).abs() > 1e-4);
            let mut g = Grid1d::<()>::from_length(total).unwrap();
            g.divide_by_fixed_length(cell, FixedDivisionMode::RemainderAtBothEnds).unwrap();
            let full = g.cells.iter().filter(|c| (c.length() - cell).abs() < 1e-9).count();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let expected_full = ratio.floor() as usize;
            prop_assert_eq!(full, expected_full);
            #[allow(clippy::cast_precision_loss)]
            let expected_remainder = total - cell * expected_full as f64;
            let remainder: f64 = g.cells.iter()
                .filter(|c| (c.length() - cell).abs() >= 1e-9)
                .map(Cell1d::length)
                .sum();
            prop_assert!((remainder - expected_remainder).abs() < 1e-6);
        }

        #[test]
        fn pattern_covers_domain(
            total in 1.0f64..100.0,
            a in 0.2f64..5.0,
            b in 0.2f64..5.0,
            mode in prop_oneof![Just(PatternMode::Cycle), Just(PatternMode::Flip), Just(PatternMode::None)],
        ) {
            let mut g = Grid1d::from_length(total).unwrap();
            g.divide_by_pattern(&[(Band::A, a), (Band::B, b)], mode, FixedDivisionMode::RemainderAtBothEnds).unwrap();
            let sum: f64 = g.cells.iter().map(Cell1d::length).sum();
            prop_assert!((sum - total).abs() < 1e-6);
            for pair in g.cells.windows(2) {
                prop_assert!((pair[0].domain.max - pair[1].domain.min).abs() < 1e-12);
            }
        }
    }
}
