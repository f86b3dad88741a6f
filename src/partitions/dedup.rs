use crate::classify::{WallCandidate, WallType};
use crate::geometry::Segment;
use crate::math::{Point2, Vector2, TOLERANCE};

/// Merged segments this short or shorter are dropped.
pub const MIN_WALL_LENGTH: f64 = 0.01;

/// Default tolerance for treating two wall lines as the same infinite line.
pub const DEFAULT_COLLINEAR_TOLERANCE: f64 = 1e-5;

/// Sweep positions closer than this are handled as one event batch.
const EVENT_TOLERANCE: f64 = 1e-9;

/// Merges wall candidates contributed by many rooms into a minimal,
/// non-overlapping set per shared wall line.
///
/// Candidates are grouped greedily: each one joins the first group whose
/// first line it is collinear with, in input order. Within a group, every
/// interval is projected onto the group's longest line (first wins ties)
/// and swept from low to high offset. At every point the output carries the
/// highest-priority type among the candidates covering it.
#[derive(Debug, Clone)]
pub struct DeduplicateWalls<'a> {
    candidates: &'a [WallCandidate],
    tolerance: f64,
}

impl<'a> DeduplicateWalls<'a> {
    #[must_use]
    pub fn new(candidates: &'a [WallCandidate]) -> Self {
        Self {
            candidates,
            tolerance: DEFAULT_COLLINEAR_TOLERANCE,
        }
    }

    /// Sets the collinearity tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Runs the merge. `GlassEdge` and zero-length candidates are ignored.
    #[must_use]
    pub fn execute(&self) -> Vec<WallCandidate> {
        let typed = self
            .candidates
            .iter()
            .filter(|c| c.wall_type.priority().is_some() && c.line.length() > TOLERANCE);

        let mut groups: Vec<Vec<WallCandidate>> = Vec::new();
        for candidate in typed {
            match groups
                .iter_mut()
                .find(|g| g[0].line.is_collinear(&candidate.line, self.tolerance))
            {
                Some(group) => group.push(*candidate),
                None => groups.push(vec![*candidate]),
            }
        }

        let mut result = Vec::new();
        for group in &groups {
            if let [single] = group.as_slice() {
                result.push(*single);
                continue;
            }
            sweep_group(group, &mut result);
        }
        result
    }
}

/// Convenience wrapper for [`DeduplicateWalls`] with the default tolerance.
#[must_use]
pub fn deduplicate_wall_lines(candidates: &[WallCandidate]) -> Vec<WallCandidate> {
    DeduplicateWalls::new(candidates).execute()
}

struct Event {
    pos: f64,
    is_end: bool,
    wall_type: WallType,
}

/// Open-interval counts per type, indexed by priority.
#[derive(Default)]
struct OpenCounts([usize; 4]);

impl OpenCounts {
    fn apply(&mut self, event: &Event) {
        let Some(rank) = event.wall_type.priority() else {
            return;
        };
        let slot = &mut self.0[usize::from(rank)];
        if event.is_end {
            *slot = slot.saturating_sub(1);
        } else {
            *slot += 1;
        }
    }

    fn top(&self) -> Option<WallType> {
        [WallType::Solid, WallType::Partition, WallType::Glass]
            .into_iter()
            .find(|t| t.priority().is_some_and(|r| self.0[usize::from(r)] > 0))
    }
}

fn longest(group: &[WallCandidate]) -> Segment {
    let mut best = group[0].line;
    for c in &group[1..] {
        if c.line.length() > best.length() {
            best = c.line;
        }
    }
    best
}

fn sweep_group(group: &[WallCandidate], out: &mut Vec<WallCandidate>) {
    let dominant = longest(group);
    let origin = dominant.start;
    let dir = dominant.direction();

    let mut events = Vec::with_capacity(group.len() * 2);
    for c in group {
        let a = dominant.project(&c.line.start);
        let b = dominant.project(&c.line.end);
        events.push(Event {
            pos: a.min(b),
            is_end: false,
            wall_type: c.wall_type,
        });
        events.push(Event {
            pos: a.max(b),
            is_end: true,
            wall_type: c.wall_type,
        });
    }
    events.sort_by(|a, b| a.pos.total_cmp(&b.pos).then(a.is_end.cmp(&b.is_end)));

    let mut counts = OpenCounts::default();
    let mut open: Option<(f64, WallType)> = None;
    let mut i = 0;
    while i < events.len() {
        let pos = events[i].pos;
        while i < events.len() && events[i].pos - pos <= EVENT_TOLERANCE {
            counts.apply(&events[i]);
            i += 1;
        }
        let top = counts.top();
        if open.map(|(_, t)| t) == top {
            continue;
        }
        if let Some((start, wall_type)) = open.take() {
            emit(out, origin, dir, start, pos, wall_type);
        }
        open = top.map(|t| (pos, t));
    }
}

fn emit(out: &mut Vec<WallCandidate>, origin: Point2, dir: Vector2, from: f64, to: f64, wall_type: WallType) {
    let line = Segment::new(origin + dir * from, origin + dir * to);
    if line.length() > MIN_WALL_LENGTH {
        out.push(WallCandidate::new(line, wall_type));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wall(x0: f64, y0: f64, x1: f64, y1: f64, wall_type: WallType) -> WallCandidate {
        WallCandidate::new(Segment::from_coords(x0, y0, x1, y1), wall_type)
    }

    fn spans(walls: &[WallCandidate]) -> Vec<(f64, f64, WallType)> {
        walls
            .iter()
            .map(|w| (w.line.start.x, w.line.end.x, w.wall_type))
            .collect()
    }

    fn assert_spans(walls: &[WallCandidate], expected: &[(f64, f64, WallType)]) {
        let got = spans(walls);
        assert_eq!(got.len(), expected.len(), "got {got:?}");
        for (g, e) in got.iter().zip(expected) {
            assert!((g.0 - e.0).abs() < 1e-9 && (g.1 - e.1).abs() < 1e-9, "got {got:?}");
            assert_eq!(g.2, e.2);
        }
    }

    #[test]
    fn higher_priority_inside_lower_splits_it() {
        let walls = [
            wall(0.0, 0.0, 10.0, 0.0, WallType::Glass),
            wall(3.0, 0.0, 7.0, 0.0, WallType::Solid),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[
                (0.0, 3.0, WallType::Glass),
                (3.0, 7.0, WallType::Solid),
                (7.0, 10.0, WallType::Glass),
            ],
        );
    }

    #[test]
    fn lower_priority_inside_higher_is_absorbed() {
        let walls = [
            wall(0.0, 0.0, 10.0, 0.0, WallType::Solid),
            wall(3.0, 0.0, 7.0, 0.0, WallType::Glass),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[(0.0, 10.0, WallType::Solid)],
        );
    }

    #[test]
    fn shared_wall_from_two_rooms_collapses() {
        // Two rooms contribute the same wall in opposite directions.
        let walls = [
            wall(0.0, 0.0, 5.0, 0.0, WallType::Solid),
            wall(5.0, 0.0, 0.0, 0.0, WallType::Solid),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[(0.0, 5.0, WallType::Solid)],
        );
    }

    #[test]
    fn abutting_intervals_of_one_type_merge() {
        let walls = [
            wall(0.0, 0.0, 3.0, 0.0, WallType::Partition),
            wall(3.0, 0.0, 4.0, 0.0, WallType::Partition),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[(0.0, 4.0, WallType::Partition)],
        );
    }

    #[test]
    fn gap_stays_uncovered() {
        let walls = [
            wall(0.0, 0.0, 2.0, 0.0, WallType::Glass),
            wall(5.0, 0.0, 9.0, 0.0, WallType::Glass),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[(0.0, 2.0, WallType::Glass), (5.0, 9.0, WallType::Glass)],
        );
    }

    #[test]
    fn staircase_of_priorities() {
        let walls = [
            wall(0.0, 0.0, 6.0, 0.0, WallType::Glass),
            wall(2.0, 0.0, 8.0, 0.0, WallType::Partition),
            wall(4.0, 0.0, 5.0, 0.0, WallType::Solid),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[
                (0.0, 2.0, WallType::Glass),
                (2.0, 4.0, WallType::Partition),
                (4.0, 5.0, WallType::Solid),
                (5.0, 8.0, WallType::Partition),
            ],
        );
    }

    #[test]
    fn single_candidate_is_kept_unchanged() {
        let walls = [
            wall(4.0, 1.0, 0.0, 1.0, WallType::Glass),
            wall(0.0, 0.0, 2.0, 0.0, WallType::Solid),
        ];
        let out = deduplicate_wall_lines(&walls);
        assert_eq!(out, walls.to_vec());
    }

    #[test]
    fn glass_edges_and_degenerate_lines_are_ignored() {
        let walls = [
            wall(0.0, 0.0, 2.0, 0.0, WallType::GlassEdge),
            wall(1.0, 1.0, 1.0, 1.0, WallType::Solid),
        ];
        assert!(deduplicate_wall_lines(&walls).is_empty());
    }

    #[test]
    fn slivers_are_dropped() {
        let walls = [
            wall(0.0, 0.0, 5.0, 0.0, WallType::Glass),
            wall(4.995, 0.0, 9.0, 0.0, WallType::Solid),
        ];
        assert_spans(
            &deduplicate_wall_lines(&walls),
            &[(0.0, 4.995, WallType::Glass), (4.995, 9.0, WallType::Solid)],
        );
        let walls = [
            wall(0.0, 0.0, 5.0, 0.0, WallType::Solid),
            wall(0.0, 0.0, 0.005, 0.0, WallType::Glass),
            wall(0.0, 0.0, 0.005, 0.0, WallType::Solid),
        ];
        assert_eq!(deduplicate_wall_lines(&walls).len(), 1);
    }

    #[test]
    fn vertical_lines_group_separately() {
        let walls = [
            wall(0.0, 0.0, 4.0, 0.0, WallType::Solid),
            wall(0.0, 0.0, 0.0, 4.0, WallType::Solid),
            wall(0.0, 2.0, 0.0, 6.0, WallType::Glass),
        ];
        let out = deduplicate_wall_lines(&walls);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], walls[0]);
        assert!((out[2].line.end.y - 6.0).abs() < 1e-9);
        assert_eq!(out[2].wall_type, WallType::Glass);
    }

    fn arb_type() -> impl Strategy<Value = WallType> {
        prop_oneof![
            Just(WallType::Solid),
            Just(WallType::Partition),
            Just(WallType::Glass),
        ]
    }

    fn arb_walls() -> impl Strategy<Value = Vec<WallCandidate>> {
        prop::collection::vec((0u32..20, 1u32..10, arb_type(), any::<bool>()), 1..8).prop_map(
            |raw| {
                raw.into_iter()
                    .map(|(start, len, t, flip)| {
                        let (a, b) = (f64::from(start), f64::from(start + len));
                        if flip {
                            wall(b, 0.0, a, 0.0, t)
                        } else {
                            wall(a, 0.0, b, 0.0, t)
                        }
                    })
                    .collect()
            },
        )
    }

    fn covering(walls: &[WallCandidate], x: f64) -> Vec<WallType> {
        walls
            .iter()
            .filter(|w| {
                let (a, b) = (w.line.start.x.min(w.line.end.x), w.line.start.x.max(w.line.end.x));
                a < x && x < b
            })
            .map(|w| w.wall_type)
            .collect()
    }

    proptest! {
        #[test]
        fn highest_priority_wins_everywhere(walls in arb_walls()) {
            let out = deduplicate_wall_lines(&walls);
            for step in 0..120 {
                let x = f64::from(step) * 0.25 + 0.125;
                let expected = covering(&walls, x)
                    .into_iter()
                    .max_by_key(|t| t.priority());
                let got = covering(&out, x);
                match expected {
                    Some(t) => prop_assert_eq!(got, vec![t]),
                    None => prop_assert!(got.is_empty()),
                }
            }
        }

        #[test]
        fn dedup_is_idempotent(walls in arb_walls()) {
            let once = deduplicate_wall_lines(&walls);
            let twice = deduplicate_wall_lines(&once);
            prop_assert_eq!(once.len(), twice.len());
            for (a, b) in once.iter().zip(&twice) {
                prop_assert_eq!(a.wall_type, b.wall_type);
                prop_assert!(a.line.approx_eq_undirected(&b.line, 1e-9));
            }
        }
    }
}
