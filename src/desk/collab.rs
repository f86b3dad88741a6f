use crate::grid::{CellIndex, CellRoles, Grid2d};

use super::layout::{Band, DeskRole};

/// How densely collaboration space replaces desks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollabCadence {
    /// A collaboration row starts every this many aisle-separated row groups.
    pub every: usize,
    /// Desk columns consumed at the start of each desk run.
    pub consume: usize,
}

impl CollabCadence {
    /// Cadence for a density in `[0, 1)`, or `None` when the density is zero.
    #[must_use]
    pub fn from_density(density: f64) -> Option<Self> {
        if density <= 0.0 {
            return None;
        }
        let every = if density >= 0.7 {
            2
        } else if density >= 0.3 {
            3
        } else {
            4
        };
        let consume = if density >= 0.9 {
            4
        } else if density >= 0.8 {
            3
        } else if density >= 0.5 {
            2
        } else {
            1
        };
        Some(Self { every, consume })
    }
}

/// Retypes desk cells as collaboration space.
///
/// Columns are walked in V order. Within a column, rows are grouped by the
/// aisle rows crossed so far; desk rows of every `every`-th group are taken
/// while fewer than `consume` desk columns of the current run have been
/// seen. An aisle column ends a run.
#[must_use]
pub fn carve_collaboration(
    grid: &Grid2d<Band>,
    roles: CellRoles<DeskRole>,
    cadence: CollabCadence,
) -> CellRoles<DeskRole> {
    let mut roles = roles;
    let mut run = 0;
    for (v, column) in grid.v().cells().iter().enumerate() {
        let mut group = 0;
        for (u, row) in grid.u().cells().iter().enumerate() {
            let desk_row = matches!(row.label, Some(Band::Forward | Band::Backward));
            if group % cadence.every == 0
                && desk_row
                && column.label == Some(Band::Desk)
                && run < cadence.consume
            {
                roles = roles.with(CellIndex::new(u, v), DeskRole::Collab);
            }
            if row.label == Some(Band::Aisle) {
                group += 1;
            }
        }
        match column.label {
            Some(Band::Desk) => run += 1,
            Some(Band::Aisle) => run = 0,
            _ => {}
        }
    }
    roles
}
