use std::fmt;

use tracing::warn;

use crate::grid::CellIndex;

/// A non-fatal problem scoped to one room or cell. The rest of the batch
/// carries on.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutWarning {
    /// The room boundary has no usable area.
    DegenerateBoundary { room: usize, reason: String },
    /// A grid or sub-grid could not be built or divided.
    GridConstruction { room: usize, reason: String },
    /// No orientation edge produced a usable layout.
    NoOrientation { room: usize },
    /// The configured content is not in the catalog.
    MissingConfiguration { room: usize, name: String },
    /// A desk cell sits in a row without a facing.
    UnorientedDeskCell { cell: CellIndex },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateBoundary { room, reason } => {
                write!(f, "room {room}: boundary is unusable: {reason}")
            }
            Self::GridConstruction { room, reason } => {
                write!(f, "room {room}: grid construction failed: {reason}")
            }
            Self::NoOrientation { room } => {
                write!(f, "room {room}: no orientation found")
            }
            Self::MissingConfiguration { room, name } => {
                write!(f, "room {room}: configuration `{name}` is not in the catalog")
            }
            Self::UnorientedDeskCell { cell } => write!(
                f,
                "desk placement skipped at ({}, {}): no desk direction for this cell",
                cell.u, cell.v
            ),
        }
    }
}

impl LayoutWarning {
    /// Logs the warning and records it.
    pub(crate) fn emit(self, warnings: &mut Vec<LayoutWarning>) {
        warn!("{self}");
        warnings.push(self);
    }
}
