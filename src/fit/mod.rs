pub mod catalog;
pub mod cell_fit;
pub mod inscribed_rect;

pub use catalog::{Catalog, ContentConfiguration, PlacedElement, PlacementRule};
pub use cell_fit::{
    fit_rectangle, FitCell, FitMethod, FitOutcome, PlacedContent, SkipReason,
    DEFAULT_DENSIFY_THRESHOLD,
};
pub use inscribed_rect::{largest_inscribed_rectangle, InscribedRect};
