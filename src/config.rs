//! Layout settings, loaded from TOML.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::fit::DEFAULT_DENSIFY_THRESHOLD;
use crate::partitions::{DEFAULT_COLLINEAR_TOLERANCE, DEFAULT_WALL_HEIGHT};

/// How desk layout reacts to structural columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvoidanceStrategy {
    /// Columns are ignored.
    None,
    /// Desks touching a column are dropped.
    #[default]
    Cull,
    /// The grid is split around columns and only roomy sub-grids are used.
    #[serde(rename = "Adaptive Grid")]
    AdaptiveGrid,
}

/// Open-plan desk settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskSection {
    /// Catalog name of the desk configuration
    pub desk_type: String,

    /// Width of aisles between desk runs (meters)
    pub aisle_width: f64,

    /// Gap between back-to-back desk rows (meters)
    pub back_to_back_width: f64,

    /// Share of desks replaced by collaboration space, in [0, 1)
    pub collaboration_density: f64,

    /// Extra rotation of the desk grid (degrees)
    pub grid_rotation: f64,

    pub column_avoidance: AvoidanceStrategy,
}

impl Default for DeskSection {
    fn default() -> Self {
        Self {
            desk_type: "Simple Desk".into(),
            aisle_width: 1.0,
            back_to_back_width: 1.0,
            collaboration_density: 0.0,
            grid_rotation: 0.0,
            column_avoidance: AvoidanceStrategy::default(),
        }
    }
}

/// Interior wall settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallSection {
    /// Height used when a level has none (meters)
    pub default_height: f64,

    /// Distance under which wall lines count as collinear (meters)
    pub collinear_tolerance: f64,
}

impl Default for WallSection {
    fn default() -> Self {
        Self {
            default_height: DEFAULT_WALL_HEIGHT,
            collinear_tolerance: DEFAULT_COLLINEAR_TOLERANCE,
        }
    }
}

/// Content fitting settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSection {
    /// Trimmed cells with fewer vertices are densified before the
    /// inscribed-rectangle search
    pub densify_threshold: usize,
}

impl Default for FitSection {
    fn default() -> Self {
        Self {
            densify_threshold: DEFAULT_DENSIFY_THRESHOLD,
        }
    }
}

/// All layout settings. Every section and field is optional in TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub desk: DeskSection,
    pub walls: WallSection,
    pub fit: FitSection,
}

impl LayoutSettings {
    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML or
    /// `ConfigError::OutOfRange` if a value fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text).map_err(ConfigError::from)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let desk = &self.desk;
        #[allow(clippy::cast_precision_loss)]
        let densify = self.fit.densify_threshold as f64;
        check_ranges(&[
            (
                "desk.aisle_width",
                desk.aisle_width,
                positive(desk.aisle_width),
                "must be finite and positive",
            ),
            (
                "desk.back_to_back_width",
                desk.back_to_back_width,
                positive(desk.back_to_back_width),
                "must be finite and positive",
            ),
            density_check(desk.collaboration_density),
            (
                "desk.grid_rotation",
                desk.grid_rotation,
                desk.grid_rotation.is_finite() && desk.grid_rotation.abs() <= 360.0,
                "must be within [-360, 360] degrees",
            ),
            (
                "walls.default_height",
                self.walls.default_height,
                positive(self.walls.default_height),
                "must be finite and positive",
            ),
            (
                "walls.collinear_tolerance",
                self.walls.collinear_tolerance,
                positive(self.walls.collinear_tolerance),
                "must be finite and positive",
            ),
            (
                "fit.densify_threshold",
                densify,
                self.fit.densify_threshold >= MIN_DENSIFY_THRESHOLD,
                "must be at least 5",
            ),
        ])
    }

    /// Grid rotation in radians.
    #[must_use]
    pub fn grid_rotation_radians(&self) -> f64 {
        self.desk.grid_rotation.to_radians()
    }
}

/// Smallest densify threshold that still densifies four-sided cells.
const MIN_DENSIFY_THRESHOLD: usize = 5;

type RangeCheck = (&'static str, f64, bool, &'static str);

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub(crate) fn density_check(density: f64) -> RangeCheck {
    (
        "desk.collaboration_density",
        density,
        (0.0..1.0).contains(&density),
        "must be in [0, 1)",
    )
}

/// Fails on the first check that does not hold.
pub(crate) fn check_ranges(checks: &[RangeCheck]) -> Result<()> {
    for &(name, value, ok, reason) in checks {
        if !ok {
            return Err(ConfigError::OutOfRange { name, value, reason }.into());
        }
    }
    Ok(())
}
