use thiserror::Error;

/// Top-level error type for the interior layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to geometric value construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// Errors related to grid construction and division.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid domain [{min}, {max}]")]
    InvalidDomain { min: f64, max: f64 },

    #[error("division length {0} must be positive")]
    InvalidLength(f64),

    #[error("division count must be at least 1")]
    InvalidCount,

    #[error("pattern must contain at least one entry with positive length")]
    EmptyPattern,

    #[error("cell index ({u}, {v}) is out of range")]
    CellOutOfRange { u: usize, v: usize },

    #[error("grid boundary is degenerate: {0}")]
    DegenerateBoundary(String),
}

/// Errors related to edge classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("no edges to classify")]
    NoEdges,
}

/// Errors related to content fitting.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("inscribed rectangle search failed: {0}")]
    InscribedRectangle(String),
}

/// Errors related to settings loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("setting `{name}` = {value} is out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Convenience type alias for results using [`LayoutError`].
pub type Result<T> = std::result::Result<T, LayoutError>;
