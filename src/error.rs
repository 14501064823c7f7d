use thiserror::Error;

/// Errors raised while building or querying collision data.
///
/// Hot-path lookups (cross sections, PDFs) never return these; they fall back
/// to zero outside the tabulated range. Errors are reserved for construction,
/// configuration and sampling outside a distribution's support.
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("Invalid energy grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid cross section: {0}")]
    InvalidCrossSection(String),

    #[error("Value {value} is outside of the grid bounds [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("Subshell {0} does not map to a reaction type")]
    UnmappedSubshell(String),

    #[error("Unknown {kind} name: '{name}'")]
    UnknownName { kind: &'static str, name: String },

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
