//! Geometry-specific error types.

use bf_core::BfError;

/// Geometry construction and validation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Inconsistent or non-physical geometric input.
    InvalidGeometry { assembly: String, what: String },

    /// Both a fuel model and a pin model were supplied.
    ConflictingPinModel { assembly: String },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

impl GeometryError {
    pub(crate) fn invalid(assembly: &str, what: impl Into<String>) -> Self {
        GeometryError::InvalidGeometry {
            assembly: assembly.to_string(),
            what: what.into(),
        }
    }
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::InvalidGeometry { assembly, what } => {
                write!(f, "Invalid geometry for assembly '{}': {}", assembly, what)
            }
            GeometryError::ConflictingPinModel { assembly } => {
                write!(
                    f,
                    "Assembly '{}' defines both a fuel model and a pin model",
                    assembly
                )
            }
        }
    }
}

impl std::error::Error for GeometryError {}

impl From<GeometryError> for BfError {
    fn from(err: GeometryError) -> Self {
        BfError::InvalidArg {
            what: err.to_string(),
        }
    }
}
