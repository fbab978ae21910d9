//! Material property errors.

use bf_core::BfError;
use thiserror::Error;

/// Result type for material operations.
pub type MaterialResult<T> = Result<T, MaterialError>;

/// Errors raised while resolving or evaluating a material.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterialError {
    /// No built-in, polynomial or tabulated definition matches the name.
    #[error("Unknown material: {name}")]
    UnknownMaterial { name: String },

    /// Temperature outside the validated range; the value was extrapolated.
    #[error("Temperature {t} K outside validated range [{lo}, {hi}] K for {material}")]
    OutOfRange {
        material: String,
        t: f64,
        lo: f64,
        hi: f64,
    },

    /// Non-physical property value (negative density, zero conductivity, ...).
    #[error("Non-physical {what} for {material} at {t} K")]
    NonPhysical {
        material: String,
        what: &'static str,
        t: f64,
    },

    /// Malformed user definition.
    #[error("Invalid material definition '{material}': {what}")]
    InvalidDefinition { material: String, what: String },
}

impl From<MaterialError> for BfError {
    fn from(err: MaterialError) -> Self {
        match err {
            MaterialError::NonPhysical { .. } | MaterialError::OutOfRange { .. } => {
                BfError::Invariant {
                    what: err.to_string(),
                }
            }
            MaterialError::UnknownMaterial { .. } | MaterialError::InvalidDefinition { .. } => {
                BfError::InvalidArg {
                    what: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MaterialError::UnknownMaterial {
            name: "unobtainium".into(),
        };
        assert!(err.to_string().contains("unobtainium"));

        let err = MaterialError::OutOfRange {
            material: "sodium".into(),
            t: 2000.0,
            lo: 371.0,
            hi: 1155.0,
        };
        assert!(err.to_string().contains("2000"));
    }

    #[test]
    fn error_to_bf_error() {
        let err = MaterialError::NonPhysical {
            material: "lead".into(),
            what: "density",
            t: 9000.0,
        };
        let bf: BfError = err.into();
        assert!(matches!(bf, BfError::Invariant { .. }));
    }
}
