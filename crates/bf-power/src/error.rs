//! Power mapping errors.

use bf_core::BfError;
use thiserror::Error;

pub type PowerResult<T> = Result<T, PowerError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerError {
    /// Source indices do not match the core map or assembly meshes.
    #[error("Power index mismatch: {what}")]
    PowerIndexMismatch { what: String },

    /// Malformed axial mesh, split or coefficient.
    #[error("Invalid power data: {what}")]
    InvalidData { what: String },

    /// A total power was requested but the source deposits none.
    #[error("Cannot normalize a field with zero power to {target} W")]
    ZeroPower { target: f64 },

    /// Failure reported by an external flux source.
    #[error("Flux source error: {message}")]
    Source { message: String },
}

impl From<PowerError> for BfError {
    fn from(err: PowerError) -> Self {
        BfError::InvalidArg {
            what: err.to_string(),
        }
    }
}
