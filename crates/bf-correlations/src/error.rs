//! Error types for correlation selection and evaluation.

use bf_core::BfError;
use std::fmt;
use thiserror::Error;

/// Correlation families known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrelationFamily {
    Friction,
    FlowSplit,
    Mixing,
    Nusselt,
    DuctHtc,
    SpacerGrid,
    Gravity,
}

impl fmt::Display for CorrelationFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorrelationFamily::Friction => "friction",
            CorrelationFamily::FlowSplit => "flow split",
            CorrelationFamily::Mixing => "mixing",
            CorrelationFamily::Nusselt => "Nusselt",
            CorrelationFamily::DuctHtc => "duct HTC",
            CorrelationFamily::SpacerGrid => "spacer grid",
            CorrelationFamily::Gravity => "gravity loss",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrelationError {
    #[error("Unsupported {family} correlation: '{name}'")]
    UnsupportedCorrelation {
        family: CorrelationFamily,
        name: String,
    },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type CorrelationResult<T> = Result<T, CorrelationError>;

impl From<CorrelationError> for BfError {
    fn from(e: CorrelationError) -> Self {
        match e {
            CorrelationError::NonPhysical { what } => BfError::Invariant {
                what: what.to_string(),
            },
            other => BfError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_family() {
        let err = CorrelationError::UnsupportedCorrelation {
            family: CorrelationFamily::Mixing,
            name: "XYZ".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mixing"));
        assert!(msg.contains("XYZ"));
    }

    #[test]
    fn error_conversion() {
        let bf: BfError = CorrelationError::InvalidArg { what: "solidity" }.into();
        assert!(matches!(bf, BfError::InvalidArg { .. }));
    }
}
