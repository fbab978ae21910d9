//! Error types for configuration and solving.

use bf_core::BfError;
use bf_correlations::CorrelationError;
use bf_geometry::GeometryError;
use bf_materials::MaterialError;
use bf_power::PowerError;
use thiserror::Error;

/// Problems detected while building a core, before any solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Material error: {0}")]
    Material(#[from] MaterialError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Power error: {0}")]
    Power(#[from] PowerError),

    #[error("Assembly '{assembly}': {what}")]
    InvalidAssembly { assembly: String, what: String },

    #[error("Invalid core: {what}")]
    InvalidCore { what: String },

    #[error(
        "Assembly '{assembly}' is in groups '{first}' and '{second}' with conflicting constraints"
    )]
    ConflictingGroupConstraint {
        assembly: String,
        first: String,
        second: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures during a solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Axial march of '{assembly}' diverged at z = {z:.4} m: {reason}")]
    AxialStepDivergence {
        assembly: String,
        z: f64,
        reason: String,
    },

    #[error("Core did not converge after {iterations} iterations (max duct change {max_change:.3e} K)")]
    CoreConvergenceFailure { iterations: usize, max_change: f64 },

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for BfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::CoreConvergenceFailure { .. } | SolverError::AxialStepDivergence { .. } => {
                BfError::Invariant {
                    what: e.to_string(),
                }
            }
            other => BfError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}

/// Non-fatal outcomes of an orificing search.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizerWarning {
    /// The trial cap was hit before the limit was met within tolerance.
    ToleranceNotMet {
        group: String,
        flow_rate: f64,
        temperature: f64,
        limit: f64,
        trials: usize,
    },
}

impl std::fmt::Display for OptimizerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizerWarning::ToleranceNotMet {
                group,
                flow_rate,
                temperature,
                limit,
                trials,
            } => write!(
                f,
                "group '{}': limit {:.2} K not met within tolerance after {} trials \
                 (best flow {:.4} kg/s gives {:.2} K)",
                group, limit, trials, flow_rate, temperature
            ),
        }
    }
}
